//! Vehicle and floor mirrors.
//!
//! Both are owned by the external simulator. The core keeps a copy updated
//! from the event feed and only reads it when deciding.

use serde::{Deserialize, Serialize};

use super::{Direction, FloorIndex, PassengerId, VehicleId};

/// Mirrored state of one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Dense vehicle index.
    pub id: VehicleId,
    /// Last whole floor the vehicle was at.
    pub floor: FloorIndex,
    /// Maximum number of passengers onboard.
    pub capacity: usize,
    /// Onboard passengers in boarding order.
    #[serde(default)]
    pub passengers: Vec<PassengerId>,
    /// Last commanded target floor.
    #[serde(default)]
    pub target_floor: Option<FloorIndex>,
    /// Whether the vehicle is travelling towards `target_floor`.
    #[serde(default)]
    pub moving: bool,
}

impl VehicleState {
    /// Creates an idle, empty vehicle.
    pub fn new(id: VehicleId, floor: FloorIndex, capacity: usize) -> Self {
        Self {
            id,
            floor,
            capacity,
            passengers: Vec::new(),
            target_floor: None,
            moving: false,
        }
    }

    /// Sets the onboard passengers.
    pub fn with_passengers(mut self, passengers: Vec<PassengerId>) -> Self {
        self.passengers = passengers;
        self
    }

    /// Marks the vehicle as travelling to `target`.
    pub fn with_target(mut self, target: FloorIndex) -> Self {
        self.target_floor = Some(target);
        self.moving = target != self.floor;
        self
    }

    /// Onboard passenger count.
    pub fn load(&self) -> usize {
        self.passengers.len()
    }

    /// Seats left.
    pub fn spare_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.load())
    }

    /// Whether no seat is left.
    pub fn is_full(&self) -> bool {
        self.spare_capacity() == 0
    }

    /// Whether nobody is onboard.
    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    /// Whether the vehicle is standing still.
    pub fn is_idle(&self) -> bool {
        !self.moving
    }

    /// Occupancy fraction (0.0..=1.0). A zero-capacity vehicle reads as full.
    pub fn load_factor(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        self.load() as f64 / self.capacity as f64
    }

    /// Direction of current travel, `Stopped` when idle.
    pub fn travel_direction(&self) -> Direction {
        match (self.moving, self.target_floor) {
            (true, Some(target)) => Direction::between(self.floor, target),
            _ => Direction::Stopped,
        }
    }

    /// Whether `passenger` is onboard.
    pub fn carries(&self, passenger: PassengerId) -> bool {
        self.passengers.contains(&passenger)
    }

    /// Records a boarding. Returns `false` if already onboard.
    pub fn board(&mut self, passenger: PassengerId) -> bool {
        if self.carries(passenger) {
            return false;
        }
        self.passengers.push(passenger);
        true
    }

    /// Records an alighting. Returns `false` if the passenger was not onboard.
    pub fn alight(&mut self, passenger: PassengerId) -> bool {
        let before = self.passengers.len();
        self.passengers.retain(|&p| p != passenger);
        self.passengers.len() != before
    }
}

/// Mirrored waiting queues of one floor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorState {
    /// Floor index.
    pub floor: FloorIndex,
    /// Passengers waiting to travel up.
    #[serde(default)]
    pub up_queue: Vec<PassengerId>,
    /// Passengers waiting to travel down.
    #[serde(default)]
    pub down_queue: Vec<PassengerId>,
}

impl FloorState {
    /// Creates a floor with empty queues.
    pub fn new(floor: FloorIndex) -> Self {
        Self {
            floor,
            up_queue: Vec::new(),
            down_queue: Vec::new(),
        }
    }

    /// Adds a waiting passenger to the queue for `direction`.
    ///
    /// `Stopped` is ignored; duplicates are not added twice.
    pub fn enqueue(&mut self, passenger: PassengerId, direction: Direction) {
        let queue = match direction {
            Direction::Up => &mut self.up_queue,
            Direction::Down => &mut self.down_queue,
            Direction::Stopped => return,
        };
        if !queue.contains(&passenger) {
            queue.push(passenger);
        }
    }

    /// Removes a waiting passenger from either queue.
    pub fn remove(&mut self, passenger: PassengerId) -> bool {
        let before = self.up_queue.len() + self.down_queue.len();
        self.up_queue.retain(|&p| p != passenger);
        self.down_queue.retain(|&p| p != passenger);
        self.up_queue.len() + self.down_queue.len() != before
    }

    /// Waiting passengers for `direction`.
    pub fn waiting(&self, direction: Direction) -> &[PassengerId] {
        match direction {
            Direction::Up => &self.up_queue,
            Direction::Down => &self.down_queue,
            Direction::Stopped => &[],
        }
    }

    /// Whether anybody waits for `direction`.
    pub fn has_waiting(&self, direction: Direction) -> bool {
        !self.waiting(direction).is_empty()
    }

    /// Whether nobody waits at all.
    pub fn is_empty(&self) -> bool {
        self.up_queue.is_empty() && self.down_queue.is_empty()
    }
}
