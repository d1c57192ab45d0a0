//! Mirror of the simulator's vehicles and floors.

use log::debug;

use crate::models::{Direction, FloorIndex, FloorState, PassengerId, VehicleId, VehicleState};

/// Read-mostly copy of the building, updated from the event feed.
#[derive(Debug, Clone, Default)]
pub struct World {
    vehicles: Vec<VehicleState>,
    floors: Vec<FloorState>,
}

impl World {
    /// Creates a building of `floor_count` floors served by `vehicles`,
    /// ordered by id.
    pub fn new(mut vehicles: Vec<VehicleState>, floor_count: usize) -> Self {
        vehicles.sort_by_key(|v| v.id);
        let floors = (0..floor_count)
            .map(|f| FloorState::new(f as FloorIndex))
            .collect();
        Self { vehicles, floors }
    }

    pub fn vehicles(&self) -> &[VehicleState] {
        &self.vehicles
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&VehicleState> {
        self.vehicles.get(id)
    }

    pub fn floors(&self) -> &[FloorState] {
        &self.floors
    }

    pub fn floor(&self, floor: FloorIndex) -> Option<&FloorState> {
        usize::try_from(floor).ok().and_then(|f| self.floors.get(f))
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    /// Highest floor index (0 for an empty building).
    pub fn top_floor(&self) -> FloorIndex {
        self.floors.len().saturating_sub(1) as FloorIndex
    }

    /// Vehicle carrying `passenger`, if any.
    pub fn carrier_of(&self, passenger: PassengerId) -> Option<VehicleId> {
        self.vehicles
            .iter()
            .find(|v| v.carries(passenger))
            .map(|v| v.id)
    }

    /// A passenger starts waiting.
    pub fn enqueue(&mut self, passenger: PassengerId, floor: FloorIndex, direction: Direction) {
        if let Some(f) = usize::try_from(floor).ok().and_then(|f| self.floors.get_mut(f)) {
            f.enqueue(passenger, direction);
        }
    }

    /// A passenger boards: off every floor queue and into the vehicle.
    pub fn board(&mut self, vehicle: VehicleId, passenger: PassengerId) {
        for f in &mut self.floors {
            f.remove(passenger);
        }
        if let Some(v) = self.vehicles.get_mut(vehicle) {
            if !v.board(passenger) {
                debug!("vehicle {vehicle}: passenger {passenger} already aboard");
            }
        }
    }

    /// A passenger alights. Returns `false` if they were not aboard.
    pub fn alight(&mut self, vehicle: VehicleId, passenger: PassengerId) -> bool {
        self.vehicles
            .get_mut(vehicle)
            .is_some_and(|v| v.alight(passenger))
    }

    /// The vehicle came to rest at `floor`.
    pub fn stopped(&mut self, vehicle: VehicleId, floor: FloorIndex) {
        if let Some(v) = self.vehicles.get_mut(vehicle) {
            v.floor = floor;
            v.moving = false;
        }
    }

    /// The vehicle reports having nothing to do.
    pub fn idle(&mut self, vehicle: VehicleId) {
        if let Some(v) = self.vehicles.get_mut(vehicle) {
            v.moving = false;
            v.target_floor = None;
        }
    }

    /// The vehicle passes `floor` without stopping.
    pub fn passing(&mut self, vehicle: VehicleId, floor: FloorIndex) {
        if let Some(v) = self.vehicles.get_mut(vehicle) {
            v.floor = floor;
        }
    }

    /// A command was issued to the vehicle.
    ///
    /// An immediate command reaches a vehicle in transit, which stays
    /// moving until it reports the stop, even when diverted to the floor
    /// it is passing.
    pub fn commanded(&mut self, vehicle: VehicleId, target: FloorIndex, immediate: bool) {
        if let Some(v) = self.vehicles.get_mut(vehicle) {
            v.target_floor = Some(target);
            v.moving = immediate || target != v.floor;
        }
    }
}
