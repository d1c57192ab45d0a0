//! Per-vehicle scan direction.
//!
//! The scan direction is the sweep sense LOOK honours. It is distinct from
//! the transient "stopped" status: a vehicle standing at a floor keeps the
//! direction it was sweeping in until it actually moves the other way.

use log::debug;

use crate::models::{Direction, FloorIndex, VehicleId};

/// Authoritative scan direction of every vehicle. Unset vehicles scan up.
#[derive(Debug, Clone, Default)]
pub struct ScanTracker {
    directions: Vec<Direction>,
}

impl ScanTracker {
    /// Creates a tracker for `vehicles` vehicles, all scanning up.
    pub fn new(vehicles: usize) -> Self {
        Self {
            directions: vec![Direction::Up; vehicles],
        }
    }

    /// Current scan direction.
    pub fn direction(&self, vehicle: VehicleId) -> Direction {
        self.directions
            .get(vehicle)
            .copied()
            .unwrap_or(Direction::Up)
    }

    /// Forces the scan direction. `Stopped` is ignored.
    pub fn set_direction(&mut self, vehicle: VehicleId, direction: Direction) {
        if !direction.is_moving() {
            return;
        }
        if vehicle >= self.directions.len() {
            self.directions.resize(vehicle + 1, Direction::Up);
        }
        self.directions[vehicle] = direction;
    }

    /// Updates the direction from a commanded move. A move to the same floor
    /// leaves it unchanged.
    pub fn record_move(&mut self, vehicle: VehicleId, from: FloorIndex, to: FloorIndex) {
        let direction = Direction::between(from, to);
        if direction.is_moving() && direction != self.direction(vehicle) {
            debug!("vehicle {vehicle}: scan {} -> {direction}", self.direction(vehicle));
        }
        self.set_direction(vehicle, direction);
    }
}
