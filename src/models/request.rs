//! Transport request model.

use serde::{Deserialize, Serialize};

use super::{Direction, FloorIndex, PassengerId, Tick, VehicleId};

/// An outstanding transport request, one per waiting or riding passenger.
///
/// Created on a call event, removed when the passenger alights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Passenger identifier.
    pub passenger: PassengerId,
    /// Floor where the passenger waits.
    pub origin: FloorIndex,
    /// Floor the passenger wants to reach.
    pub destination: FloorIndex,
    /// Required travel direction, derived from origin and destination.
    pub direction: Direction,
    /// Tick of the call.
    pub arrival_tick: Tick,
    /// Vehicle currently responsible, if any.
    pub assigned: Option<VehicleId>,
    /// Tick of the latest assignment.
    pub assigned_tick: Option<Tick>,
    /// Processing priority (higher = served first). Equals wait time.
    pub priority: f64,
}

impl Request {
    /// Creates an unassigned request.
    pub fn new(
        passenger: PassengerId,
        origin: FloorIndex,
        destination: FloorIndex,
        arrival_tick: Tick,
    ) -> Self {
        Self {
            passenger,
            origin,
            destination,
            direction: Direction::between(origin, destination),
            arrival_tick,
            assigned: None,
            assigned_tick: None,
            priority: 0.0,
        }
    }

    /// Ticks since the call.
    pub fn wait_time(&self, tick: Tick) -> Tick {
        (tick - self.arrival_tick).max(0)
    }

    /// Ticks since the latest assignment, `None` when unassigned.
    pub fn assignment_age(&self, tick: Tick) -> Option<Tick> {
        self.assigned_tick.map(|t| (tick - t).max(0))
    }

    /// Whether some vehicle is responsible.
    pub fn is_assigned(&self) -> bool {
        self.assigned.is_some()
    }

    /// Number of floors travelled.
    pub fn trip_length(&self) -> FloorIndex {
        (self.destination - self.origin).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_derived() {
        assert_eq!(Request::new(1, 2, 7, 0).direction, Direction::Up);
        assert_eq!(Request::new(2, 7, 2, 0).direction, Direction::Down);
        assert_eq!(Request::new(3, 4, 4, 0).direction, Direction::Stopped);
    }

    #[test]
    fn test_wait_time_never_negative() {
        let r = Request::new(1, 0, 5, 10);
        assert_eq!(r.wait_time(25), 15);
        assert_eq!(r.wait_time(5), 0);
        assert_eq!(r.trip_length(), 5);
        assert_eq!(r.assignment_age(25), None);
    }
}
