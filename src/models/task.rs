//! Planned stop model.

use serde::{Deserialize, Serialize};

use super::{Direction, FloorIndex, PassengerId};

/// What happens at a planned stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Passengers board.
    Pickup,
    /// Passengers alight.
    Dropoff,
}

/// A planned stop in a vehicle's itinerary.
///
/// A pickup carries the travel direction of its passengers; a dropoff
/// carries `Direction::Stopped`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Floor of the stop.
    pub floor: FloorIndex,
    /// Pickup or dropoff.
    pub kind: TaskKind,
    /// Travel direction of picked-up passengers.
    pub direction: Direction,
    /// Passengers served by this stop, in service order.
    pub passengers: Vec<PassengerId>,
}

/// Identity of a stop for merging purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub floor: FloorIndex,
    pub kind: TaskKind,
    pub direction: Direction,
}

impl Task {
    /// Creates a pickup stop.
    pub fn pickup(floor: FloorIndex, direction: Direction, passenger: PassengerId) -> Self {
        Self {
            floor,
            kind: TaskKind::Pickup,
            direction,
            passengers: vec![passenger],
        }
    }

    /// Creates a dropoff stop.
    pub fn dropoff(floor: FloorIndex, passenger: PassengerId) -> Self {
        Self {
            floor,
            kind: TaskKind::Dropoff,
            direction: Direction::Stopped,
            passengers: vec![passenger],
        }
    }

    /// Adds more passengers to this stop.
    pub fn with_passengers(mut self, passengers: impl IntoIterator<Item = PassengerId>) -> Self {
        for p in passengers {
            if !self.passengers.contains(&p) {
                self.passengers.push(p);
            }
        }
        self
    }

    /// Merge identity: floor, kind, and pickup direction.
    pub fn key(&self) -> TaskKey {
        TaskKey {
            floor: self.floor,
            kind: self.kind,
            direction: self.direction,
        }
    }

    pub fn is_pickup(&self) -> bool {
        self.kind == TaskKind::Pickup
    }

    pub fn is_dropoff(&self) -> bool {
        self.kind == TaskKind::Dropoff
    }

    /// Whether `passenger` is served here.
    pub fn contains(&self, passenger: PassengerId) -> bool {
        self.passengers.contains(&passenger)
    }

    /// Removes a passenger. Returns `true` if it was present.
    pub fn remove_passenger(&mut self, passenger: PassengerId) -> bool {
        let before = self.passengers.len();
        self.passengers.retain(|&p| p != passenger);
        self.passengers.len() != before
    }

    /// Net change in onboard count after this stop.
    pub fn load_delta(&self) -> i64 {
        let n = self.passengers.len() as i64;
        match self.kind {
            TaskKind::Pickup => n,
            TaskKind::Dropoff => -n,
        }
    }

    /// Whether no passenger is left on this stop.
    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_builders() {
        let t = Task::pickup(3, Direction::Up, 1).with_passengers([2, 1, 3]);
        assert_eq!(t.passengers, vec![1, 2, 3]);
        assert!(t.is_pickup());
        assert_eq!(t.load_delta(), 3);

        let d = Task::dropoff(7, 1);
        assert_eq!(d.direction, Direction::Stopped);
        assert_eq!(d.load_delta(), -1);
    }

    #[test]
    fn test_key_separates_pickup_directions() {
        let up = Task::pickup(4, Direction::Up, 1);
        let down = Task::pickup(4, Direction::Down, 2);
        let drop = Task::dropoff(4, 3);
        assert_ne!(up.key(), down.key());
        assert_ne!(up.key(), drop.key());
        assert_eq!(up.key(), Task::pickup(4, Direction::Up, 9).key());
    }

    #[test]
    fn test_remove_passenger() {
        let mut t = Task::dropoff(2, 5).with_passengers([6]);
        assert!(t.remove_passenger(5));
        assert!(!t.remove_passenger(5));
        assert!(!t.is_empty());
        assert!(t.remove_passenger(6));
        assert!(t.is_empty());
    }
}
