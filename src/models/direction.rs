//! Travel and scan direction.

use serde::{Deserialize, Serialize};

use super::FloorIndex;

/// Direction of travel, scan, or a passenger's trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards higher floors.
    Up,
    /// Towards lower floors.
    Down,
    /// No direction (stopped vehicle, zero-length trip).
    Stopped,
}

impl Direction {
    /// Direction needed to get from `from` to `to`.
    pub fn between(from: FloorIndex, to: FloorIndex) -> Self {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Direction::Up,
            std::cmp::Ordering::Less => Direction::Down,
            std::cmp::Ordering::Equal => Direction::Stopped,
        }
    }

    /// The reverse sweep. `Stopped` has no opposite.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Stopped => Direction::Stopped,
        }
    }

    /// Signed one-floor step in this direction.
    pub fn step(self) -> FloorIndex {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
            Direction::Stopped => 0,
        }
    }

    /// Whether this is `Up` or `Down`.
    pub fn is_moving(self) -> bool {
        self != Direction::Stopped
    }

    /// Whether `floor` lies at or beyond `from` when sweeping in this direction.
    pub fn is_ahead(self, from: FloorIndex, floor: FloorIndex) -> bool {
        match self {
            Direction::Up => floor >= from,
            Direction::Down => floor <= from,
            Direction::Stopped => false,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between() {
        assert_eq!(Direction::between(2, 7), Direction::Up);
        assert_eq!(Direction::between(7, 2), Direction::Down);
        assert_eq!(Direction::between(4, 4), Direction::Stopped);
    }

    #[test]
    fn test_is_ahead_includes_current_floor() {
        assert!(Direction::Up.is_ahead(5, 5));
        assert!(Direction::Up.is_ahead(5, 8));
        assert!(!Direction::Up.is_ahead(5, 3));
        assert!(Direction::Down.is_ahead(5, 3));
        assert!(!Direction::Down.is_ahead(5, 6));
        assert!(!Direction::Stopped.is_ahead(5, 5));
    }

    #[test]
    fn test_opposite_and_step() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.step(), -1);
        assert_eq!(Direction::Stopped.opposite(), Direction::Stopped);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Direction::Down).unwrap();
        assert_eq!(json, "\"down\"");
        let dir: Direction = serde_json::from_str("\"up\"").unwrap();
        assert_eq!(dir, Direction::Up);
    }
}
