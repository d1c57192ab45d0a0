//! Capacity replay and plan cost.

use std::collections::HashSet;

use crate::dispatching::DispatchContext;
use crate::models::{FloorIndex, PassengerId, Task, TaskKind};

/// Result of [`enforce_capacity`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityOutcome {
    /// Stops that fit, in order.
    pub tasks: Vec<Task>,
    /// Onboard count after each stop.
    pub loads: Vec<usize>,
    /// Passengers whose pickup was truncated, with their dropoffs removed.
    pub deferred: Vec<PassengerId>,
}

/// Onboard count after each stop, starting from `onboard`.
pub fn load_profile(tasks: &[Task], onboard: usize) -> Vec<usize> {
    let mut load = onboard;
    tasks
        .iter()
        .map(|t| {
            load = match t.kind {
                TaskKind::Pickup => load + t.passengers.len(),
                TaskKind::Dropoff => load.saturating_sub(t.passengers.len()),
            };
            load
        })
        .collect()
}

/// Whether executing `tasks` in order never exceeds `capacity`.
pub fn validate_capacity(tasks: &[Task], onboard: usize, capacity: usize) -> bool {
    load_profile(tasks, onboard)
        .into_iter()
        .all(|load| load <= capacity)
}

/// Replays the load and truncates pickups that would overflow.
///
/// An overflowing pickup keeps its first passengers up to the free room
/// (partial boarding). The rest are deferred and their dropoffs removed.
pub fn enforce_capacity(tasks: Vec<Task>, onboard: usize, capacity: usize) -> CapacityOutcome {
    let mut load = onboard;
    let mut deferred: Vec<PassengerId> = Vec::new();
    let mut deferred_set: HashSet<PassengerId> = HashSet::new();
    let mut kept = Vec::with_capacity(tasks.len());
    let mut loads = Vec::with_capacity(tasks.len());

    for mut task in tasks {
        match task.kind {
            TaskKind::Pickup => {
                let room = capacity.saturating_sub(load);
                if task.passengers.len() > room {
                    for p in task.passengers.split_off(room) {
                        if deferred_set.insert(p) {
                            deferred.push(p);
                        }
                    }
                }
                load += task.passengers.len();
            }
            TaskKind::Dropoff => {
                task.passengers.retain(|p| !deferred_set.contains(p));
                load = load.saturating_sub(task.passengers.len());
            }
        }
        if !task.is_empty() {
            kept.push(task);
            loads.push(load);
        }
    }

    CapacityOutcome {
        tasks: kept,
        loads,
        deferred,
    }
}

/// Travel plus dwell ticks of executing `tasks` from `start`.
pub fn path_cost(tasks: &[Task], start: FloorIndex, context: &DispatchContext) -> f64 {
    let mut position = start;
    let mut cost = 0.0;
    for task in tasks {
        cost += context.travel_ticks(position, task.floor) + context.stop_ticks as f64;
        position = task.floor;
    }
    cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;

    #[test]
    fn test_load_profile() {
        let tasks = vec![
            Task::pickup(2, Direction::Up, 1).with_passengers([2]),
            Task::dropoff(4, 1),
            Task::dropoff(6, 2).with_passengers([9]),
        ];
        assert_eq!(load_profile(&tasks, 1), vec![3, 2, 0]);
        assert!(validate_capacity(&tasks, 1, 3));
        assert!(!validate_capacity(&tasks, 1, 2));
    }

    #[test]
    fn test_enforce_partial_boarding() {
        let tasks = vec![
            Task::pickup(2, Direction::Up, 1).with_passengers([2, 3]),
            Task::dropoff(5, 1).with_passengers([2]),
            Task::dropoff(8, 3),
        ];
        let outcome = enforce_capacity(tasks, 0, 2);
        assert_eq!(outcome.deferred, vec![3]);
        assert_eq!(outcome.tasks.len(), 2);
        assert_eq!(outcome.loads, vec![2, 0]);
        assert!(validate_capacity(&outcome.tasks, 0, 2));
    }

    #[test]
    fn test_enforce_frees_room_after_dropoff() {
        let tasks = vec![
            Task::dropoff(3, 10),
            Task::pickup(4, Direction::Up, 1),
            Task::dropoff(6, 1),
        ];
        let outcome = enforce_capacity(tasks.clone(), 1, 1);
        assert!(outcome.deferred.is_empty());
        assert_eq!(outcome.tasks, tasks);
    }

    #[test]
    fn test_full_vehicle_defers_everything() {
        let tasks = vec![Task::pickup(4, Direction::Up, 1), Task::dropoff(6, 1)];
        let outcome = enforce_capacity(tasks, 3, 3);
        assert_eq!(outcome.deferred, vec![1]);
        assert!(outcome.tasks.is_empty());
    }

    #[test]
    fn test_path_cost() {
        let tasks = vec![Task::dropoff(3, 1), Task::dropoff(1, 2)];
        let ctx = DispatchContext::at_tick(0).with_timing(2, 3);
        // 0->3 (6) + 3 + 3->1 (4) + 3
        assert!((path_cost(&tasks, 0, &ctx) - 16.0).abs() < 1e-10);
        assert!(path_cost(&[], 5, &ctx).abs() < 1e-10);
    }
}
