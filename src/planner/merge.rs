//! Merging stops that share floor and kind.

use crate::models::{PassengerId, Task};

/// Merges consecutive stops with the same [`TaskKey`](crate::models::TaskKey).
///
/// Dropoffs are first moved ahead of pickups on the same floor, then each
/// stop joins the one right before it when their keys match. Stops never
/// change floor order, so a phase-ordered list keeps its sweeps and every
/// pickup stays ahead of its dropoff. Equal stops in different sweeps stay
/// apart.
///
/// Merging an already merged list returns it unchanged.
pub fn merge_tasks(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.retain(|t| !t.is_empty());

    // Dropoffs go ahead of every pickup on the same floor.
    for i in 1..tasks.len() {
        let mut j = i;
        while j > 0
            && tasks[j - 1].is_pickup()
            && tasks[j].is_dropoff()
            && tasks[j - 1].floor == tasks[j].floor
        {
            tasks.swap(j - 1, j);
            j -= 1;
        }
    }

    let mut out: Vec<Task> = Vec::with_capacity(tasks.len());
    for task in tasks {
        match out.last_mut() {
            Some(last) if last.key() == task.key() => absorb(last, task.passengers),
            _ => out.push(task),
        }
    }
    out
}

fn absorb(task: &mut Task, passengers: Vec<PassengerId>) {
    for p in passengers {
        if !task.contains(p) {
            task.passengers.push(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, FloorIndex, TaskKind};

    fn shape(tasks: &[Task]) -> Vec<(FloorIndex, TaskKind, Vec<PassengerId>)> {
        tasks
            .iter()
            .map(|t| (t.floor, t.kind, t.passengers.clone()))
            .collect()
    }

    #[test]
    fn test_merges_same_key() {
        let tasks = vec![
            Task::pickup(3, Direction::Up, 1),
            Task::pickup(3, Direction::Up, 2),
            Task::dropoff(7, 1),
            Task::dropoff(7, 2),
        ];
        let merged = merge_tasks(tasks);
        assert_eq!(
            shape(&merged),
            vec![
                (3, TaskKind::Pickup, vec![1, 2]),
                (7, TaskKind::Dropoff, vec![1, 2]),
            ]
        );
    }

    #[test]
    fn test_pickup_directions_stay_apart() {
        let tasks = vec![
            Task::pickup(4, Direction::Up, 1),
            Task::pickup(4, Direction::Down, 2),
        ];
        assert_eq!(merge_tasks(tasks).len(), 2);
    }

    #[test]
    fn test_later_sweep_stays_apart() {
        // Rider 1 leaves at 7 on this sweep; passenger 2 is picked up at 2
        // on the next one and also leaves at 7.
        let tasks = vec![
            Task::dropoff(7, 1),
            Task::pickup(2, Direction::Up, 2),
            Task::dropoff(7, 2),
        ];
        let merged = merge_tasks(tasks);
        assert_eq!(
            shape(&merged),
            vec![
                (7, TaskKind::Dropoff, vec![1]),
                (2, TaskKind::Pickup, vec![2]),
                (7, TaskKind::Dropoff, vec![2]),
            ]
        );
    }

    #[test]
    fn test_same_floor_dropoffs_join_across_pickup() {
        let tasks = vec![
            Task::dropoff(5, 1),
            Task::pickup(5, Direction::Up, 2),
            Task::dropoff(5, 3),
        ];
        let merged = merge_tasks(tasks);
        assert_eq!(
            shape(&merged),
            vec![
                (5, TaskKind::Dropoff, vec![1, 3]),
                (5, TaskKind::Pickup, vec![2]),
            ]
        );
    }

    #[test]
    fn test_swaps_pickup_before_dropoff_on_same_floor() {
        let tasks = vec![Task::pickup(5, Direction::Up, 1), Task::dropoff(5, 2)];
        let merged = merge_tasks(tasks);
        assert!(merged[0].is_dropoff());
        assert!(merged[1].is_pickup());
    }

    #[test]
    fn test_idempotent() {
        let tasks = vec![
            Task::pickup(3, Direction::Up, 1),
            Task::pickup(3, Direction::Up, 3),
            Task::pickup(5, Direction::Up, 2),
            Task::dropoff(5, 8),
            Task::dropoff(5, 8),
            Task::dropoff(6, 9),
            Task::dropoff(6, 1),
            Task::dropoff(8, 2),
            Task::pickup(2, Direction::Up, 4),
            Task::dropoff(8, 3),
            Task::dropoff(8, 4),
        ];
        let once = merge_tasks(tasks);
        let twice = merge_tasks(once.clone());
        assert_eq!(once, twice);
    }
}
