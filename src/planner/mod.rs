//! Path planning: turning a bag of stops into an ordered, feasible itinerary.
//!
//! # Algorithm
//!
//! 1. Explode every stop into one stop per passenger.
//! 2. Classify each stop into a [`Phase`] relative to the vehicle's floor and
//!    scan direction. A dropoff whose pickup is in the same list inherits the
//!    pickup's phase so the pair stays together.
//! 3. Sort each phase along the way it will be swept (phase 1 and 3 in the
//!    scan direction, phase 2 against it), dropoffs first on a shared floor.
//! 4. Concatenate, merge stops sharing floor and kind, and replay the load to
//!    truncate pickups the vehicle has no room for.
//!
//! # Reference
//! Denning (1967), "Effects of Scheduling on File Memory Operations" (LOOK)

mod capacity;
mod merge;

pub use capacity::{enforce_capacity, load_profile, path_cost, validate_capacity, CapacityOutcome};
pub use merge::merge_tasks;

use std::collections::HashMap;

use log::debug;

use crate::dispatching::DispatchContext;
use crate::models::{Direction, FloorIndex, PassengerId, Task, TaskKind, VehiclePlan, VehicleState};

/// Sweep a stop belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Served on the current sweep: dropoffs ahead, same-direction pickups ahead.
    Current,
    /// Served after reversing: dropoffs behind, opposite-direction pickups.
    Reverse,
    /// Served on the following sweep: same-direction pickups behind.
    NextCycle,
}

/// Result of planning a vehicle's itinerary.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// The ordered, capacity-feasible plan.
    pub plan: VehiclePlan,
    /// Passengers whose pickup did not fit and was dropped from the plan.
    pub deferred: Vec<PassengerId>,
}

/// Phase of a single stop, ignoring pickup/dropoff pairing.
pub fn classify(task: &Task, current: FloorIndex, scan: Direction) -> Phase {
    let scan = effective_scan(scan);
    let ahead = scan.is_ahead(current, task.floor);
    match task.kind {
        TaskKind::Dropoff if ahead => Phase::Current,
        TaskKind::Dropoff => Phase::Reverse,
        TaskKind::Pickup if task.direction != scan => Phase::Reverse,
        TaskKind::Pickup if ahead => Phase::Current,
        TaskKind::Pickup => Phase::NextCycle,
    }
}

fn effective_scan(scan: Direction) -> Direction {
    match scan {
        Direction::Down => Direction::Down,
        _ => Direction::Up,
    }
}

/// Splits stops into one stop per passenger.
pub fn explode(tasks: Vec<Task>) -> Vec<Task> {
    tasks
        .into_iter()
        .flat_map(|t| {
            let Task {
                floor,
                kind,
                direction,
                passengers,
            } = t;
            passengers.into_iter().map(move |p| Task {
                floor,
                kind,
                direction,
                passengers: vec![p],
            })
        })
        .collect()
}

/// Orders single-passenger stops by phase and sweep.
pub fn order_tasks(tasks: Vec<Task>, current: FloorIndex, scan: Direction) -> Vec<Task> {
    let scan = effective_scan(scan);

    let pickup_phase: HashMap<PassengerId, Phase> = tasks
        .iter()
        .filter(|t| t.is_pickup())
        .flat_map(|t| {
            let phase = classify(t, current, scan);
            t.passengers.iter().map(move |&p| (p, phase))
        })
        .collect();

    let mut phased: [Vec<Task>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    for task in tasks {
        let phase = if task.is_dropoff() {
            task.passengers
                .first()
                .and_then(|p| pickup_phase.get(p).copied())
                .unwrap_or_else(|| classify(&task, current, scan))
        } else {
            classify(&task, current, scan)
        };
        phased[phase as usize].push(task);
    }

    if !phased[Phase::NextCycle as usize].is_empty() {
        debug!(
            "{} pickup(s) behind the vehicle at floor {current} deferred to the next {scan} sweep",
            phased[Phase::NextCycle as usize]
                .iter()
                .filter(|t| t.is_pickup())
                .count()
        );
    }

    let [current_phase, reverse, next_cycle] = phased;
    let mut ordered = Vec::new();
    ordered.extend(sort_sweep(current_phase, scan));
    ordered.extend(sort_sweep(reverse, scan.opposite()));
    ordered.extend(sort_sweep(next_cycle, scan));
    ordered
}

fn sort_sweep(mut tasks: Vec<Task>, sweep: Direction) -> Vec<Task> {
    tasks.sort_by(|a, b| {
        let by_floor = match sweep {
            Direction::Down => b.floor.cmp(&a.floor),
            _ => a.floor.cmp(&b.floor),
        };
        by_floor.then(a.is_pickup().cmp(&b.is_pickup()))
    });
    tasks
}

/// Builds a vehicle's plan from its outstanding stops.
///
/// The result is ordered for the vehicle's floor and scan direction, merged,
/// and truncated to the vehicle's capacity.
pub fn plan_path(
    vehicle: &VehicleState,
    scan: Direction,
    tasks: Vec<Task>,
    context: &DispatchContext,
) -> PlanOutcome {
    let ordered = order_tasks(explode(tasks), vehicle.floor, scan);
    let merged = merge_tasks(ordered);
    let CapacityOutcome {
        tasks,
        loads,
        deferred,
    } = enforce_capacity(merged, vehicle.load(), vehicle.capacity);

    if !deferred.is_empty() {
        debug!(
            "vehicle {}: {} pickup(s) deferred for capacity",
            vehicle.id,
            deferred.len()
        );
    }

    let total_cost = path_cost(&tasks, vehicle.floor, context);
    let mut plan = VehiclePlan::new(vehicle.id, effective_scan(scan)).with_tasks(tasks);
    plan.estimated_load = loads;
    plan.total_cost = total_cost;
    PlanOutcome { plan, deferred }
}
