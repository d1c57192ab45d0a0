//! Vehicle itinerary model.

use serde::{Deserialize, Serialize};

use super::{Direction, FloorIndex, PassengerId, Task, TaskKind, VehicleId};

/// Ordered stops a vehicle intends to serve.
///
/// `estimated_load[i]` is the onboard count after serving `tasks[i]`.
/// The vector is refreshed by the capacity pass and may be empty for a
/// plan that has not been validated yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiclePlan {
    /// Owning vehicle.
    pub vehicle: VehicleId,
    /// Scan direction the plan was ordered for.
    pub direction: Direction,
    /// Stops in service order.
    pub tasks: Vec<Task>,
    /// Onboard count after each stop.
    #[serde(default)]
    pub estimated_load: Vec<usize>,
    /// Travel plus stop ticks of the whole plan.
    #[serde(default)]
    pub total_cost: f64,
}

impl VehiclePlan {
    /// Creates an empty plan.
    pub fn new(vehicle: VehicleId, direction: Direction) -> Self {
        Self {
            vehicle,
            direction,
            tasks: Vec::new(),
            estimated_load: Vec::new(),
            total_cost: 0.0,
        }
    }

    /// Sets the tasks.
    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Floors of the stops, in order.
    pub fn floors(&self) -> Vec<FloorIndex> {
        self.tasks.iter().map(|t| t.floor).collect()
    }

    /// Whether a pickup for `passenger` is planned.
    pub fn has_pickup(&self, passenger: PassengerId) -> bool {
        self.position_of(TaskKind::Pickup, passenger).is_some()
    }

    /// Whether a dropoff for `passenger` is planned.
    pub fn has_dropoff(&self, passenger: PassengerId) -> bool {
        self.position_of(TaskKind::Dropoff, passenger).is_some()
    }

    /// Index of the stop serving `passenger` with the given kind.
    pub fn position_of(&self, kind: TaskKind, passenger: PassengerId) -> Option<usize> {
        self.tasks
            .iter()
            .position(|t| t.kind == kind && t.contains(passenger))
    }

    /// Removes `passenger` from every stop of `kind`, dropping emptied stops.
    ///
    /// Returns `true` if anything was removed.
    pub fn remove_passenger(&mut self, kind: TaskKind, passenger: PassengerId) -> bool {
        let mut removed = false;
        for task in self.tasks.iter_mut().filter(|t| t.kind == kind) {
            removed |= task.remove_passenger(passenger);
        }
        if removed {
            self.tasks.retain(|t| !t.is_empty());
            self.estimated_load.clear();
        }
        removed
    }

    /// Passengers with a planned pickup.
    pub fn pickup_passengers(&self) -> Vec<PassengerId> {
        self.tasks
            .iter()
            .filter(|t| t.is_pickup())
            .flat_map(|t| t.passengers.iter().copied())
            .collect()
    }

    /// Largest estimated onboard count, 0 for an unvalidated plan.
    pub fn peak_load(&self) -> usize {
        self.estimated_load.iter().copied().max().unwrap_or(0)
    }
}
