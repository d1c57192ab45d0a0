//! Per-vehicle task queues.
//!
//! The executor owns one [`VehiclePlan`] per vehicle and keeps it in step
//! with the event feed: requests are inserted when assigned, stops are
//! removed as passengers board and alight, and the whole queue is
//! re-validated and re-ordered every time the vehicle stops.
//!
//! Inconsistencies (a passenger boarding another vehicle, a request that
//! vanished) are never fatal; they are pruned at the next re-validation.

use log::{debug, warn};

use crate::dispatching::DispatchContext;
use crate::models::{
    Direction, FloorIndex, PassengerId, Request, Task, TaskKind, VehicleId, VehiclePlan,
    VehicleState,
};
use crate::planner::{plan_path, validate_capacity};
use crate::registry::RequestRegistry;

/// Arena of vehicle plans indexed by vehicle id.
#[derive(Debug, Clone, Default)]
pub struct TaskQueueExecutor {
    plans: Vec<VehiclePlan>,
}

impl TaskQueueExecutor {
    /// Creates empty plans for `vehicles` vehicles.
    pub fn new(vehicles: usize) -> Self {
        Self {
            plans: (0..vehicles)
                .map(|v| VehiclePlan::new(v, Direction::Up))
                .collect(),
        }
    }

    /// Number of vehicles.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// The plan of `vehicle`.
    pub fn plan(&self, vehicle: VehicleId) -> Option<&VehiclePlan> {
        self.plans.get(vehicle)
    }

    /// All plans, by vehicle id.
    pub fn plans(&self) -> &[VehiclePlan] {
        &self.plans
    }

    /// Whether `vehicle` has any planned stop.
    pub fn has_work(&self, vehicle: VehicleId) -> bool {
        self.plans.get(vehicle).is_some_and(|p| !p.is_empty())
    }

    /// Adds the pickup and dropoff of `request` to the vehicle's plan.
    ///
    /// The insertion is all-or-nothing: if the re-planned queue would have to
    /// truncate anybody, the plan is left untouched and `false` is returned.
    pub fn try_insert_request(
        &mut self,
        vehicle: &VehicleState,
        scan: Direction,
        request: &Request,
        context: &DispatchContext,
    ) -> bool {
        let Some(current) = self.plans.get(vehicle.id) else {
            return false;
        };
        if current.has_pickup(request.passenger) {
            return true;
        }

        let mut tasks = current.tasks.clone();
        tasks.push(Task::pickup(
            request.origin,
            request.direction,
            request.passenger,
        ));
        tasks.push(Task::dropoff(request.destination, request.passenger));

        let outcome = plan_path(vehicle, scan, tasks, context);
        if !outcome.deferred.is_empty() {
            debug!(
                "vehicle {}: passenger {} rejected, would defer {:?}",
                vehicle.id, request.passenger, outcome.deferred
            );
            return false;
        }
        self.plans[vehicle.id] = outcome.plan;
        true
    }

    /// Re-orders the plan from the vehicle's floor and scan direction.
    ///
    /// Returns passengers whose pickups no longer fit.
    pub fn replan(
        &mut self,
        vehicle: &VehicleState,
        scan: Direction,
        context: &DispatchContext,
    ) -> Vec<PassengerId> {
        let Some(current) = self.plans.get(vehicle.id) else {
            return Vec::new();
        };
        let outcome = plan_path(vehicle, scan, current.tasks.clone(), context);
        self.plans[vehicle.id] = outcome.plan;
        outcome.deferred
    }

    /// Drops stops that no longer make sense and restores missing dropoffs.
    ///
    /// A pickup is stale when its request is gone, assigned to another
    /// vehicle, or its passenger is already aboard. A dropoff is stale when
    /// its passenger is neither aboard nor waiting for a pickup here.
    /// Returns the passengers whose pickups were removed.
    pub fn prune(&mut self, vehicle: &VehicleState, registry: &RequestRegistry) -> Vec<PassengerId> {
        let Some(plan) = self.plans.get_mut(vehicle.id) else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        for task in plan.tasks.iter_mut().filter(|t| t.is_pickup()) {
            task.passengers.retain(|&p| {
                let keep = !vehicle.carries(p)
                    && registry
                        .get(p)
                        .is_some_and(|r| r.assigned == Some(vehicle.id));
                if !keep {
                    removed.push(p);
                }
                keep
            });
        }

        let pending = plan.pickup_passengers();
        for task in plan.tasks.iter_mut().filter(|t| t.is_dropoff()) {
            task.passengers
                .retain(|p| vehicle.carries(*p) || pending.contains(p));
        }
        plan.tasks.retain(|t| !t.is_empty());

        for &p in &vehicle.passengers {
            if plan.has_dropoff(p) {
                continue;
            }
            match registry.get(p) {
                Some(r) => {
                    debug!("vehicle {}: restoring dropoff of {p} at {}", vehicle.id, r.destination);
                    plan.tasks.push(Task::dropoff(r.destination, p));
                }
                None => warn!("vehicle {}: onboard passenger {p} has no request", vehicle.id),
            }
        }

        if !removed.is_empty() {
            debug!("vehicle {}: pruned pickups {:?}", vehicle.id, removed);
        }
        removed
    }

    /// Records a boarding: the pickup is done and a dropoff is ensured.
    pub fn on_board(&mut self, vehicle: VehicleId, passenger: PassengerId, destination: Option<FloorIndex>) {
        let Some(plan) = self.plans.get_mut(vehicle) else {
            return;
        };
        plan.remove_passenger(TaskKind::Pickup, passenger);
        if let Some(destination) = destination {
            if !plan.has_dropoff(passenger) {
                plan.tasks.push(Task::dropoff(destination, passenger));
                plan.estimated_load.clear();
            }
        }
    }

    /// Records an alighting.
    pub fn on_alight(&mut self, vehicle: VehicleId, passenger: PassengerId) {
        if let Some(plan) = self.plans.get_mut(vehicle) {
            plan.remove_passenger(TaskKind::Dropoff, passenger);
        }
    }

    /// Removes a passenger's pickup and dropoff, e.g. after reassignment.
    pub fn withdraw(&mut self, vehicle: VehicleId, passenger: PassengerId) -> bool {
        let Some(plan) = self.plans.get_mut(vehicle) else {
            return false;
        };
        let pickup = plan.remove_passenger(TaskKind::Pickup, passenger);
        let dropoff = plan.remove_passenger(TaskKind::Dropoff, passenger);
        pickup || dropoff
    }

    /// Next floor to command, or `None` when the plan is exhausted.
    ///
    /// Stops at the current floor are skipped: boarding there happens once
    /// the departure direction is known. If only such stops remain, the
    /// vehicle steps one floor towards the waiting passengers' direction.
    pub fn next_target(&self, vehicle: &VehicleState, top_floor: FloorIndex) -> Option<FloorIndex> {
        let plan = self.plans.get(vehicle.id)?;
        if let Some(task) = plan.tasks.iter().find(|t| t.floor != vehicle.floor) {
            return Some(task.floor);
        }
        let pickup = plan.tasks.iter().find(|t| t.is_pickup())?;
        let step = vehicle.floor + pickup.direction.step();
        if step != vehicle.floor && (0..=top_floor).contains(&step) {
            Some(step)
        } else {
            None
        }
    }

    /// Whether the vehicle's plan fits its capacity from the current load.
    pub fn is_feasible(&self, vehicle: &VehicleState) -> bool {
        self.plans
            .get(vehicle.id)
            .is_some_and(|p| validate_capacity(&p.tasks, vehicle.load(), vehicle.capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> DispatchContext {
        DispatchContext::at_tick(0).with_timing(2, 3)
    }

    fn registry_with(requests: &[(PassengerId, FloorIndex, FloorIndex, Option<VehicleId>)]) -> RequestRegistry {
        let mut reg = RequestRegistry::new();
        for &(p, o, d, v) in requests {
            reg.add_request(p, o, d, 0);
            if let Some(v) = v {
                reg.assign(p, v, 0);
            }
        }
        reg
    }

    #[test]
    fn test_insert_orders_plan() {
        let mut exec = TaskQueueExecutor::new(1);
        let v = VehicleState::new(0, 0, 8);
        assert!(exec.try_insert_request(&v, Direction::Up, &Request::new(1, 5, 9, 0), &ctx()));
        assert!(exec.try_insert_request(&v, Direction::Up, &Request::new(2, 3, 7, 0), &ctx()));
        let plan = exec.plan(0).unwrap();
        assert_eq!(plan.floors(), vec![3, 5, 7, 9]);
        assert_eq!(exec.next_target(&v, 9), Some(3));
    }

    #[test]
    fn test_insert_is_atomic_under_capacity() {
        let mut exec = TaskQueueExecutor::new(1);
        let v = VehicleState::new(0, 0, 1);
        assert!(exec.try_insert_request(&v, Direction::Up, &Request::new(1, 2, 6, 0), &ctx()));
        let before = exec.plan(0).unwrap().clone();
        assert!(!exec.try_insert_request(&v, Direction::Up, &Request::new(2, 3, 5, 0), &ctx()));
        assert_eq!(exec.plan(0).unwrap(), &before);
        // A trip starting after the first dropoff fits.
        assert!(exec.try_insert_request(&v, Direction::Up, &Request::new(3, 7, 9, 0), &ctx()));
        assert!(exec.is_feasible(&v));
    }

    #[test]
    fn test_prune_stale_pickups_and_dropoffs() {
        let mut exec = TaskQueueExecutor::new(2);
        let v = VehicleState::new(0, 0, 8);
        for r in [Request::new(1, 2, 6, 0), Request::new(2, 3, 7, 0)] {
            exec.try_insert_request(&v, Direction::Up, &r, &ctx());
        }
        // Passenger 1 went to vehicle 1, passenger 2's request vanished.
        let reg = registry_with(&[(1, 2, 6, Some(1))]);
        let mut removed = exec.prune(&v, &reg);
        removed.sort_unstable();
        assert_eq!(removed, vec![1, 2]);
        assert!(exec.plan(0).unwrap().is_empty());
    }

    #[test]
    fn test_prune_restores_onboard_dropoff() {
        let mut exec = TaskQueueExecutor::new(1);
        let v = VehicleState::new(0, 4, 8).with_passengers(vec![5]);
        let reg = registry_with(&[(5, 1, 8, Some(0))]);
        exec.prune(&v, &reg);
        assert!(exec.plan(0).unwrap().has_dropoff(5));
    }

    #[test]
    fn test_board_and_alight() {
        let mut exec = TaskQueueExecutor::new(1);
        let v = VehicleState::new(0, 0, 8);
        exec.try_insert_request(&v, Direction::Up, &Request::new(1, 2, 6, 0), &ctx());
        exec.on_board(0, 1, Some(6));
        let plan = exec.plan(0).unwrap();
        assert!(!plan.has_pickup(1));
        assert_eq!(plan.floors(), vec![6]);
        exec.on_alight(0, 1);
        assert!(!exec.has_work(0));
    }

    #[test]
    fn test_board_on_unplanned_vehicle_adds_dropoff() {
        let mut exec = TaskQueueExecutor::new(2);
        exec.on_board(1, 7, Some(3));
        assert!(exec.plan(1).unwrap().has_dropoff(7));
        exec.on_board(9, 7, Some(3));
    }

    #[test]
    fn test_next_target_nudges_from_current_floor() {
        let mut exec = TaskQueueExecutor::new(1);
        let v = VehicleState::new(0, 4, 8);
        exec.plans[0] = VehiclePlan::new(0, Direction::Up)
            .with_tasks(vec![Task::pickup(4, Direction::Down, 1)]);
        assert_eq!(exec.next_target(&v, 9), Some(3));

        exec.plans[0] = VehiclePlan::new(0, Direction::Up)
            .with_tasks(vec![Task::pickup(4, Direction::Up, 1), Task::dropoff(7, 1)]);
        assert_eq!(exec.next_target(&v, 9), Some(7));

        exec.plans[0] = VehiclePlan::new(0, Direction::Up);
        assert_eq!(exec.next_target(&v, 9), None);
    }

    #[test]
    fn test_withdraw() {
        let mut exec = TaskQueueExecutor::new(1);
        let v = VehicleState::new(0, 0, 8);
        exec.try_insert_request(&v, Direction::Up, &Request::new(1, 2, 6, 0), &ctx());
        assert!(exec.withdraw(0, 1));
        assert!(!exec.withdraw(0, 1));
        assert!(!exec.has_work(0));
    }
}
