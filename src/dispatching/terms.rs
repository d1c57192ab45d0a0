//! Built-in cost terms.
//!
//! # Categories
//!
//! - **Time-based**: ETA, WAIT
//! - **Path-based**: DETOUR, DIRECTION
//! - **Load**: LOAD
//!
//! # Score Convention
//! All terms return lower scores for better vehicles.

use super::{Candidate, CostScore, CostTerm, DispatchContext};
use crate::models::{FloorIndex, Request};

// ======================== Time-based terms ========================

/// Estimated ticks until the vehicle reaches the pickup floor.
///
/// An idle vehicle drives straight there. A busy one first walks its plan,
/// paying travel and dwell per stop, and arrives early if the plan already
/// stops at the pickup floor.
#[derive(Debug, Clone, Copy)]
pub struct EtaToPickup;

/// Ticks to reach `floor` by following `candidate`'s plan.
pub fn eta_to_floor(candidate: &Candidate<'_>, floor: FloorIndex, context: &DispatchContext) -> f64 {
    let mut position = candidate.vehicle.floor;
    if candidate.plan.is_empty() {
        return context.travel_ticks(position, floor);
    }

    let mut eta = 0.0;
    for task in &candidate.plan.tasks {
        eta += context.travel_ticks(position, task.floor);
        if task.floor == floor {
            return eta;
        }
        eta += context.stop_ticks as f64;
        position = task.floor;
    }
    eta + context.travel_ticks(position, floor)
}

impl CostTerm for EtaToPickup {
    fn name(&self) -> &'static str {
        "ETA"
    }

    fn evaluate(
        &self,
        candidate: &Candidate<'_>,
        request: &Request,
        context: &DispatchContext,
    ) -> CostScore {
        eta_to_floor(candidate, request.origin, context)
    }

    fn description(&self) -> &'static str {
        "Estimated Time To Pickup"
    }
}

/// Ticks the passenger has already waited.
///
/// Identical for every vehicle, so it never changes the ranking of one
/// request; it only raises the absolute cost of old requests.
#[derive(Debug, Clone, Copy)]
pub struct WaitTime;

impl CostTerm for WaitTime {
    fn name(&self) -> &'static str {
        "WAIT"
    }

    fn evaluate(
        &self,
        _candidate: &Candidate<'_>,
        request: &Request,
        context: &DispatchContext,
    ) -> CostScore {
        request.wait_time(context.tick) as f64
    }

    fn description(&self) -> &'static str {
        "Wait Time So Far"
    }
}

// ======================== Path-based terms ========================

/// Floors off the vehicle's committed path.
///
/// Zero when the vehicle is idle or the pickup lies between the current
/// floor and the current target; otherwise the distance to the pickup.
#[derive(Debug, Clone, Copy)]
pub struct Detour;

impl CostTerm for Detour {
    fn name(&self) -> &'static str {
        "DETOUR"
    }

    fn evaluate(
        &self,
        candidate: &Candidate<'_>,
        request: &Request,
        _context: &DispatchContext,
    ) -> CostScore {
        let current = candidate.vehicle.floor;
        let target = if candidate.vehicle.moving {
            candidate.vehicle.target_floor
        } else {
            candidate.plan.tasks.first().map(|t| t.floor)
        };
        let Some(target) = target else {
            return 0.0;
        };
        let (lo, hi) = (current.min(target), current.max(target));
        if (lo..=hi).contains(&request.origin) {
            0.0
        } else {
            f64::from((request.origin - current).abs())
        }
    }

    fn description(&self) -> &'static str {
        "Detour From Committed Path"
    }
}

/// Fixed reward when the vehicle already sweeps the request's way.
#[derive(Debug, Clone, Copy)]
pub struct DirectionBonus {
    /// Score added on a match (negative = reward).
    pub reward: f64,
}

impl Default for DirectionBonus {
    fn default() -> Self {
        Self { reward: -5.0 }
    }
}

impl CostTerm for DirectionBonus {
    fn name(&self) -> &'static str {
        "DIRECTION"
    }

    fn evaluate(
        &self,
        candidate: &Candidate<'_>,
        request: &Request,
        _context: &DispatchContext,
    ) -> CostScore {
        if candidate.scan == request.direction {
            self.reward
        } else {
            0.0
        }
    }

    fn description(&self) -> &'static str {
        "Scan Direction Match"
    }
}

// ======================== Load terms ========================

/// Occupancy fraction scaled to a penalty.
#[derive(Debug, Clone, Copy)]
pub struct LoadPenalty {
    pub scale: f64,
}

impl Default for LoadPenalty {
    fn default() -> Self {
        Self { scale: 10.0 }
    }
}

impl CostTerm for LoadPenalty {
    fn name(&self) -> &'static str {
        "LOAD"
    }

    fn evaluate(
        &self,
        candidate: &Candidate<'_>,
        _request: &Request,
        _context: &DispatchContext,
    ) -> CostScore {
        candidate.vehicle.load_factor() * self.scale
    }

    fn description(&self) -> &'static str {
        "Occupancy Penalty"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, Task, VehiclePlan, VehicleState};

    fn ctx() -> DispatchContext {
        DispatchContext::at_tick(50).with_timing(2, 3)
    }

    #[test]
    fn test_eta_idle_is_direct() {
        let v = VehicleState::new(0, 2, 8);
        let plan = VehiclePlan::new(0, Direction::Up);
        let c = Candidate::new(&v, &plan, Direction::Up);
        let r = Request::new(1, 7, 9, 0);
        assert!((EtaToPickup.evaluate(&c, &r, &ctx()) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_eta_walks_plan() {
        let v = VehicleState::new(0, 0, 8).with_target(4);
        let plan = VehiclePlan::new(0, Direction::Up)
            .with_tasks(vec![Task::dropoff(4, 10), Task::dropoff(6, 11)]);
        let c = Candidate::new(&v, &plan, Direction::Up);

        // Pickup on a planned stop: 4 floors, no dwell at the pickup itself.
        let on_path = Request::new(1, 4, 9, 0);
        assert!((EtaToPickup.evaluate(&c, &on_path, &ctx()) - 8.0).abs() < 1e-10);

        // Pickup past the plan: 0->4 (8) + 3 + 4->6 (4) + 3 + 6->2 (8) = 26.
        let behind = Request::new(2, 2, 0, 0);
        assert!((EtaToPickup.evaluate(&c, &behind, &ctx()) - 26.0).abs() < 1e-10);
    }

    #[test]
    fn test_wait_time() {
        let v = VehicleState::new(0, 0, 8);
        let plan = VehiclePlan::new(0, Direction::Up);
        let c = Candidate::new(&v, &plan, Direction::Up);
        let r = Request::new(1, 3, 5, 20);
        assert!((WaitTime.evaluate(&c, &r, &ctx()) - 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_detour() {
        let moving = VehicleState::new(0, 2, 8).with_target(8);
        let plan = VehiclePlan::new(0, Direction::Up);
        let c = Candidate::new(&moving, &plan, Direction::Up);
        assert!(Detour.evaluate(&c, &Request::new(1, 5, 9, 0), &ctx()).abs() < 1e-10);
        assert!((Detour.evaluate(&c, &Request::new(2, 0, 9, 0), &ctx()) - 2.0).abs() < 1e-10);

        let idle = VehicleState::new(1, 2, 8);
        let c = Candidate::new(&idle, &plan, Direction::Up);
        assert!(Detour.evaluate(&c, &Request::new(3, 0, 9, 0), &ctx()).abs() < 1e-10);
    }

    #[test]
    fn test_direction_bonus() {
        let v = VehicleState::new(0, 0, 8);
        let plan = VehiclePlan::new(0, Direction::Up);
        let up = Candidate::new(&v, &plan, Direction::Up);
        let down = Candidate::new(&v, &plan, Direction::Down);
        let r = Request::new(1, 3, 5, 0);
        let bonus = DirectionBonus::default();
        assert!((bonus.evaluate(&up, &r, &ctx()) + 5.0).abs() < 1e-10);
        assert!(bonus.evaluate(&down, &r, &ctx()).abs() < 1e-10);
    }

    #[test]
    fn test_load_penalty() {
        let v = VehicleState::new(0, 0, 4).with_passengers(vec![1, 2]);
        let plan = VehiclePlan::new(0, Direction::Up);
        let c = Candidate::new(&v, &plan, Direction::Up);
        let r = Request::new(9, 3, 5, 0);
        assert!((LoadPenalty::default().evaluate(&c, &r, &ctx()) - 5.0).abs() < 1e-10);
    }
}
