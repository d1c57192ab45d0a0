//! Cost-based request dispatching.
//!
//! Decides which vehicle should serve a pending request. Each cost term is a
//! strategy scoring one aspect of a (vehicle, request) pair; a
//! [`CostEngine`] combines them and ranks the vehicles. A pure-distance
//! [`NearestVehicle`] dispatcher is available as a baseline.
//!
//! # Usage
//!
//! ```
//! use u_dispatch::dispatching::{terms, CostEngine, DispatchContext};
//!
//! let engine = CostEngine::new()
//!     .with_weighted_term(terms::EtaToPickup, 1.0)
//!     .with_weighted_term(terms::Detour, 0.5);
//!
//! let context = DispatchContext::at_tick(0);
//! // let ranked = engine.rank(&request, &candidates, &context);
//! ```
//!
//! # References
//!
//! - Barney & Al-Sharif (2015), "Elevator Traffic Handbook", Ch. 14 (group control)
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
mod nearest;
pub mod terms;

pub use context::DispatchContext;
pub use engine::{CostEngine, EvaluationMode};
pub use nearest::NearestVehicle;

use crate::models::{Direction, Request, VehicleId, VehiclePlan, VehicleState};
use std::fmt::Debug;

/// Score returned by a cost term.
///
/// Lower = better candidate.
pub type CostScore = f64;

/// A vehicle under consideration for a request.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Mirrored vehicle state.
    pub vehicle: &'a VehicleState,
    /// The vehicle's current plan.
    pub plan: &'a VehiclePlan,
    /// The vehicle's scan direction.
    pub scan: Direction,
}

impl<'a> Candidate<'a> {
    pub fn new(vehicle: &'a VehicleState, plan: &'a VehiclePlan, scan: Direction) -> Self {
        Self {
            vehicle,
            plan,
            scan,
        }
    }

    /// Whether the vehicle has neither work nor motion.
    pub fn is_idle(&self) -> bool {
        self.plan.is_empty() && !self.vehicle.moving
    }
}

/// One aspect of the cost of serving a request with a vehicle.
///
/// # Score Convention
/// **Lower score = better vehicle.** Rewards are negative scores.
pub trait CostTerm: Send + Sync + Debug {
    /// Term name (e.g., "ETA", "DETOUR").
    fn name(&self) -> &'static str;

    /// Scores serving `request` with `candidate`.
    fn evaluate(
        &self,
        candidate: &Candidate<'_>,
        request: &Request,
        context: &DispatchContext,
    ) -> CostScore;

    /// Term description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Ranks vehicles for a request.
pub trait Dispatcher: Send + Sync + Debug {
    /// Dispatcher name.
    fn name(&self) -> &'static str;

    /// Returns `(vehicle, cost)` pairs, cheapest first. Ties go to the
    /// lower vehicle id.
    fn rank(
        &self,
        request: &Request,
        candidates: &[Candidate<'_>],
        context: &DispatchContext,
    ) -> Vec<(VehicleId, CostScore)>;

    /// The cheapest vehicle, if any.
    fn select_best(
        &self,
        request: &Request,
        candidates: &[Candidate<'_>],
        context: &DispatchContext,
    ) -> Option<VehicleId> {
        self.rank(request, candidates, context)
            .first()
            .map(|&(v, _)| v)
    }
}
