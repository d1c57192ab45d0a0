//! Nearest-vehicle baseline dispatcher.

use super::{Candidate, CostScore, DispatchContext, Dispatcher};
use crate::models::{Request, VehicleId};

/// Ranks vehicles by straight travel time to the pickup floor, ignoring
/// plans, load and direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestVehicle;

impl Dispatcher for NearestVehicle {
    fn name(&self) -> &'static str {
        "NEAREST"
    }

    fn rank(
        &self,
        request: &Request,
        candidates: &[Candidate<'_>],
        context: &DispatchContext,
    ) -> Vec<(VehicleId, CostScore)> {
        let mut ranked: Vec<(VehicleId, CostScore)> = candidates
            .iter()
            .map(|c| {
                (
                    c.vehicle.id,
                    context.travel_ticks(c.vehicle.floor, request.origin),
                )
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked
    }
}
