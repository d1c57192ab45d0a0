//! Service quality metrics (KPIs).
//!
//! Computes passenger-level performance indicators from the trip records
//! the controller keeps.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Delivered | Trips with an alight tick |
//! | Outstanding | Trips not yet delivered |
//! | Avg / P95 Wait | Call to board |
//! | Avg Transit | Board to alight |
//! | Avg / P95 System Time | Call to alight |
//! | Completion Rate | Delivered / all trips |
//!
//! # Reference
//! Barney & Al-Sharif (2015), "Elevator Traffic Handbook", Ch. 7: Performance Measures

use serde::{Deserialize, Serialize};

use crate::models::{PassengerId, Tick, VehicleId};

/// Timeline of one passenger's trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    pub passenger: PassengerId,
    pub call_tick: Tick,
    pub board_tick: Option<Tick>,
    pub alight_tick: Option<Tick>,
    /// Vehicle the passenger boarded.
    pub vehicle: Option<VehicleId>,
}

impl TripRecord {
    /// Creates a record for a fresh call.
    pub fn new(passenger: PassengerId, call_tick: Tick) -> Self {
        Self {
            passenger,
            call_tick,
            board_tick: None,
            alight_tick: None,
            vehicle: None,
        }
    }

    /// Ticks between call and boarding.
    pub fn wait(&self) -> Option<Tick> {
        self.board_tick.map(|b| b - self.call_tick)
    }

    /// Ticks between boarding and alighting.
    pub fn transit(&self) -> Option<Tick> {
        Some(self.alight_tick? - self.board_tick?)
    }

    /// Ticks between call and alighting.
    pub fn system_time(&self) -> Option<Tick> {
        self.alight_tick.map(|a| a - self.call_tick)
    }

    pub fn is_delivered(&self) -> bool {
        self.alight_tick.is_some()
    }
}

/// Service performance indicators.
///
/// All time values are in ticks.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceKpi {
    /// Trips completed.
    pub delivered: usize,
    /// Trips still waiting or riding.
    pub outstanding: usize,
    /// Mean call-to-board time over boarded trips.
    pub avg_wait: f64,
    /// 95th percentile call-to-board time.
    pub p95_wait: f64,
    /// Mean board-to-alight time over delivered trips.
    pub avg_transit: f64,
    /// Mean call-to-alight time over delivered trips.
    pub avg_system_time: f64,
    /// 95th percentile call-to-alight time.
    pub p95_system_time: f64,
    /// Fraction of trips delivered (0.0..1.0).
    pub completion_rate: f64,
}

impl ServiceKpi {
    /// Computes KPIs from trip records.
    pub fn calculate(trips: &[TripRecord]) -> Self {
        let delivered = trips.iter().filter(|t| t.is_delivered()).count();
        let waits: Vec<Tick> = trips.iter().filter_map(TripRecord::wait).collect();
        let transits: Vec<Tick> = trips.iter().filter_map(TripRecord::transit).collect();
        let systems: Vec<Tick> = trips.iter().filter_map(TripRecord::system_time).collect();

        let completion_rate = if trips.is_empty() {
            1.0
        } else {
            delivered as f64 / trips.len() as f64
        };

        Self {
            delivered,
            outstanding: trips.len() - delivered,
            avg_wait: mean(&waits),
            p95_wait: percentile(&waits, 0.95),
            avg_transit: mean(&transits),
            avg_system_time: mean(&systems),
            p95_system_time: percentile(&systems, 0.95),
            completion_rate,
        }
    }

    /// Whether the service meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_p95_wait: f64, min_completion: f64) -> bool {
        self.p95_wait <= max_p95_wait && self.completion_rate >= min_completion
    }
}

fn mean(values: &[Tick]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<Tick>() as f64 / values.len() as f64
}

/// Nearest-rank percentile.
fn percentile(values: &[Tick], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let rank = (q * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1] as f64
}
