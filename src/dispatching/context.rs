//! Dispatching context for cost evaluation.

use crate::config::DispatchConfig;
use crate::models::{FloorIndex, Tick};

/// Clock and timing model passed to cost terms.
///
/// All durations are in ticks.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    /// Current simulation tick.
    pub tick: Tick,
    /// Travel ticks per floor.
    pub ticks_per_floor: Tick,
    /// Dwell ticks per stop.
    pub stop_ticks: Tick,
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self {
            tick: 0,
            ticks_per_floor: 2,
            stop_ticks: 3,
        }
    }
}

impl DispatchContext {
    /// Creates a context at the given tick with default timing.
    pub fn at_tick(tick: Tick) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }

    /// Creates a context at the given tick with the configured timing.
    pub fn from_config(config: &DispatchConfig, tick: Tick) -> Self {
        Self::at_tick(tick).with_timing(config.ticks_per_floor, config.stop_ticks)
    }

    /// Sets travel and dwell timing.
    pub fn with_timing(mut self, ticks_per_floor: Tick, stop_ticks: Tick) -> Self {
        self.ticks_per_floor = ticks_per_floor;
        self.stop_ticks = stop_ticks;
        self
    }

    /// Travel ticks between two floors.
    pub fn travel_ticks(&self, from: FloorIndex, to: FloorIndex) -> f64 {
        (i64::from((to - from).abs()) * self.ticks_per_floor) as f64
    }
}
