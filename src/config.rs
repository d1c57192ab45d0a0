//! Dispatcher configuration.
//!
//! Every tunable of the controller lives in [`DispatchConfig`]. The defaults
//! reproduce the reference cost model (ETA 1.0, wait 2.0, detour 0.5,
//! load 1.5, direction bonus -5) and timing (2 ticks per floor, 3 ticks per
//! stop, re-dispatch after 100 ticks).
//!
//! # Example
//! ```
//! use u_dispatch::config::{DispatchConfig, Strategy};
//!
//! let config = DispatchConfig::default()
//!     .with_strategy(Strategy::CostBased)
//!     .with_reallocation_threshold(60);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dispatching::EvaluationMode;
use crate::models::{FloorIndex, Tick};

/// Which decision procedure drives the vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Per-vehicle LOOK selector over the demand sets, no global assignment.
    Reactive,
    /// Weighted-cost assignment with planned task queues.
    #[default]
    CostBased,
    /// Assignment to the closest vehicle with planned task queues.
    Nearest,
}

/// Weights of the cost terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    pub eta_to_pickup: f64,
    pub wait_time: f64,
    pub detour: f64,
    pub load: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            eta_to_pickup: 1.0,
            wait_time: 2.0,
            detour: 0.5,
            load: 1.5,
        }
    }
}

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Decision procedure.
    pub strategy: Strategy,
    /// Cost term weights.
    pub weights: CostWeights,
    /// Added when the vehicle's scan matches the request direction.
    pub direction_bonus: f64,
    /// Multiplier turning the occupancy fraction into a penalty.
    pub load_penalty_scale: f64,
    /// Travel ticks per floor.
    pub ticks_per_floor: Tick,
    /// Dwell ticks per stop.
    pub stop_ticks: Tick,
    /// Wait or assignment age after which a request is re-dispatched.
    pub reallocation_threshold: Tick,
    /// Floor an idle vehicle without work returns to.
    pub park_floor: FloorIndex,
    /// How cost terms are combined.
    pub evaluation_mode: EvaluationMode,
    /// Divert to floors passed on the way when it serves someone.
    pub opportunistic_stops: bool,
    /// Spread vehicles evenly over the building at init.
    pub spread_on_init: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::CostBased,
            weights: CostWeights::default(),
            direction_bonus: -5.0,
            load_penalty_scale: 10.0,
            ticks_per_floor: 2,
            stop_ticks: 3,
            reallocation_threshold: 100,
            park_floor: 0,
            evaluation_mode: EvaluationMode::Weighted,
            opportunistic_stops: true,
            spread_on_init: false,
        }
    }
}

/// Configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: i64 },
    #[error("ticks_per_floor must be at least 1")]
    ZeroTravelTime,
}

impl DispatchConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the controller cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floats = [
            ("weights.eta_to_pickup", self.weights.eta_to_pickup),
            ("weights.wait_time", self.weights.wait_time),
            ("weights.detour", self.weights.detour),
            ("weights.load", self.weights.load),
            ("direction_bonus", self.direction_bonus),
            ("load_penalty_scale", self.load_penalty_scale),
        ];
        for (field, value) in floats {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }

        let ints = [
            ("ticks_per_floor", self.ticks_per_floor),
            ("stop_ticks", self.stop_ticks),
            ("reallocation_threshold", self.reallocation_threshold),
            ("park_floor", i64::from(self.park_floor)),
        ];
        for (field, value) in ints {
            if value < 0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if self.ticks_per_floor == 0 {
            return Err(ConfigError::ZeroTravelTime);
        }
        Ok(())
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the cost weights.
    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the direction bonus.
    pub fn with_direction_bonus(mut self, bonus: f64) -> Self {
        self.direction_bonus = bonus;
        self
    }

    /// Sets travel and dwell timing.
    pub fn with_timing(mut self, ticks_per_floor: Tick, stop_ticks: Tick) -> Self {
        self.ticks_per_floor = ticks_per_floor;
        self.stop_ticks = stop_ticks;
        self
    }

    /// Sets the re-dispatch threshold.
    pub fn with_reallocation_threshold(mut self, ticks: Tick) -> Self {
        self.reallocation_threshold = ticks;
        self
    }

    /// Sets the parking floor.
    pub fn with_park_floor(mut self, floor: FloorIndex) -> Self {
        self.park_floor = floor;
        self
    }

    /// Sets the cost combination mode.
    pub fn with_evaluation_mode(mut self, mode: EvaluationMode) -> Self {
        self.evaluation_mode = mode;
        self
    }

    /// Enables or disables opportunistic stops.
    pub fn with_opportunistic_stops(mut self, enabled: bool) -> Self {
        self.opportunistic_stops = enabled;
        self
    }

    /// Enables or disables the initial spread.
    pub fn with_spread_on_init(mut self, enabled: bool) -> Self {
        self.spread_on_init = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let config = DispatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.strategy, Strategy::CostBased);
        assert!((config.weights.wait_time - 2.0).abs() < 1e-10);
        assert_eq!(config.reallocation_threshold, 100);
    }

    #[test]
    fn test_from_json_partial() {
        let config = DispatchConfig::from_json(
            r#"{"strategy":"reactive","weights":{"detour":1.25},"park_floor":3}"#,
        )
        .unwrap();
        assert_eq!(config.strategy, Strategy::Reactive);
        assert!((config.weights.detour - 1.25).abs() < 1e-10);
        assert!((config.weights.eta_to_pickup - 1.0).abs() < 1e-10);
        assert_eq!(config.park_floor, 3);
        assert_eq!(config.stop_ticks, 3);
    }

    #[test]
    fn test_json_round_trip() {
        let config = DispatchConfig::default()
            .with_strategy(Strategy::Nearest)
            .with_evaluation_mode(EvaluationMode::Lexicographic)
            .with_spread_on_init(true);
        let json = serde_json::to_string(&config).unwrap();
        let back = DispatchConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_rejects_bad_values() {
        let negative = DispatchConfig::default().with_timing(2, -1);
        assert!(matches!(
            negative.validate(),
            Err(ConfigError::Negative { field: "stop_ticks", .. })
        ));

        let zero = DispatchConfig::default().with_timing(0, 3);
        assert!(matches!(zero.validate(), Err(ConfigError::ZeroTravelTime)));

        let nan = DispatchConfig::default().with_direction_bonus(f64::NAN);
        assert!(matches!(nan.validate(), Err(ConfigError::NonFinite { .. })));

        let park = DispatchConfig::default().with_park_floor(-2);
        assert!(park.validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        let err = DispatchConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse configuration"));
    }
}
