//! Cost engine for multi-criteria vehicle ranking.
//!
//! Composes cost terms with configurable weights and combination modes.
//! Remaining ties always go to the lowest vehicle id so that ranking is
//! deterministic.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::terms;
use super::{Candidate, CostScore, CostTerm, DispatchContext, Dispatcher};
use crate::config::DispatchConfig;
use crate::models::{Request, VehicleId};

/// How multiple cost terms are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    /// Weighted sum of all term scores.
    #[default]
    Weighted,
    /// Compare term by term in insertion order; later terms only break ties.
    Lexicographic,
}

#[derive(Clone)]
struct WeightedTerm {
    term: Arc<dyn CostTerm>,
    weight: f64,
}

/// A composable cost engine ranking vehicles for a request.
///
/// # Example
/// ```
/// use u_dispatch::dispatching::{terms, CostEngine, EvaluationMode};
///
/// let engine = CostEngine::new()
///     .with_mode(EvaluationMode::Lexicographic)
///     .with_term(terms::EtaToPickup)
///     .with_term(terms::Detour);
/// ```
#[derive(Clone)]
pub struct CostEngine {
    terms: Vec<WeightedTerm>,
    mode: EvaluationMode,
    epsilon: f64,
}

impl CostEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
            mode: EvaluationMode::Weighted,
            epsilon: 1e-9,
        }
    }

    /// The configured cost model: ETA, wait, detour and load weighted, plus
    /// the direction bonus at weight 1.
    pub fn from_config(config: &DispatchConfig) -> Self {
        let w = &config.weights;
        Self::new()
            .with_mode(config.evaluation_mode)
            .with_weighted_term(terms::EtaToPickup, w.eta_to_pickup)
            .with_weighted_term(terms::WaitTime, w.wait_time)
            .with_weighted_term(terms::Detour, w.detour)
            .with_weighted_term(
                terms::LoadPenalty {
                    scale: config.load_penalty_scale,
                },
                w.load,
            )
            .with_term(terms::DirectionBonus {
                reward: config.direction_bonus,
            })
    }

    /// Adds a term (weight 1.0).
    pub fn with_term<T: CostTerm + 'static>(self, term: T) -> Self {
        self.with_weighted_term(term, 1.0)
    }

    /// Adds a weighted term.
    pub fn with_weighted_term<T: CostTerm + 'static>(mut self, term: T, weight: f64) -> Self {
        self.terms.push(WeightedTerm {
            term: Arc::new(term),
            weight,
        });
        self
    }

    /// Sets the combination mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Weighted score of each term for one candidate.
    pub fn evaluate(
        &self,
        candidate: &Candidate<'_>,
        request: &Request,
        context: &DispatchContext,
    ) -> Vec<CostScore> {
        self.terms
            .iter()
            .map(|wt| wt.term.evaluate(candidate, request, context) * wt.weight)
            .collect()
    }

    /// Total weighted cost of one candidate.
    pub fn cost(
        &self,
        candidate: &Candidate<'_>,
        request: &Request,
        context: &DispatchContext,
    ) -> CostScore {
        self.evaluate(candidate, request, context).iter().sum()
    }

    fn compare_lexicographic(&self, a: &[CostScore], b: &[CostScore]) -> std::cmp::Ordering {
        for (sa, sb) in a.iter().zip(b) {
            if (sa - sb).abs() > self.epsilon {
                return sa.partial_cmp(sb).unwrap_or(std::cmp::Ordering::Equal);
            }
        }
        std::cmp::Ordering::Equal
    }
}

impl Dispatcher for CostEngine {
    fn name(&self) -> &'static str {
        "COST"
    }

    fn rank(
        &self,
        request: &Request,
        candidates: &[Candidate<'_>],
        context: &DispatchContext,
    ) -> Vec<(VehicleId, CostScore)> {
        let mut scored: Vec<(VehicleId, Vec<CostScore>, CostScore)> = candidates
            .iter()
            .map(|c| {
                let scores = self.evaluate(c, request, context);
                let total = scores.iter().sum();
                (c.vehicle.id, scores, total)
            })
            .collect();

        scored.sort_by(|a, b| {
            let primary = match self.mode {
                EvaluationMode::Weighted => {
                    if (a.2 - b.2).abs() > self.epsilon {
                        a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal)
                    } else {
                        std::cmp::Ordering::Equal
                    }
                }
                EvaluationMode::Lexicographic => self.compare_lexicographic(&a.1, &b.1),
            };
            primary.then(a.0.cmp(&b.0))
        });

        scored.into_iter().map(|(v, _, total)| (v, total)).collect()
    }
}

impl Default for CostEngine {
    fn default() -> Self {
        Self::from_config(&DispatchConfig::default())
    }
}

impl std::fmt::Debug for CostEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostEngine")
            .field(
                "terms",
                &self
                    .terms
                    .iter()
                    .map(|t| format!("{}(w={})", t.term.name(), t.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .finish()
    }
}
