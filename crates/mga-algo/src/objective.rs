//! SPORES objective construction.
//!
//! The cost objective of the least-cost model is replaced by a weighted sum
//! over the tracked decision variables:
//!
//! ```text
//! minimise  Σ_c  sense · (k_div · w_c + k_int · [c intensifiable])  · x_c
//! ```
//!
//! The original cost expression is not part of the new objective; it stays
//! inside the adapter and is bounded by the cost ceiling instead.

use crate::config::{ObjectiveSense, SporesConfig, SporesMode};
use crate::scoring::{TrackedComponents, Weights};
use mga_core::LinearObjective;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveBuilder {
    mode: SporesMode,
    sense: ObjectiveSense,
    diversification_coefficient: f64,
    intensification_coefficient: f64,
    intensifiable_categories: BTreeSet<String>,
}

impl ObjectiveBuilder {
    /// Plain diversification with unit coefficient, minimised.
    pub fn diversify() -> Self {
        Self {
            mode: SporesMode::Diversify,
            sense: ObjectiveSense::Min,
            diversification_coefficient: 1.0,
            intensification_coefficient: 0.0,
            intensifiable_categories: BTreeSet::new(),
        }
    }

    pub fn from_config(config: &SporesConfig) -> Self {
        Self {
            mode: config.spores_mode,
            sense: config.objective_sense,
            diversification_coefficient: config.diversification_coefficient,
            intensification_coefficient: config.intensification_coefficient,
            intensifiable_categories: config.intensifiable_categories.clone(),
        }
    }

    /// Objective listing every tracked component, zero coefficients included.
    pub fn build(&self, weights: &Weights, tracked: &TrackedComponents) -> LinearObjective {
        let sign = self.sense.sign();
        tracked
            .components()
            .into_iter()
            .map(|id| {
                let weight = weights.get(id).copied().unwrap_or(0.0);
                let mut coefficient = self.diversification_coefficient * weight;
                if self.mode == SporesMode::IntensifyAndDiversify
                    && tracked.in_any(id, &self.intensifiable_categories)
                {
                    coefficient += self.intensification_coefficient;
                }
                (id.clone(), sign * coefficient)
            })
            .collect()
    }
}
