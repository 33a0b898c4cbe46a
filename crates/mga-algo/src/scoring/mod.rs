//! Score tracking across SPORES iterations.
//!
//! The score state is an explicit value threaded through the loop: the
//! tracker takes the previous state plus the newest spore and returns the
//! next state. Nothing is shared between chains.
//!
//! | Method | Weight after a spore |
//! |--------|----------------------|
//! | `deterministic` | `w + increment` if used, else `w` |
//! | `relative_deployment` | `w + value / limit` |
//! | `relative_deployment_normalized` | as above, divided by the largest weight |
//! | `evolving_average` / `evolving_median` | `1 / max(|x - m| / m, clip)`, `0` when `m == 0` |
//! | `random` | drawn fresh each iteration, state untouched |

mod deployment;
mod evolving;

pub use deployment::{normalize_by_max, relative_deployment};
pub use evolving::{average_deployment, evolving_weights, median_deployment};

use crate::collector::SporeRecord;
use crate::config::{ScoringMethod, ScoringParams, SporesConfig};
use mga_core::{ComponentId, MgaError, MgaResult, NetworkAdapter};
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Weight per tracked component.
pub type Weights = BTreeMap<ComponentId, f64>;

/// Decision value per tracked component in one solution.
pub type Deployment = BTreeMap<ComponentId, f64>;

/// Components behind the tracked categories, resolved once per chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedComponents {
    by_category: BTreeMap<String, BTreeSet<ComponentId>>,
    capacity_limits: BTreeMap<ComponentId, f64>,
}

impl TrackedComponents {
    /// Resolve every category against the network.
    ///
    /// A category with no components is a configuration error: it either
    /// does not exist in the model or was misspelt.
    pub fn collect<N: NetworkAdapter + ?Sized>(
        network: &N,
        categories: &BTreeSet<String>,
    ) -> MgaResult<Self> {
        let mut by_category = BTreeMap::new();
        let mut capacity_limits = BTreeMap::new();
        for category in categories {
            let members = network.components_by_category(category);
            if members.is_empty() {
                return Err(MgaError::Configuration(format!(
                    "tracked category '{category}' has no components in the network"
                )));
            }
            for id in &members {
                if let Some(limit) = network.capacity_limit(id) {
                    capacity_limits.insert(id.clone(), limit);
                }
            }
            by_category.insert(category.clone(), members);
        }
        Ok(Self {
            by_category,
            capacity_limits,
        })
    }

    /// Every tracked component, each once, in id order.
    pub fn components(&self) -> BTreeSet<&ComponentId> {
        self.by_category.values().flatten().collect()
    }

    /// Whether the component belongs to any of the given categories.
    pub fn in_any(&self, component: &ComponentId, categories: &BTreeSet<String>) -> bool {
        categories.iter().any(|category| {
            self.by_category
                .get(category)
                .is_some_and(|members| members.contains(component))
        })
    }

    pub fn capacity_limit(&self, component: &ComponentId) -> Option<f64> {
        self.capacity_limits.get(component).copied()
    }

    pub fn count(&self) -> usize {
        self.components().len()
    }

    /// All tracked components mapped to zero.
    pub fn zeros(&self) -> Weights {
        self.components()
            .into_iter()
            .map(|id| (id.clone(), 0.0))
            .collect()
    }
}

/// Per-component weights plus the deployment history they were derived from.
///
/// The key set is fixed at creation: every tracked component, for the whole
/// run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreState {
    weights: Weights,
    history: Vec<Deployment>,
}

impl ScoreState {
    /// Zero weights; the history starts with the reference solution.
    pub fn new(tracked: &TrackedComponents, reference: Deployment) -> Self {
        Self {
            weights: tracked.zeros(),
            history: vec![reference],
        }
    }

    pub fn weight(&self, component: &ComponentId) -> f64 {
        self.weights.get(component).copied().unwrap_or(0.0)
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Reference solution first, then one entry per spore.
    pub fn history(&self) -> &[Deployment] {
        &self.history
    }
}

/// Applies the configured scoring method.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTracker {
    method: ScoringMethod,
    params: ScoringParams,
}

impl ScoreTracker {
    pub fn new(method: ScoringMethod, params: ScoringParams) -> Self {
        Self { method, params }
    }

    pub fn from_config(config: &SporesConfig) -> Self {
        Self::new(config.scoring_method, config.scoring.clone())
    }

    pub fn method(&self) -> ScoringMethod {
        self.method
    }

    /// Weights to steer the next solve with.
    ///
    /// The random method draws every tracked weight from `rng`; all other
    /// methods return the state's weights and leave `rng` untouched.
    pub fn objective_weights<R: Rng>(
        &self,
        state: &ScoreState,
        tracked: &TrackedComponents,
        rng: &mut R,
    ) -> Weights {
        match self.method {
            ScoringMethod::Random => {
                let upper = self.params.random_upper_bound;
                tracked
                    .components()
                    .into_iter()
                    .map(|id| (id.clone(), rng.gen_range(0.0..=upper)))
                    .collect()
            }
            _ => state.weights.clone(),
        }
    }

    /// Next score state after `record` was found.
    pub fn update(
        &self,
        state: &ScoreState,
        record: &SporeRecord,
        tracked: &TrackedComponents,
    ) -> ScoreState {
        let latest = record.values();
        let weights: Weights = match self.method {
            ScoringMethod::Deterministic => state
                .weights
                .iter()
                .map(|(id, w)| {
                    let used = latest.get(id).copied().unwrap_or(0.0) > self.params.use_threshold;
                    let next = if used {
                        w + self.params.weight_increment
                    } else {
                        *w
                    };
                    (id.clone(), next)
                })
                .collect(),
            ScoringMethod::RelativeDeployment => {
                accumulate(&state.weights, &relative_deployment(latest, tracked))
            }
            ScoringMethod::RelativeDeploymentNormalized => normalize_by_max(&accumulate(
                &state.weights,
                &relative_deployment(latest, tracked),
            )),
            ScoringMethod::EvolvingAverage => {
                let center = average_deployment(&state.history, tracked);
                evolving_weights(latest, &center, self.params.evolving_clip_min)
            }
            ScoringMethod::EvolvingMedian => {
                let center = median_deployment(&state.history, tracked);
                evolving_weights(latest, &center, self.params.evolving_clip_min)
            }
            ScoringMethod::Random => state.weights.clone(),
        };

        let mut history = state.history.clone();
        history.push(latest.clone());
        ScoreState { weights, history }
    }
}

fn accumulate(previous: &Weights, increment: &Weights) -> Weights {
    previous
        .iter()
        .map(|(id, w)| (id.clone(), w + increment.get(id).copied().unwrap_or(0.0)))
        .collect()
}
