//! # mga-algo: SPORES Alternative Generation
//!
//! Given a capacity planning model that has already been solved for least
//! cost, this crate searches the near-optimal space around that solution for
//! spatially and technologically different alternatives ("spores").
//!
//! ## The SPORES loop
//!
//! | Step | Component |
//! |------|-----------|
//! | Fix `total cost <= (1 + slack) * reference cost` | [`mga_core::CostCeiling`] |
//! | Turn scores into per-component weights | [`ScoreTracker`] |
//! | Build the replacement objective | [`ObjectiveBuilder`] |
//! | Re-solve through the model's adapter | [`mga_core::NetworkAdapter`] |
//! | Record the new solution | [`ResultCollector`] |
//!
//! [`run_spores`] drives one chain; [`run_chains`] runs independent chains
//! on a rayon pool, each with its own network.
//!
//! ## Scoring methods
//!
//! | Method | Weight update |
//! |--------|---------------|
//! | [`ScoringMethod::Deterministic`] | `+increment` for every used component |
//! | [`ScoringMethod::RelativeDeployment`] | `+value / capacity limit` |
//! | [`ScoringMethod::RelativeDeploymentNormalized`] | as above, scaled to max 1 |
//! | [`ScoringMethod::EvolvingAverage`] | inverse distance to the mean deployment |
//! | [`ScoringMethod::EvolvingMedian`] | inverse distance to the median deployment |
//! | [`ScoringMethod::Random`] | seeded uniform draw every iteration |
//!
//! ## Example
//!
//! ```ignore
//! use mga_algo::{load_config_from_path, run_spores, CapacityNetwork, LpNetwork};
//! use mga_core::SolverOptions;
//!
//! let mut network = LpNetwork::new(model)?;
//! network.optimize("clarabel")?;
//!
//! let config = load_config_from_path("spores.yaml".as_ref())?;
//! let outcome = run_spores(&mut network, &config, &SolverOptions::new())?;
//! for spore in &outcome.spores {
//!     println!("spore {}: cost {:.1}", spore.iteration(), spore.objective_value());
//! }
//! ```

pub mod backend;
pub mod chains;
pub mod collector;
pub mod config;
pub mod driver;
pub mod objective;
pub mod scoring;

// Scripted adapter for tests (also used by downstream crates)
pub mod test_utils;

#[cfg(any(feature = "solver-clarabel", feature = "solver-highs"))]
pub use backend::{LpNetwork, LpSolution};
pub use backend::{CapacityNetwork, Generator, Line, ModelError};
pub use chains::{run_chains, ChainJob, ChainReport};
pub use collector::{ResultCollector, SporeCollection, SporeRecord};
pub use config::{
    config_from_json_str, config_from_toml_str, config_from_yaml_str, load_config_from_path,
    ObjectiveSense, ScoringMethod, ScoringParams, SporesConfig, SporesMode,
};
pub use driver::{run_spores, SporesOutcome, Termination};
pub use objective::ObjectiveBuilder;
pub use scoring::{Deployment, ScoreState, ScoreTracker, TrackedComponents, Weights};
