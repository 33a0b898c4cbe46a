//! SPORES iteration loop.
//!
//! ```text
//! reference cost C*  (from the already-optimised network)
//! ceiling = (1 + slack) · C*                     fixed for the whole chain
//!
//! for i in 1..=spores_number:
//!     w_i       = tracker.objective_weights(state)
//!     objective = builder.build(w_i)
//!     network.resolve([cost ≤ ceiling], objective)   ── failure → stop, partial
//!     record_i  = collector.record(i, network)
//!     state     = tracker.update(state, record_i)
//!     budget exhausted → stop after this iteration
//! ```
//!
//! Iterations are strictly sequential: the weights of iteration `i + 1`
//! depend on the state left by iteration `i`.

use crate::collector::{ResultCollector, SporeCollection};
use crate::config::SporesConfig;
use crate::objective::ObjectiveBuilder;
use crate::scoring::{ScoreState, ScoreTracker};
use mga_core::{CostCeiling, MgaError, MgaResult, NetworkAdapter, SolveFailure, SolverOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};
use web_time::Instant;

/// Relative overshoot of the cost ceiling tolerated before warning.
const CEILING_TOLERANCE: f64 = 1e-6;

/// Why a chain stopped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Termination {
    /// All requested spores were generated
    Completed,
    /// The re-solve at `iteration` failed; no record exists for it
    SolveFailed {
        iteration: usize,
        #[serde(serialize_with = "serialize_failure")]
        failure: SolveFailure,
    },
    /// The wall-clock budget ran out after `completed` iterations
    TimeBudgetExhausted { completed: usize },
}

fn serialize_failure<S: serde::Serializer>(
    failure: &SolveFailure,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(failure)
}

/// Result of one SPORES chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SporesOutcome {
    pub spores: SporeCollection,
    pub termination: Termination,
    /// Score state after the last recorded spore
    pub final_scores: ScoreState,
}

impl SporesOutcome {
    /// `true` only when every requested spore was produced.
    pub fn is_complete(&self) -> bool {
        self.termination == Termination::Completed
    }

    pub fn is_partial(&self) -> bool {
        !self.is_complete()
    }
}

/// Generate up to `config.spores_number` alternatives around the solution
/// currently held by `network`.
///
/// `network` must already hold a feasible least-cost solution; its current
/// objective value is the reference for the cost ceiling. Configuration and
/// adapter-contract problems are returned as errors. A failed re-solve is
/// not an error: the spores found so far are returned with
/// [`Termination::SolveFailed`].
pub fn run_spores<N: NetworkAdapter + ?Sized>(
    network: &mut N,
    config: &SporesConfig,
    solver_options: &SolverOptions,
) -> MgaResult<SporesOutcome> {
    let tracked = config.validate_against(&*network)?;

    let reference_cost = network.current_objective_value();
    if !reference_cost.is_finite() {
        return Err(MgaError::AdapterContract(format!(
            "reference objective value {reference_cost} is not finite; is the network optimised?"
        )));
    }
    let reference = ResultCollector::extract_values(&*network, &tracked)?;
    let ceiling = CostCeiling::from_reference(reference_cost, config.slack);
    let options = config.effective_solver_options(solver_options);

    let tracker = ScoreTracker::from_config(config);
    let builder = ObjectiveBuilder::from_config(config);
    let mut rng = StdRng::seed_from_u64(config.scoring.seed);
    let mut scores = ScoreState::new(&tracked, reference);
    let mut collector = ResultCollector::new();

    let budget = config.time_budget()?;
    let start = Instant::now();

    info!(
        reference_cost,
        cost_ceiling = ceiling.limit,
        spores = config.spores_number,
        method = config.scoring_method.as_str(),
        tracked = tracked.count(),
        "starting SPORES chain"
    );

    for iteration in 1..=config.spores_number {
        let weights = tracker.objective_weights(&scores, &tracked, &mut rng);
        let objective = builder.build(&weights, &tracked);
        debug!(iteration, terms = objective.len(), "re-solving with SPORES objective");

        if let Err(failure) = network.resolve(
            std::slice::from_ref(&ceiling),
            &objective,
            &config.solver,
            &options,
        ) {
            warn!(iteration, %failure, "SPORES re-solve failed, returning partial results");
            return Ok(SporesOutcome {
                spores: collector.finish(),
                termination: Termination::SolveFailed { iteration, failure },
                final_scores: scores,
            });
        }

        let record = collector.record(iteration, &*network, &tracked, weights, ceiling.limit)?;
        info!(
            iteration,
            cost = record.objective_value(),
            cost_ceiling = ceiling.limit,
            weighted_score = objective.evaluate(record.values()),
            "spore found"
        );
        let tolerance = CEILING_TOLERANCE * ceiling.limit.abs();
        if !ceiling.is_satisfied_by(record.objective_value(), tolerance) {
            warn!(
                iteration,
                cost = record.objective_value(),
                cost_ceiling = ceiling.limit,
                "spore cost exceeds the ceiling beyond solver tolerance"
            );
        }
        scores = tracker.update(&scores, record, &tracked);

        if let Some(budget) = budget {
            if iteration < config.spores_number && start.elapsed() >= budget {
                warn!(
                    completed = iteration,
                    elapsed_s = start.elapsed().as_secs_f64(),
                    "SPORES time budget exhausted"
                );
                return Ok(SporesOutcome {
                    spores: collector.finish(),
                    termination: Termination::TimeBudgetExhausted {
                        completed: iteration,
                    },
                    final_scores: scores,
                });
            }
        }
    }

    info!(
        spores = collector.len(),
        elapsed_s = start.elapsed().as_secs_f64(),
        "SPORES chain completed"
    );
    Ok(SporesOutcome {
        spores: collector.finish(),
        termination: Termination::Completed,
        final_scores: scores,
    })
}
