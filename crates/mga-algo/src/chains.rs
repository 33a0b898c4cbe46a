//! Independent SPORES chains run side by side.
//!
//! Each chain owns its network copy and its score state, so chains never
//! share a model; a single chain is still strictly sequential.

use crate::config::SporesConfig;
use crate::driver::{run_spores, SporesOutcome};
use mga_core::{MgaError, MgaResult, NetworkAdapter, SolverOptions};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{info, warn};

/// One chain to run: a dedicated network plus its configuration.
pub struct ChainJob<N> {
    pub label: String,
    pub network: N,
    pub config: SporesConfig,
    pub solver_options: SolverOptions,
}

impl<N> ChainJob<N> {
    pub fn new(label: impl Into<String>, network: N, config: SporesConfig) -> Self {
        Self {
            label: label.into(),
            network,
            config,
            solver_options: SolverOptions::new(),
        }
    }

    pub fn with_solver_options(mut self, solver_options: SolverOptions) -> Self {
        self.solver_options = solver_options;
        self
    }
}

/// Outcome of one chain, with the network handed back in its final state.
pub struct ChainReport<N> {
    pub label: String,
    pub network: N,
    pub result: MgaResult<SporesOutcome>,
}

/// Run every job on a rayon pool; reports come back in job order.
///
/// `threads == 0` uses one thread per CPU. An error in one chain is kept in
/// its report and does not stop the others.
pub fn run_chains<N>(jobs: Vec<ChainJob<N>>, threads: usize) -> MgaResult<Vec<ChainReport<N>>>
where
    N: NetworkAdapter + Send,
{
    let thread_count = if threads == 0 {
        num_cpus::get()
    } else {
        threads
    };
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .map_err(|e| MgaError::Configuration(format!("building thread pool for chains: {e}")))?;

    info!(chains = jobs.len(), threads = thread_count, "running SPORES chains");
    let reports: Vec<ChainReport<N>> = pool.install(|| {
        jobs.into_par_iter()
            .map(|mut job| {
                let result = run_spores(&mut job.network, &job.config, &job.solver_options);
                match &result {
                    Ok(outcome) => info!(
                        chain = %job.label,
                        spores = outcome.spores.len(),
                        complete = outcome.is_complete(),
                        "chain finished"
                    ),
                    Err(err) => warn!(chain = %job.label, %err, "chain failed"),
                }
                ChainReport {
                    label: job.label,
                    network: job.network,
                    result,
                }
            })
            .collect()
    });
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringMethod;
    use crate::test_utils::{FakeNetwork, FakeSolution};

    fn network() -> FakeNetwork {
        FakeNetwork::new(100.0)
            .with_component("wind", "wind", 10.0)
            .with_component("gas", "gas", 0.0)
            .with_responder(|call| {
                let wind = call.objective.iter().map(|(_, c)| c).sum::<f64>();
                Ok(FakeSolution::new(105.0)
                    .with_value("wind", 10.0 + wind)
                    .with_value("gas", 1.0))
            })
    }

    #[test]
    fn reports_keep_job_order_and_isolate_errors() {
        let good = SporesConfig::new(0.1, 3, ScoringMethod::Deterministic, ["wind", "gas"]);
        let bad = SporesConfig::new(0.1, 3, ScoringMethod::Deterministic, ["nuclear"]);
        let jobs = vec![
            ChainJob::new("a", network(), good.clone()),
            ChainJob::new("b", network(), bad),
            ChainJob::new("c", network(), good),
        ];

        let reports = run_chains(jobs, 2).unwrap();
        let labels: Vec<_> = reports.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
        assert!(matches!(reports[1].result, Err(MgaError::Configuration(_))));
        assert!(reports[1].network.calls().is_empty());

        let a = reports[0].result.as_ref().unwrap();
        let c = reports[2].result.as_ref().unwrap();
        assert_eq!(a.spores.len(), 3);
        assert_eq!(a, c);
        assert_eq!(reports[0].network.calls().len(), 3);
    }
}
