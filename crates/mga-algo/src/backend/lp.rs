//! Linear capacity-expansion model on good_lp.
//!
//! ```text
//! minimise   Σ_g cap_g · p_nom_g + Σ_l cap_l · s_nom_l + Σ_t w_t Σ_g mc_g · p_g,t
//!
//! subject to
//!   Σ_{g at b} p_g,t + Σ_{l into b} f_l,t − Σ_{l out of b} f_l,t = d_b,t
//!   0 ≤ p_g,t ≤ p_max_pu_g,t · p_nom_g
//!   −s_nom_l ≤ f_l,t ≤ s_nom_l
//!   p_nom_min ≤ p_nom ≤ p_nom_max,   s_nom_min ≤ s_nom ≤ s_nom_max
//! ```
//!
//! A SPORES resolve swaps the objective for a weighted sum of the capacity
//! variables and adds `total cost ≤ ceiling` for every ceiling supplied.

use super::model::{CapacityNetwork, ModelError};
use good_lp::{
    constraint, variable, variables, Constraint, Expression, ProblemVariables, ResolutionError,
    Solution, SolverModel, Variable,
};
use mga_core::{
    ComponentId, CostCeiling, LinearObjective, NetworkAdapter, OptionMap, SolveFailure,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};
use web_time::Instant;

#[cfg(feature = "solver-clarabel")]
use good_lp::solvers::clarabel::clarabel;
#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs;

/// Capacities closer to zero than this are reported as exactly zero.
pub const ZERO_TOLERANCE: f64 = 1e-6;

/// Optimal capacities and cost of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    pub total_cost: f64,
    pub capacities: BTreeMap<ComponentId, f64>,
}

/// Variables and constraints of the model, before an objective is chosen.
struct Formulation {
    vars: ProblemVariables,
    constraints: Vec<Constraint>,
    cost: Expression,
    cost_terms: Vec<(Variable, f64)>,
    capacity: BTreeMap<ComponentId, Variable>,
}

impl Formulation {
    fn build(network: &CapacityNetwork) -> Self {
        let mut vars = variables!();
        let mut constraints = Vec::new();
        let mut cost_terms: Vec<(Variable, f64)> = Vec::new();
        let mut capacity = BTreeMap::new();

        let bus_index: HashMap<&str, usize> = network
            .buses
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.as_str(), i))
            .collect();
        let snapshots = network.snapshots();
        let mut balance: Vec<Vec<Expression>> =
            vec![vec![Expression::from(0.0); snapshots]; network.buses.len()];

        for gen in &network.generators {
            let p_nom = vars.add(bounded(gen.p_nom_min, gen.p_nom_max));
            capacity.insert(ComponentId::from(gen.name.as_str()), p_nom);
            cost_terms.push((p_nom, gen.capital_cost));

            let bus = bus_index[gen.bus.as_str()];
            for t in 0..snapshots {
                let p = vars.add(variable().min(0.0));
                let available = gen.availability(t) * p_nom;
                constraints.push(constraint!(p <= available));
                balance[bus][t] += p;
                let weighted = network.snapshot_weightings[t] * gen.marginal_cost;
                if weighted != 0.0 {
                    cost_terms.push((p, weighted));
                }
            }
        }

        for line in &network.lines {
            let s_nom = vars.add(bounded(line.s_nom_min, line.s_nom_max));
            capacity.insert(ComponentId::from(line.name.as_str()), s_nom);
            cost_terms.push((s_nom, line.capital_cost));

            let from = bus_index[line.bus0.as_str()];
            let to = bus_index[line.bus1.as_str()];
            for t in 0..snapshots {
                let flow = vars.add(variable());
                constraints.push(constraint!(flow <= s_nom));
                constraints.push(constraint!(flow + s_nom >= 0.0));
                balance[from][t] -= flow;
                balance[to][t] += flow;
            }
        }

        let mut demand = vec![vec![0.0; snapshots]; network.buses.len()];
        for load in &network.loads {
            let bus = bus_index[load.bus.as_str()];
            for (t, p) in load.p_set.iter().enumerate() {
                demand[bus][t] += p;
            }
        }
        for (bus_balance, bus_demand) in balance.into_iter().zip(demand) {
            for (injection, d) in bus_balance.into_iter().zip(bus_demand) {
                constraints.push(constraint!(injection == d));
            }
        }

        let cost = cost_terms
            .iter()
            .fold(Expression::from(0.0), |acc, (var, c)| acc + *c * *var);

        Self {
            vars,
            constraints,
            cost,
            cost_terms,
            capacity,
        }
    }

    fn replacement_objective(
        &self,
        objective: &LinearObjective,
    ) -> Result<Expression, SolveFailure> {
        let mut expr = Expression::from(0.0);
        for (id, coefficient) in objective.iter() {
            let var = self.capacity.get(id).ok_or_else(|| {
                SolveFailure::Solver(format!("objective references unknown component '{id}'"))
            })?;
            expr += coefficient * *var;
        }
        Ok(expr)
    }

    fn solve(
        self,
        objective: Expression,
        ceilings: &[CostCeiling],
        solver_name: &str,
    ) -> Result<LpSolution, SolveFailure> {
        let Formulation {
            vars,
            mut constraints,
            cost,
            cost_terms,
            capacity,
        } = self;
        for ceiling in ceilings {
            let limit = ceiling.limit;
            let total = cost.clone();
            constraints.push(constraint!(total <= limit));
        }

        match solver_name {
            #[cfg(feature = "solver-clarabel")]
            "clarabel" => {
                let mut problem = vars.minimise(objective).using(clarabel);
                for c in constraints {
                    problem = problem.with(c);
                }
                let solution = problem.solve().map_err(map_resolution_error)?;
                Ok(extract(&solution, &cost_terms, &capacity))
            }
            #[cfg(feature = "solver-highs")]
            "highs" => {
                let mut problem = vars.minimise(objective).using(highs);
                for c in constraints {
                    problem = problem.with(c);
                }
                let solution = problem.solve().map_err(map_resolution_error)?;
                Ok(extract(&solution, &cost_terms, &capacity))
            }
            other => Err(SolveFailure::Solver(format!(
                "solver '{other}' is not available in this build"
            ))),
        }
    }
}

fn bounded(min: f64, max: f64) -> good_lp::VariableDefinition {
    let def = variable().min(min);
    if max.is_finite() {
        def.max(max)
    } else {
        def
    }
}

fn extract<S: Solution>(
    solution: &S,
    cost_terms: &[(Variable, f64)],
    capacity: &BTreeMap<ComponentId, Variable>,
) -> LpSolution {
    let total_cost = cost_terms
        .iter()
        .map(|(var, c)| c * solution.value(*var))
        .sum();
    let capacities = capacity
        .iter()
        .map(|(id, var)| (id.clone(), snap_to_zero(solution.value(*var))))
        .collect();
    LpSolution {
        total_cost,
        capacities,
    }
}

/// Interior-point solvers leave unbuilt capacities at ~1e-9 rather than 0.
fn snap_to_zero(value: f64) -> f64 {
    if value.abs() < ZERO_TOLERANCE {
        0.0
    } else {
        value
    }
}

fn map_resolution_error(err: ResolutionError) -> SolveFailure {
    match err {
        ResolutionError::Infeasible => {
            SolveFailure::Infeasible("no dispatch satisfies demand within the cost ceiling".into())
        }
        ResolutionError::Unbounded => SolveFailure::Unbounded,
        other => SolveFailure::Solver(other.to_string()),
    }
}

/// [`CapacityNetwork`] behind the [`NetworkAdapter`] contract.
///
/// Clone it to give each parallel chain its own model.
#[derive(Debug, Clone)]
pub struct LpNetwork {
    network: CapacityNetwork,
    solution: Option<LpSolution>,
}

impl LpNetwork {
    pub fn new(network: CapacityNetwork) -> Result<Self, ModelError> {
        network.validate()?;
        Ok(Self {
            network,
            solution: None,
        })
    }

    pub fn network(&self) -> &CapacityNetwork {
        &self.network
    }

    pub fn solution(&self) -> Option<&LpSolution> {
        self.solution.as_ref()
    }

    pub fn is_solved(&self) -> bool {
        self.solution.is_some()
    }

    /// Solve for least total cost and keep the solution as the reference.
    pub fn optimize(&mut self, solver_name: &str) -> Result<f64, SolveFailure> {
        self.solution = None;
        let start = Instant::now();
        let formulation = Formulation::build(&self.network);
        let cost = formulation.cost.clone();
        let solution = formulation.solve(cost, &[], solver_name)?;
        info!(
            total_cost = solution.total_cost,
            solver = solver_name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "least-cost solve finished"
        );
        let total_cost = solution.total_cost;
        self.solution = Some(solution);
        Ok(total_cost)
    }
}

impl NetworkAdapter for LpNetwork {
    fn current_objective_value(&self) -> f64 {
        self.solution
            .as_ref()
            .map(|s| s.total_cost)
            .unwrap_or(f64::NAN)
    }

    fn decision_value(&self, component: &ComponentId) -> Option<f64> {
        self.solution
            .as_ref()
            .and_then(|s| s.capacities.get(component).copied())
    }

    fn components_by_category(&self, category: &str) -> BTreeSet<ComponentId> {
        self.network.components_with_carrier(category)
    }

    fn capacity_limit(&self, component: &ComponentId) -> Option<f64> {
        self.network
            .capacity_max(component)
            .filter(|max| max.is_finite())
    }

    fn resolve(
        &mut self,
        constraints: &[CostCeiling],
        objective: &LinearObjective,
        solver_name: &str,
        solver_options: &OptionMap,
    ) -> Result<(), SolveFailure> {
        for (key, value) in solver_options {
            debug!(solver = solver_name, option = %key, %value, "solver option passed through");
        }
        // Stale values must not survive a failed resolve.
        self.solution = None;
        let start = Instant::now();
        let formulation = Formulation::build(&self.network);
        let expr = formulation.replacement_objective(objective)?;
        let solution = formulation.solve(expr, constraints, solver_name)?;
        debug!(
            total_cost = solution.total_cost,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "SPORES resolve finished"
        );
        self.solution = Some(solution);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::model::Generator;

    fn single_bus() -> CapacityNetwork {
        let mut network = CapacityNetwork::new(2);
        network.add_bus("bus1");
        network
            .add_generator(Generator::new("gas", "bus1", "gas").with_costs(20.0, 0.0))
            .add_load("demand", "bus1", vec![10.0, 10.0]);
        network
    }

    #[test]
    fn unsolved_network_reports_no_values() {
        let lp = LpNetwork::new(single_bus()).unwrap();
        assert!(!lp.is_solved());
        assert!(lp.current_objective_value().is_nan());
        assert_eq!(lp.decision_value(&ComponentId::from("gas")), None);
    }

    #[test]
    fn invalid_network_is_rejected() {
        let mut network = single_bus();
        network.add_load("orphan", "bus7", vec![1.0, 1.0]);
        assert!(LpNetwork::new(network).is_err());
    }

    #[test]
    fn unknown_solver_is_a_solve_failure() {
        let mut lp = LpNetwork::new(single_bus()).unwrap();
        let err = lp.optimize("cplex").unwrap_err();
        assert!(matches!(err, SolveFailure::Solver(_)));
        assert!(!lp.is_solved());
    }

    #[test]
    fn solver_noise_is_reported_as_zero() {
        assert_eq!(snap_to_zero(3.8e-9), 0.0);
        assert_eq!(snap_to_zero(-5.2e-8), 0.0);
        assert_eq!(snap_to_zero(2e-6), 2e-6);
        assert_eq!(snap_to_zero(20.0), 20.0);
    }

    #[cfg(feature = "solver-clarabel")]
    #[test]
    fn failed_resolve_discards_previous_solution() {
        let mut lp = LpNetwork::new(single_bus()).unwrap();
        lp.optimize("clarabel").unwrap();
        assert!(lp.is_solved());

        let objective: LinearObjective =
            [(ComponentId::from("nuclear"), 1.0)].into_iter().collect();
        let err = lp
            .resolve(&[], &objective, "clarabel", &OptionMap::new())
            .unwrap_err();

        assert!(matches!(err, SolveFailure::Solver(_)));
        assert!(!lp.is_solved());
        assert!(lp.current_objective_value().is_nan());
        assert_eq!(lp.decision_value(&ComponentId::from("gas")), None);
    }

    #[test]
    fn objective_with_unknown_component_fails_before_solving() {
        let mut lp = LpNetwork::new(single_bus()).unwrap();
        let objective: LinearObjective =
            [(ComponentId::from("nuclear"), 1.0)].into_iter().collect();
        let err = lp
            .resolve(&[], &objective, "clarabel", &OptionMap::new())
            .unwrap_err();
        assert!(matches!(err, SolveFailure::Solver(_)));
    }
}
