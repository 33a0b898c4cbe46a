//! SPORES on the reference linear capacity-expansion model
#![cfg(feature = "solver-clarabel")]

use mga_algo::{
    run_chains, run_spores, CapacityNetwork, ChainJob, Generator, Line, LpNetwork, ScoringMethod,
    SporesConfig, Termination,
};
use mga_core::{
    ComponentId, CostCeiling, LinearObjective, NetworkAdapter, OptionMap, SolveFailure,
    SolverOptions,
};

const TOL: f64 = 1e-4;

fn id(name: &str) -> ComponentId {
    ComponentId::from(name)
}

/// One bus, demand of 10 in both snapshots. Wind is cheaper per unit of
/// capacity but only half available in the second snapshot.
///
/// Least cost: 20 units of wind at 8 = 160. Gas alone costs 200.
fn single_bus() -> CapacityNetwork {
    let mut network = CapacityNetwork::new(2);
    network.add_bus("bus1");
    network
        .add_generator(Generator::new("gas", "bus1", "gas").with_costs(20.0, 0.0))
        .add_generator(
            Generator::new("wind", "bus1", "wind")
                .with_costs(8.0, 0.0)
                .with_availability(vec![1.0, 0.5]),
        )
        .add_load("demand", "bus1", vec![10.0, 10.0]);
    network
}

fn optimised(network: CapacityNetwork) -> LpNetwork {
    let mut lp = LpNetwork::new(network).unwrap();
    lp.optimize("clarabel").unwrap();
    lp
}

#[test]
fn least_cost_solve_prefers_wind() {
    let lp = optimised(single_bus());

    assert!((lp.current_objective_value() - 160.0).abs() < 1e-3);
    assert!((lp.decision_value(&id("wind")).unwrap() - 20.0).abs() < 1e-3);
    assert!(lp.decision_value(&id("gas")).unwrap().abs() < 1e-3);
}

#[test]
fn transmission_capacity_is_a_decision_value() {
    let mut network = CapacityNetwork::new(1);
    network.add_bus("north").add_bus("south");
    network
        .add_generator(Generator::new("hydro", "north", "hydro").with_costs(10.0, 0.0))
        .add_line(Line::new("link", "north", "south").with_capital_cost(1.0))
        .add_load("city", "south", vec![5.0]);

    let lp = optimised(network);

    assert!((lp.current_objective_value() - 55.0).abs() < 1e-3);
    assert!((lp.decision_value(&id("link")).unwrap() - 5.0).abs() < 1e-3);
    assert_eq!(
        lp.components_by_category("transmission"),
        [id("link")].into_iter().collect()
    );
}

#[test]
fn spores_stay_within_the_cost_ceiling() {
    let mut lp = optimised(single_bus());
    let mut config = SporesConfig::new(0.25, 3, ScoringMethod::Deterministic, ["wind", "gas"]);
    config.scoring.use_threshold = 1e-3;

    let outcome = run_spores(&mut lp, &config, &SolverOptions::new()).unwrap();

    assert_eq!(outcome.termination, Termination::Completed);
    assert_eq!(outcome.spores.len(), 3);
    for spore in &outcome.spores {
        assert!((spore.cost_ceiling() - 200.0).abs() < 1e-3);
        assert!(spore.objective_value() <= 200.0 + TOL * 200.0);
        for value in spore.values().values() {
            assert!(*value >= -TOL);
        }
    }
}

#[test]
fn unbuilt_capacity_does_not_count_as_used() {
    let mut lp = optimised(single_bus());
    // Ceiling of 208 leaves room for the gas-only build (200).
    let config = SporesConfig::new(0.3, 3, ScoringMethod::Deterministic, ["wind", "gas"]);

    let outcome = run_spores(&mut lp, &config, &SolverOptions::new()).unwrap();
    assert_eq!(outcome.spores.len(), 3);

    // Penalising what spore 1 built leaves one technology unbuilt in spore 2.
    let second = outcome.spores.get(2).unwrap();
    assert!(second.values().values().any(|v| *v == 0.0));

    let records = outcome.spores.records();
    for pair in records.windows(2) {
        for (component, value) in pair[0].values() {
            if *value == 0.0 {
                assert_eq!(pair[1].weights()[component], pair[0].weights()[component]);
            }
        }
    }
    let last = &records[records.len() - 1];
    for (component, value) in last.values() {
        if *value == 0.0 {
            assert_eq!(
                outcome.final_scores.weight(component),
                last.weights()[component]
            );
        }
    }
}

#[test]
fn ceiling_below_least_cost_is_infeasible() {
    let mut lp = optimised(single_bus());
    let objective: LinearObjective = [(id("wind"), 1.0), (id("gas"), 1.0)].into_iter().collect();
    let ceiling = CostCeiling::from_reference(100.0, 0.0);

    let err = lp
        .resolve(&[ceiling], &objective, "clarabel", &OptionMap::new())
        .unwrap_err();

    assert!(matches!(err, SolveFailure::Infeasible(_) | SolveFailure::Solver(_)));
    assert!(!lp.is_solved());
}

#[test]
fn unknown_category_has_no_components() {
    let lp = LpNetwork::new(single_bus()).unwrap();
    assert!(lp.components_by_category("nuclear").is_empty());
    assert_eq!(lp.capacity_limit(&id("wind")), None);
}

#[test]
fn chains_run_on_independent_copies() {
    let base = optimised(single_bus());
    let deterministic = SporesConfig::new(0.25, 2, ScoringMethod::Deterministic, ["wind", "gas"]);
    let relative = SporesConfig::new(0.1, 2, ScoringMethod::RelativeDeployment, ["wind"]);
    let jobs = vec![
        ChainJob::new("deterministic", base.clone(), deterministic),
        ChainJob::new("relative", base.clone(), relative),
    ];

    let reports = run_chains(jobs, 2).unwrap();

    assert_eq!(reports.len(), 2);
    for report in &reports {
        let outcome = report.result.as_ref().unwrap();
        assert_eq!(outcome.spores.len(), 2);
        assert!(report.network.is_solved());
    }
    assert!((base.current_objective_value() - 160.0).abs() < 1e-3);
}
