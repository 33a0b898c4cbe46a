//! Scripted network adapter for exercising the SPORES loop without a solver.

use mga_core::{
    ComponentId, CostCeiling, LinearObjective, NetworkAdapter, OptionMap, SolveFailure,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Solution a [`FakeNetwork`] adopts after a successful resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeSolution {
    pub cost: f64,
    pub values: BTreeMap<ComponentId, f64>,
}

impl FakeSolution {
    pub fn new(cost: f64) -> Self {
        Self {
            cost,
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, component: &str, value: f64) -> Self {
        self.values.insert(ComponentId::from(component), value);
        self
    }
}

/// Arguments of one `resolve` call, as received.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveCall {
    pub constraints: Vec<CostCeiling>,
    pub objective: LinearObjective,
    pub solver_name: String,
    pub solver_options: OptionMap,
}

type Responder = Box<dyn FnMut(&ResolveCall) -> Result<FakeSolution, SolveFailure> + Send>;

#[derive(Debug, Clone)]
struct FakeComponent {
    category: String,
    limit: Option<f64>,
}

/// In-memory adapter: components with categories, a current solution, and
/// either a queue of scripted outcomes or a responder closure.
pub struct FakeNetwork {
    components: BTreeMap<ComponentId, FakeComponent>,
    values: BTreeMap<ComponentId, f64>,
    cost: f64,
    script: VecDeque<Result<FakeSolution, SolveFailure>>,
    responder: Option<Responder>,
    calls: Vec<ResolveCall>,
}

impl FakeNetwork {
    /// Network whose current (reference) solution costs `cost`.
    pub fn new(cost: f64) -> Self {
        Self {
            components: BTreeMap::new(),
            values: BTreeMap::new(),
            cost,
            script: VecDeque::new(),
            responder: None,
            calls: Vec::new(),
        }
    }

    pub fn with_component(mut self, id: &str, category: &str, value: f64) -> Self {
        self.insert(id, category, value, None);
        self
    }

    pub fn with_limited_component(
        mut self,
        id: &str,
        category: &str,
        value: f64,
        limit: f64,
    ) -> Self {
        self.insert(id, category, value, Some(limit));
        self
    }

    /// Drop the current value of a component (to provoke contract violations).
    pub fn without_value(mut self, id: &str) -> Self {
        self.values.remove(&ComponentId::from(id));
        self
    }

    /// Outcomes returned by successive resolves; an exhausted script fails.
    pub fn with_script(mut self, script: Vec<Result<FakeSolution, SolveFailure>>) -> Self {
        self.script = script.into();
        self
    }

    /// Compute each resolve outcome from the call. Takes precedence over a script.
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: FnMut(&ResolveCall) -> Result<FakeSolution, SolveFailure> + Send + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    pub fn calls(&self) -> &[ResolveCall] {
        &self.calls
    }

    fn insert(&mut self, id: &str, category: &str, value: f64, limit: Option<f64>) {
        let id = ComponentId::from(id);
        self.components.insert(
            id.clone(),
            FakeComponent {
                category: category.to_string(),
                limit,
            },
        );
        self.values.insert(id, value);
    }
}

impl NetworkAdapter for FakeNetwork {
    fn current_objective_value(&self) -> f64 {
        self.cost
    }

    fn decision_value(&self, component: &ComponentId) -> Option<f64> {
        self.values.get(component).copied()
    }

    fn components_by_category(&self, category: &str) -> BTreeSet<ComponentId> {
        self.components
            .iter()
            .filter(|(_, c)| c.category == category)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn capacity_limit(&self, component: &ComponentId) -> Option<f64> {
        self.components.get(component).and_then(|c| c.limit)
    }

    fn resolve(
        &mut self,
        constraints: &[CostCeiling],
        objective: &LinearObjective,
        solver_name: &str,
        solver_options: &OptionMap,
    ) -> Result<(), SolveFailure> {
        let call = ResolveCall {
            constraints: constraints.to_vec(),
            objective: objective.clone(),
            solver_name: solver_name.to_string(),
            solver_options: solver_options.clone(),
        };
        let outcome = match self.responder.as_mut() {
            Some(responder) => responder(&call),
            None => self
                .script
                .pop_front()
                .unwrap_or_else(|| Err(SolveFailure::Solver("fake script exhausted".into()))),
        };
        self.calls.push(call);
        let solution = outcome?;
        self.cost = solution.cost;
        self.values = solution.values;
        Ok(())
    }
}
