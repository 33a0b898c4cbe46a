//! The contract between the SPORES loop and an energy-system model.
//!
//! The model (and the solver behind it) belongs to the caller. The loop only
//! reads values out of it and asks it to re-solve with a replacement
//! objective plus extra constraints, so any LP/MILP backend that implements
//! [`NetworkAdapter`] can be driven, including a scripted fake in tests.

use crate::{ComponentId, CostCeiling, LinearObjective, OptionMap, SolveFailure};
use std::collections::BTreeSet;

pub trait NetworkAdapter {
    /// Total system cost of the solution currently held by the model.
    fn current_objective_value(&self) -> f64;

    /// Value of a component's decision variable in the current solution.
    ///
    /// `None` means the adapter has no value for the component, which the
    /// loop treats as a contract violation.
    fn decision_value(&self, component: &ComponentId) -> Option<f64>;

    /// Components tagged with `category` (carrier / technology). Unknown
    /// categories yield an empty set.
    fn components_by_category(&self, category: &str) -> BTreeSet<ComponentId>;

    /// Upper bound of a component's decision variable, when it has one.
    fn capacity_limit(&self, _component: &ComponentId) -> Option<f64> {
        None
    }

    /// Re-solve the model with `objective` replacing the cost objective and
    /// `constraints` added on top of the model's own constraints.
    ///
    /// On `Ok` the values returned by [`decision_value`](Self::decision_value)
    /// and [`current_objective_value`](Self::current_objective_value) must
    /// reflect the new solution. On `Err` the caller must not read them.
    fn resolve(
        &mut self,
        constraints: &[CostCeiling],
        objective: &LinearObjective,
        solver_name: &str,
        solver_options: &OptionMap,
    ) -> Result<(), SolveFailure>;
}

impl<N: NetworkAdapter + ?Sized> NetworkAdapter for Box<N> {
    fn current_objective_value(&self) -> f64 {
        (**self).current_objective_value()
    }

    fn decision_value(&self, component: &ComponentId) -> Option<f64> {
        (**self).decision_value(component)
    }

    fn components_by_category(&self, category: &str) -> BTreeSet<ComponentId> {
        (**self).components_by_category(category)
    }

    fn capacity_limit(&self, component: &ComponentId) -> Option<f64> {
        (**self).capacity_limit(component)
    }

    fn resolve(
        &mut self,
        constraints: &[CostCeiling],
        objective: &LinearObjective,
        solver_name: &str,
        solver_options: &OptionMap,
    ) -> Result<(), SolveFailure> {
        (**self).resolve(constraints, objective, solver_name, solver_options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_is_object_safe() {
        fn _accepts_adapter(_n: &mut dyn NetworkAdapter) {}
        fn _accepts_boxed(_n: Box<dyn NetworkAdapter + Send>) {}
    }
}
