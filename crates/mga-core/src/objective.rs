//! Objective and constraint values exchanged with a network adapter.

use crate::ComponentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name under which the cost ceiling is added to the model.
pub const BUDGET_CONSTRAINT_NAME: &str = "budget-constraint";

/// Linear objective over component decision variables.
///
/// Always minimised. A maximisation sense is expressed by negated
/// coefficients, so adapters only need a single code path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearObjective {
    coefficients: BTreeMap<ComponentId, f64>,
}

impl LinearObjective {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) the coefficient of one component.
    pub fn set(&mut self, component: ComponentId, coefficient: f64) {
        self.coefficients.insert(component, coefficient);
    }

    /// Coefficient of a component; components not listed contribute zero.
    pub fn coefficient(&self, component: &ComponentId) -> f64 {
        self.coefficients.get(component).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, component: &ComponentId) -> bool {
        self.coefficients.contains_key(component)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentId, f64)> {
        self.coefficients.iter().map(|(id, c)| (id, *c))
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Value of the objective at the given decision values (missing = 0).
    pub fn evaluate(&self, values: &BTreeMap<ComponentId, f64>) -> f64 {
        self.coefficients
            .iter()
            .map(|(id, c)| c * values.get(id).copied().unwrap_or(0.0))
            .sum()
    }
}

impl FromIterator<(ComponentId, f64)> for LinearObjective {
    fn from_iter<I: IntoIterator<Item = (ComponentId, f64)>>(iter: I) -> Self {
        Self {
            coefficients: iter.into_iter().collect(),
        }
    }
}

/// `total system cost <= limit`, stated against the model's original cost
/// expression rather than the objective being minimised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCeiling {
    pub name: String,
    pub limit: f64,
}

impl CostCeiling {
    /// Ceiling at `reference_cost * (1 + slack)`.
    pub fn from_reference(reference_cost: f64, slack: f64) -> Self {
        Self {
            name: BUDGET_CONSTRAINT_NAME.to_string(),
            limit: (1.0 + slack) * reference_cost,
        }
    }

    pub fn is_satisfied_by(&self, cost: f64, tolerance: f64) -> bool {
        cost <= self.limit + tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceiling_scales_reference_cost() {
        let ceiling = CostCeiling::from_reference(1000.0, 0.1);
        assert_eq!(ceiling.name, BUDGET_CONSTRAINT_NAME);
        assert!((ceiling.limit - 1100.0).abs() < 1e-9);
        assert!(ceiling.is_satisfied_by(1100.0, 0.0));
        assert!(!ceiling.is_satisfied_by(1100.5, 1e-6));
    }

    #[test]
    fn objective_evaluates_with_missing_values_as_zero() {
        let objective: LinearObjective = [
            (ComponentId::from("wind"), 2.0),
            (ComponentId::from("gas"), 0.5),
        ]
        .into_iter()
        .collect();

        let mut values = BTreeMap::new();
        values.insert(ComponentId::from("wind"), 10.0);

        assert_eq!(objective.len(), 2);
        assert_eq!(objective.evaluate(&values), 20.0);
        assert_eq!(objective.coefficient(&ComponentId::from("solar")), 0.0);
        assert!(!objective.contains(&ComponentId::from("solar")));
    }
}
