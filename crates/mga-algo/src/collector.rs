//! Spore records and their ordered collection.

use crate::scoring::{Deployment, TrackedComponents, Weights};
use mga_core::{ComponentId, MgaError, MgaResult, NetworkAdapter};
use serde::Serialize;

/// Snapshot of one successful SPORES iteration. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SporeRecord {
    iteration: usize,
    objective_value: f64,
    cost_ceiling: f64,
    values: Deployment,
    weights: Weights,
}

impl SporeRecord {
    pub fn new(
        iteration: usize,
        objective_value: f64,
        cost_ceiling: f64,
        values: Deployment,
        weights: Weights,
    ) -> Self {
        Self {
            iteration,
            objective_value,
            cost_ceiling,
            values,
            weights,
        }
    }

    /// 1-based position in the chain.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Total system cost of this alternative.
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    /// Cost ceiling the alternative was solved under.
    pub fn cost_ceiling(&self) -> f64 {
        self.cost_ceiling
    }

    pub fn values(&self) -> &Deployment {
        &self.values
    }

    pub fn value(&self, component: &ComponentId) -> Option<f64> {
        self.values.get(component).copied()
    }

    /// Weights the objective was built from.
    pub fn weights(&self) -> &Weights {
        &self.weights
    }
}

/// Spore records in iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SporeCollection {
    records: Vec<SporeRecord>,
}

impl SporeCollection {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[SporeRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SporeRecord> {
        self.records.iter()
    }

    /// Record of a given (1-based) iteration.
    pub fn get(&self, iteration: usize) -> Option<&SporeRecord> {
        self.records.iter().find(|r| r.iteration == iteration)
    }
}

impl IntoIterator for SporeCollection {
    type Item = SporeRecord;
    type IntoIter = std::vec::IntoIter<SporeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a SporeCollection {
    type Item = &'a SporeRecord;
    type IntoIter = std::slice::Iter<'a, SporeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Builds records out of a solved network and keeps them in order.
#[derive(Debug, Default)]
pub struct ResultCollector {
    records: Vec<SporeRecord>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the tracked decision values out of the network.
    ///
    /// A missing or non-finite value breaks the adapter contract.
    pub fn extract_values<N: NetworkAdapter + ?Sized>(
        network: &N,
        tracked: &TrackedComponents,
    ) -> MgaResult<Deployment> {
        tracked
            .components()
            .into_iter()
            .map(|id| match network.decision_value(id) {
                Some(value) if value.is_finite() => Ok((id.clone(), value)),
                Some(value) => Err(MgaError::AdapterContract(format!(
                    "component '{id}' has non-finite value {value}"
                ))),
                None => Err(MgaError::AdapterContract(format!(
                    "no decision value for tracked component '{id}'"
                ))),
            })
            .collect()
    }

    /// Snapshot the network's current solution as the next record.
    pub fn record<N: NetworkAdapter + ?Sized>(
        &mut self,
        iteration: usize,
        network: &N,
        tracked: &TrackedComponents,
        weights: Weights,
        cost_ceiling: f64,
    ) -> MgaResult<&SporeRecord> {
        debug_assert_eq!(iteration, self.records.len() + 1);
        let objective_value = network.current_objective_value();
        if !objective_value.is_finite() {
            return Err(MgaError::AdapterContract(format!(
                "objective value {objective_value} after spore {iteration} is not finite"
            )));
        }
        let values = Self::extract_values(network, tracked)?;
        self.records.push(SporeRecord::new(
            iteration,
            objective_value,
            cost_ceiling,
            values,
            weights,
        ));
        Ok(&self.records[self.records.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self) -> SporeCollection {
        SporeCollection {
            records: self.records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeNetwork;

    fn tracked(network: &FakeNetwork) -> TrackedComponents {
        let categories = ["wind".to_string(), "gas".to_string()].into_iter().collect();
        TrackedComponents::collect(network, &categories).unwrap()
    }

    #[test]
    fn records_are_appended_in_order() {
        let network = FakeNetwork::new(1000.0)
            .with_component("wind", "wind", 50.0)
            .with_component("gas", "gas", 0.0);
        let tracked = tracked(&network);
        let mut collector = ResultCollector::new();

        collector
            .record(1, &network, &tracked, tracked.zeros(), 1100.0)
            .unwrap();
        let second = collector
            .record(2, &network, &tracked, tracked.zeros(), 1100.0)
            .unwrap();
        assert_eq!(second.iteration(), 2);
        assert_eq!(second.value(&ComponentId::from("wind")), Some(50.0));

        let spores = collector.finish();
        assert_eq!(spores.len(), 2);
        let iterations: Vec<_> = spores.iter().map(SporeRecord::iteration).collect();
        assert_eq!(iterations, vec![1, 2]);
        assert_eq!(spores.get(1).unwrap().objective_value(), 1000.0);
        assert!(spores.get(3).is_none());
    }

    #[test]
    fn missing_value_is_contract_violation() {
        let network = FakeNetwork::new(1000.0)
            .with_component("wind", "wind", 50.0)
            .with_component("gas", "gas", 0.0)
            .without_value("gas");
        let tracked = tracked(&network);
        let err = ResultCollector::extract_values(&network, &tracked).unwrap_err();
        assert!(matches!(err, MgaError::AdapterContract(_)));
        assert!(err.to_string().contains("gas"));
    }

    #[test]
    fn non_finite_objective_is_contract_violation() {
        let network = FakeNetwork::new(f64::NAN).with_component("wind", "wind", 1.0);
        let categories = ["wind".to_string()].into_iter().collect();
        let tracked = TrackedComponents::collect(&network, &categories).unwrap();
        let mut collector = ResultCollector::new();
        let err = collector
            .record(1, &network, &tracked, tracked.zeros(), 1.0)
            .unwrap_err();
        assert!(matches!(err, MgaError::AdapterContract(_)));
        assert!(collector.is_empty());
    }
}
