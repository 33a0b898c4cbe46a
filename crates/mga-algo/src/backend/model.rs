//! Capacity-expansion network data.

use mga_core::ComponentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

/// Carrier tag given to lines unless set otherwise.
pub const TRANSMISSION_CARRIER: &str = "transmission";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("network has no snapshots")]
    NoSnapshots,
    #[error("network has no buses")]
    NoBuses,
    #[error("duplicate component name '{0}'")]
    DuplicateName(String),
    #[error("{component} references unknown bus '{bus}'")]
    UnknownBus { component: String, bus: String },
    #[error("{component}: {what} has {actual} entries, expected {expected} (one per snapshot)")]
    ProfileLength {
        component: String,
        what: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("{component}: {what}")]
    InvalidValue { component: String, what: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub name: String,
}

/// Extendable generator; its capacity `p_nom` is the scored decision variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generator {
    pub name: String,
    pub bus: String,
    pub carrier: String,
    pub p_nom_min: f64,
    pub p_nom_max: f64,
    /// Cost per unit of built capacity
    pub capital_cost: f64,
    /// Cost per unit of energy dispatched (scaled by snapshot weighting)
    pub marginal_cost: f64,
    /// Availability per snapshot as a fraction of capacity; empty = always 1
    #[serde(default)]
    pub p_max_pu: Vec<f64>,
}

impl Generator {
    pub fn new(
        name: impl Into<String>,
        bus: impl Into<String>,
        carrier: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            bus: bus.into(),
            carrier: carrier.into(),
            p_nom_min: 0.0,
            p_nom_max: f64::INFINITY,
            capital_cost: 0.0,
            marginal_cost: 0.0,
            p_max_pu: Vec::new(),
        }
    }

    pub fn with_capacity_limits(mut self, min: f64, max: f64) -> Self {
        self.p_nom_min = min;
        self.p_nom_max = max;
        self
    }

    pub fn with_costs(mut self, capital_cost: f64, marginal_cost: f64) -> Self {
        self.capital_cost = capital_cost;
        self.marginal_cost = marginal_cost;
        self
    }

    pub fn with_availability(mut self, p_max_pu: Vec<f64>) -> Self {
        self.p_max_pu = p_max_pu;
        self
    }

    pub fn availability(&self, snapshot: usize) -> f64 {
        self.p_max_pu.get(snapshot).copied().unwrap_or(1.0)
    }
}

/// Extendable transport link between two buses; `s_nom` bounds |flow|.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub name: String,
    pub bus0: String,
    pub bus1: String,
    pub carrier: String,
    pub s_nom_min: f64,
    pub s_nom_max: f64,
    pub capital_cost: f64,
}

impl Line {
    pub fn new(name: impl Into<String>, bus0: impl Into<String>, bus1: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bus0: bus0.into(),
            bus1: bus1.into(),
            carrier: TRANSMISSION_CARRIER.to_string(),
            s_nom_min: 0.0,
            s_nom_max: f64::INFINITY,
            capital_cost: 0.0,
        }
    }

    pub fn with_capacity_limits(mut self, min: f64, max: f64) -> Self {
        self.s_nom_min = min;
        self.s_nom_max = max;
        self
    }

    pub fn with_capital_cost(mut self, capital_cost: f64) -> Self {
        self.capital_cost = capital_cost;
        self
    }
}

/// Fixed demand at a bus, one value per snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub name: String,
    pub bus: String,
    pub p_set: Vec<f64>,
}

/// Buses, generators, lines and loads over a set of snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapacityNetwork {
    pub snapshot_weightings: Vec<f64>,
    pub buses: Vec<Bus>,
    pub generators: Vec<Generator>,
    pub lines: Vec<Line>,
    pub loads: Vec<Load>,
}

impl CapacityNetwork {
    /// Empty network with `snapshots` equally weighted snapshots.
    pub fn new(snapshots: usize) -> Self {
        Self {
            snapshot_weightings: vec![1.0; snapshots],
            ..Self::default()
        }
    }

    pub fn snapshots(&self) -> usize {
        self.snapshot_weightings.len()
    }

    pub fn add_bus(&mut self, name: impl Into<String>) -> &mut Self {
        self.buses.push(Bus { name: name.into() });
        self
    }

    pub fn add_generator(&mut self, generator: Generator) -> &mut Self {
        self.generators.push(generator);
        self
    }

    pub fn add_line(&mut self, line: Line) -> &mut Self {
        self.lines.push(line);
        self
    }

    pub fn add_load(
        &mut self,
        name: impl Into<String>,
        bus: impl Into<String>,
        p_set: Vec<f64>,
    ) -> &mut Self {
        self.loads.push(Load {
            name: name.into(),
            bus: bus.into(),
            p_set,
        });
        self
    }

    /// Generators and lines tagged with `carrier`.
    pub fn components_with_carrier(&self, carrier: &str) -> BTreeSet<ComponentId> {
        let generators = self
            .generators
            .iter()
            .filter(|g| g.carrier == carrier)
            .map(|g| ComponentId::from(g.name.as_str()));
        let lines = self
            .lines
            .iter()
            .filter(|l| l.carrier == carrier)
            .map(|l| ComponentId::from(l.name.as_str()));
        generators.chain(lines).collect()
    }

    /// Upper capacity bound of a generator or line.
    pub fn capacity_max(&self, component: &ComponentId) -> Option<f64> {
        let name = component.as_str();
        self.generators
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.p_nom_max)
            .or_else(|| self.lines.iter().find(|l| l.name == name).map(|l| l.s_nom_max))
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let snapshots = self.snapshots();
        if snapshots == 0 {
            return Err(ModelError::NoSnapshots);
        }
        if self.buses.is_empty() {
            return Err(ModelError::NoBuses);
        }
        let buses: HashSet<&str> = self.buses.iter().map(|b| b.name.as_str()).collect();
        if buses.len() != self.buses.len() {
            return Err(ModelError::DuplicateName("bus".into()));
        }
        if let Some(w) = self.snapshot_weightings.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(ModelError::InvalidValue {
                component: "snapshot_weightings".into(),
                what: format!("weighting {w} must be finite and >= 0"),
            });
        }

        let mut names = HashSet::new();
        let check_bus = |component: &str, bus: &str| {
            if buses.contains(bus) {
                Ok(())
            } else {
                Err(ModelError::UnknownBus {
                    component: component.to_string(),
                    bus: bus.to_string(),
                })
            }
        };

        for gen in &self.generators {
            if !names.insert(gen.name.as_str()) {
                return Err(ModelError::DuplicateName(gen.name.clone()));
            }
            check_bus(&gen.name, &gen.bus)?;
            check_bounds(&gen.name, gen.p_nom_min, gen.p_nom_max)?;
            if !gen.p_max_pu.is_empty() && gen.p_max_pu.len() != snapshots {
                return Err(ModelError::ProfileLength {
                    component: gen.name.clone(),
                    what: "p_max_pu",
                    actual: gen.p_max_pu.len(),
                    expected: snapshots,
                });
            }
        }
        for line in &self.lines {
            if !names.insert(line.name.as_str()) {
                return Err(ModelError::DuplicateName(line.name.clone()));
            }
            check_bus(&line.name, &line.bus0)?;
            check_bus(&line.name, &line.bus1)?;
            check_bounds(&line.name, line.s_nom_min, line.s_nom_max)?;
        }
        for load in &self.loads {
            check_bus(&load.name, &load.bus)?;
            if load.p_set.len() != snapshots {
                return Err(ModelError::ProfileLength {
                    component: load.name.clone(),
                    what: "p_set",
                    actual: load.p_set.len(),
                    expected: snapshots,
                });
            }
        }
        Ok(())
    }
}

fn check_bounds(component: &str, min: f64, max: f64) -> Result<(), ModelError> {
    if !min.is_finite() || min < 0.0 || max.is_nan() || max < min {
        return Err(ModelError::InvalidValue {
            component: component.to_string(),
            what: format!("capacity bounds [{min}, {max}] are invalid"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bus() -> CapacityNetwork {
        let mut network = CapacityNetwork::new(2);
        network.add_bus("bus1").add_bus("bus2");
        network
            .add_generator(Generator::new("OCGT", "bus1", "gas").with_capacity_limits(0.0, 1000.0))
            .add_generator(Generator::new("wind_bus2", "bus2", "wind"))
            .add_line(Line::new("line", "bus1", "bus2").with_capacity_limits(0.0, 500.0))
            .add_load("demand", "bus2", vec![10.0, 12.0]);
        network
    }

    #[test]
    fn valid_network_passes() {
        two_bus().validate().unwrap();
    }

    #[test]
    fn carriers_select_generators_and_lines() {
        let network = two_bus();
        let gas = network.components_with_carrier("gas");
        assert!(gas.contains(&ComponentId::from("OCGT")));
        let lines = network.components_with_carrier(TRANSMISSION_CARRIER);
        assert!(lines.contains(&ComponentId::from("line")));
        assert!(network.components_with_carrier("nuclear").is_empty());
        assert_eq!(network.capacity_max(&ComponentId::from("line")), Some(500.0));
        assert_eq!(network.capacity_max(&ComponentId::from("missing")), None);
    }

    #[test]
    fn unknown_bus_and_bad_profiles_are_rejected() {
        let mut network = two_bus();
        network.add_generator(Generator::new("solar", "bus9", "solar"));
        assert!(matches!(network.validate(), Err(ModelError::UnknownBus { .. })));

        let mut network = two_bus();
        network.add_load("short", "bus1", vec![1.0]);
        assert!(matches!(network.validate(), Err(ModelError::ProfileLength { .. })));

        let mut network = two_bus();
        network.add_generator(Generator::new("OCGT", "bus1", "gas"));
        assert_eq!(
            network.validate(),
            Err(ModelError::DuplicateName("OCGT".into()))
        );

        let mut network = two_bus();
        network.add_generator(Generator::new("bad", "bus1", "gas").with_capacity_limits(5.0, 1.0));
        assert!(matches!(network.validate(), Err(ModelError::InvalidValue { .. })));
    }
}
