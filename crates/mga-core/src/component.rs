use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a component whose decision variable can be scored
/// (generator, storage unit, line, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        ComponentId(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(name: &str) -> Self {
        ComponentId::new(name)
    }
}

impl From<String> for ComponentId {
    fn from(name: String) -> Self {
        ComponentId(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_id_orders_by_name() {
        let mut ids = vec![ComponentId::from("wind_bus2"), ComponentId::from("gas")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "gas");
        assert_eq!(ids[1].to_string(), "wind_bus2");
    }

    #[test]
    fn component_id_serializes_transparently() {
        let json = serde_json::to_string(&ComponentId::from("OCGT")).unwrap();
        assert_eq!(json, "\"OCGT\"");
    }
}
