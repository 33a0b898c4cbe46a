//! Solver option values.
//!
//! The SPORES loop never interprets these; they are carried from the
//! configuration document to the adapter's `resolve` call untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One scalar solver option as it appears in a configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{v}"),
            OptionValue::Int(v) => write!(f, "{v}"),
            OptionValue::Float(v) => write!(f, "{v}"),
            OptionValue::Text(v) => f.write_str(v),
        }
    }
}

/// Options for a single solver, keyed by option name.
pub type OptionMap = BTreeMap<String, OptionValue>;

/// Options for every solver, keyed by solver name (e.g. `{"highs": {...}}`).
pub type SolverOptions = BTreeMap<String, OptionMap>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_values_deserialize_untagged() {
        let options: SolverOptions = serde_json::from_str(
            r#"{"highs": {"threads": 4, "mip_rel_gap": 0.01, "presolve": "on", "log": false}}"#,
        )
        .unwrap();
        let highs = &options["highs"];
        assert_eq!(highs["threads"], OptionValue::Int(4));
        assert_eq!(highs["mip_rel_gap"], OptionValue::Float(0.01));
        assert_eq!(highs["presolve"], OptionValue::Text("on".into()));
        assert_eq!(highs["log"], OptionValue::Bool(false));
        assert_eq!(highs["presolve"].to_string(), "on");
    }
}
