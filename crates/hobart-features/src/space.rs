//! Parameter search spaces.
//!
//! A provider describes the values each of its parameters may take so that an
//! external tuner can sample configurations. The space is descriptive only:
//! nothing in this crate searches it.

use crate::spec::ProviderSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Admissible values of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamRange {
    /// Integer in `[low, high]`
    Int {
        /// Lower bound (inclusive)
        low: i64,
        /// Upper bound (inclusive)
        high: i64,
    },
    /// Real number in `[low, high]`
    Float {
        /// Lower bound (inclusive)
        low: f64,
        /// Upper bound (inclusive)
        high: f64,
    },
    /// A single allowed value
    Fixed(Value),
}

impl ParamRange {
    /// Whether `value` lies in the range.
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Self::Int { low, high } => value
                .as_i64()
                .is_some_and(|v| (*low..=*high).contains(&v)),
            Self::Float { low, high } => value
                .as_f64()
                .is_some_and(|v| (*low..=*high).contains(&v)),
            Self::Fixed(fixed) => fixed == value,
        }
    }
}

/// Ordered map of parameter name to its admissible values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSpace(BTreeMap<String, ParamRange>);

impl ParamSpace {
    /// Empty space (a provider without parameters).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn with(mut self, name: impl Into<String>, range: ParamRange) -> Self {
        self.0.insert(name.into(), range);
        self
    }

    /// Range of a parameter.
    pub fn get(&self, name: &str) -> Option<&ParamRange> {
        self.0.get(name)
    }

    /// Parameter names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the space has no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every parameter of `spec` is declared and within range.
    pub fn contains(&self, spec: &ProviderSpec) -> bool {
        let params = match spec.params() {
            Value::Object(map) => map,
            _ => return false,
        };
        params.len() == self.0.len()
            && params
                .iter()
                .all(|(name, value)| self.0.get(name).is_some_and(|r| r.contains(value)))
    }
}
