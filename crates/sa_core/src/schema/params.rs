//! Parameter schema: named scalar parameters with defaults and
//! validation predicates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Fault;

/// A scalar parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Real(f64),
    Enum(String),
}

impl ParamValue {
    pub fn as_real(&self) -> Option<f64> {
        match self {
            ParamValue::Real(v) => Some(*v),
            ParamValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            ParamValue::Enum(v) => Some(v),
            _ => None,
        }
    }
}

/// Kind tag for a parameter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    Real,
    Enum,
    Bool,
}

/// Declaration of one parameter.
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: ParamValue,
    /// Validation predicate; `None` accepts any value of the kind.
    pub validate: Option<fn(&ParamValue) -> bool>,
    /// Locale-bundle key describing the constraint, used in faults.
    pub message_key: &'static str,
}

impl ParamSpec {
    fn kind_matches(&self, value: &ParamValue) -> bool {
        matches!(
            (self.kind, value),
            (ParamKind::Integer, ParamValue::Integer(_))
                | (ParamKind::Real, ParamValue::Real(_))
                | (ParamKind::Real, ParamValue::Integer(_))
                | (ParamKind::Enum, ParamValue::Enum(_))
                | (ParamKind::Bool, ParamValue::Bool(_))
        )
    }
}

/// Ordered parameter declarations for one procedure.
pub struct ParamSchema {
    pub specs: Vec<ParamSpec>,
}

/// Validated parameter values, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ParamValues {
    values: BTreeMap<String, ParamValue>,
}

impl ParamValues {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn real(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(|v| v.as_real())
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(|v| v.as_integer())
    }
}

impl ParamSchema {
    pub fn empty() -> Self {
        ParamSchema { specs: Vec::new() }
    }

    pub fn new(specs: Vec<ParamSpec>) -> Self {
        ParamSchema { specs }
    }

    /// Merges user-supplied values over defaults, validating each.
    /// Unknown parameter names and predicate failures are
    /// `parameter-invalid` faults; first fault wins.
    pub fn resolve(
        &self,
        supplied: &BTreeMap<String, ParamValue>,
    ) -> Result<ParamValues, Fault> {
        for name in supplied.keys() {
            if !self.specs.iter().any(|s| s.name == name) {
                return Err(Fault::ParameterInvalid(name.clone()));
            }
        }
        let mut values = BTreeMap::new();
        for spec in &self.specs {
            let value = supplied.get(spec.name).cloned().unwrap_or_else(|| spec.default.clone());
            if !spec.kind_matches(&value) {
                return Err(Fault::ParameterInvalid(spec.name.to_string()));
            }
            if let Some(predicate) = spec.validate {
                if !predicate(&value) {
                    return Err(Fault::ParameterInvalid(spec.name.to_string()));
                }
            }
            values.insert(spec.name.to_string(), value);
        }
        Ok(ParamValues { values })
    }
}

/// The ubiquitous significance-level parameter, `0 < α < 1`.
pub fn alpha_spec() -> ParamSpec {
    ParamSpec {
        name: "alpha",
        kind: ParamKind::Real,
        default: ParamValue::Real(0.05),
        validate: Some(|v| v.as_real().map(|a| a > 0.0 && a < 1.0).unwrap_or(false)),
        message_key: "param-alpha",
    }
}
