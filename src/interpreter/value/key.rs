use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::core::{Value, format_number},
    },
};

/// A map key.
///
/// Keys are restricted to the hashable scalars: numbers, strings, and
/// booleans. Composite values, callables, and `nil` cannot be used as keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MapKey {
    /// A numeric key such as `2` or `0.5`.
    Number(OrderedFloat<f64>),
    /// A string key such as `"name"`.
    Str(String),
    /// A boolean key.
    Bool(bool),
}

impl MapKey {
    /// Converts a runtime value into a map key.
    ///
    /// # Parameters
    /// - `value`: The value used in key position.
    /// - `line`: Source code line number for error reporting.
    ///
    /// # Returns
    /// - `Ok(MapKey)`: For numbers, strings, and booleans.
    /// - `Err(RuntimeError::InvalidKey)`: For any other value.
    pub fn from_value(value: &Value, line: usize) -> EvalResult<Self> {
        match value {
            Value::Number(n) => Ok(Self::Number(OrderedFloat(*n))),
            Value::Str(s) => Ok(Self::Str(s.clone())),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            other => Err(RuntimeError::InvalidKey {
                details: format!("{} cannot be used as a map key", other.type_name()),
                line,
            }),
        }
    }

    /// Converts the key back into a runtime value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::Number(n.into_inner()),
            Self::Str(s) => Value::Str(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
        }
    }
}

impl Ord for MapKey {
    /// Orders keys for deterministic rendering: booleans, then numbers,
    /// then strings. Map iteration order itself is unspecified.
    fn cmp(&self, other: &Self) -> Ordering {
        use MapKey::{Bool, Number, Str};

        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Bool(_), _) => Ordering::Less,
            (_, Bool(_)) => Ordering::Greater,
            (Number(a), Number(b)) => a.cmp(b),
            (Number(_), _) => Ordering::Less,
            (_, Number(_)) => Ordering::Greater,
            (Str(a), Str(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for MapKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for MapKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", format_number(n.into_inner())),
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}
