use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    ast::{FunctionDecl, LiteralValue},
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::{core::EvalResult, function::builtin::BuiltinDef},
        value::key::MapKey,
    },
};

/// Represents a runtime value in the interpreter.
///
/// This enum models all the possible types that can appear in expressions,
/// assignments, function returns, and conditional evaluations. Arrays and
/// maps are shared by reference: binding a composite to a second name or
/// passing it to a function aliases the same storage, and `clone` is the
/// way to get an independent copy.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value, `nil`.
    Nil,
    /// A boolean value (`true` or `false`).
    Bool(bool),
    /// A numeric value (double precision floating-point).
    Number(f64),
    /// A string value.
    Str(String),
    /// An ordered sequence of values.
    Array(Rc<RefCell<Vec<Value>>>),
    /// An unordered mapping from hashable scalar keys to values.
    Map(Rc<RefCell<HashMap<MapKey, Value>>>),
    /// A callable: a built-in or a user-defined function.
    Callable(Callable),
}

/// Any value that can be invoked.
#[derive(Clone)]
pub enum Callable {
    /// A built-in function provided by the host.
    Builtin(&'static BuiltinDef),
    /// A user-defined function together with its captured closure.
    Function(Rc<UserFunction>),
}

/// A user-defined function: its declaration plus the environment captured
/// at the declaration site.
#[derive(Debug)]
pub struct UserFunction {
    /// The parsed name, parameters, and body.
    pub declaration: Rc<FunctionDecl>,
    /// The environment active when the function was declared.
    pub closure:     Rc<Environment>,
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<Self>> for Value {
    fn from(v: Vec<Self>) -> Self {
        Self::Array(Rc::new(RefCell::new(v)))
    }
}

impl From<HashMap<MapKey, Self>> for Value {
    fn from(v: HashMap<MapKey, Self>) -> Self {
        Self::Map(Rc::new(RefCell::new(v)))
    }
}

impl From<&LiteralValue> for Value {
    fn from(lit: &LiteralValue) -> Self {
        match lit {
            LiteralValue::Nil => Self::Nil,
            LiteralValue::Bool(b) => (*b).into(),
            LiteralValue::Number(n) => (*n).into(),
            LiteralValue::Str(s) => s.clone().into(),
        }
    }
}

impl Value {
    /// Reports the truthiness of the value: `nil` and `false` are falsy,
    /// everything else is truthy.
    ///
    /// # Example
    /// ```
    /// use selva::interpreter::value::core::Value;
    ///
    /// assert!(!Value::Nil.is_truthy());
    /// assert!(!Value::Bool(false).is_truthy());
    /// assert!(Value::Number(0.0).is_truthy());
    /// assert!(Value::Str(String::new()).is_truthy());
    /// ```
    #[must_use]
    pub const fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Bool(false))
    }

    /// Converts the value to an `f64`, or returns an error if not numeric.
    ///
    /// # Parameters
    /// - `line`: Source code line number for error reporting.
    ///
    /// # Returns
    /// - `Ok(f64)`: If the value is a number.
    /// - `Err(RuntimeError::ExpectedNumber)`: Otherwise.
    pub const fn as_number(&self, line: usize) -> EvalResult<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            _ => Err(RuntimeError::ExpectedNumber { line }),
        }
    }

    /// Borrows the value as a string slice, or returns an error if it is
    /// not a string.
    ///
    /// # Parameters
    /// - `line`: Source code line number for error reporting.
    pub fn as_str(&self, line: usize) -> EvalResult<&str> {
        match self {
            Self::Str(s) => Ok(s),
            _ => Err(RuntimeError::ExpectedString { line }),
        }
    }

    /// A short name for the value's type, used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Callable(_) => "function",
        }
    }

    /// Returns `true` if the value is an [`Array`](Self::Array).
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    /// Returns `true` if the value is a [`Map`](Self::Map).
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Self::Map(..))
    }

    /// Produces a deep copy of the value.
    ///
    /// Arrays and maps are recursively copied into fresh storage; scalars
    /// and callables are returned as-is. This is the engine behind the
    /// `clone` built-in.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        match self {
            Self::Array(arr) => {
                let copied: Vec<Self> = arr.borrow().iter().map(Self::deep_clone).collect();
                copied.into()
            },
            Self::Map(map) => {
                let copied: HashMap<MapKey, Self> = map.borrow()
                                                       .iter()
                                                       .map(|(k, v)| (k.clone(), v.deep_clone()))
                                                       .collect();
                copied.into()
            },
            other => other.clone(),
        }
    }
}

impl PartialEq for Value {
    /// Equality is structural for scalars and reference identity for
    /// composite and callable values. `nil == nil` is true; `nil` never
    /// equals a non-nil value.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Map(a), Self::Map(b)) => Rc::ptr_eq(a, b),
            (Self::Callable(a), Self::Callable(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Builtin(a), Self::Builtin(b)) => std::ptr::eq(*a, *b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin(def) => write!(f, "<native fn {}>", def.name),
            Self::Function(function) => match &function.declaration.name {
                Some(name) => write!(f, "<fn {name}>"),
                None => write!(f, "<fn>"),
            },
        }
    }
}

/// Renders a number without a trailing `.0` when it is integral.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Str(s) => write!(f, "{s}"),
            Self::Array(arr) => {
                write!(f, "[")?;
                for (index, value) in arr.borrow().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            },
            Self::Map(map) => {
                let entries = map.borrow();
                let mut keys: Vec<&MapKey> = entries.keys().collect();
                keys.sort();

                write!(f, "{{")?;
                for (index, key) in keys.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    match entries.get(key) {
                        Some(value) => write!(f, "{key}: {value}")?,
                        None => write!(f, "{key}: nil")?,
                    }
                }
                write!(f, "}}")
            },
            Self::Callable(callable) => write!(f, "{callable:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_rendering_drops_integral_fraction() {
        assert_eq!(Value::Number(55.0).to_string(), "55");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-3.0).to_string(), "-3");
    }

    #[test]
    fn array_rendering() {
        let array: Value = vec![Value::Number(1.0), Value::Str("a".to_string()), Value::Nil].into();
        assert_eq!(array.to_string(), "[1, a, nil]");
    }

    #[test]
    fn map_rendering_is_deterministic() {
        let mut entries = HashMap::new();
        entries.insert(MapKey::Str("b".to_string()), Value::Number(2.0));
        entries.insert(MapKey::Str("a".to_string()), Value::Number(1.0));
        let map: Value = entries.into();
        assert_eq!(map.to_string(), "{a: 1, b: 2}");
    }

    #[test]
    fn scalar_equality_is_structural() {
        assert_eq!(Value::Nil, Value::Nil);
        assert_eq!(Value::Number(2.0), Value::Number(2.0));
        assert_eq!(Value::Str("x".to_string()), Value::Str("x".to_string()));
        assert_ne!(Value::Nil, Value::Number(0.0));
        assert_ne!(Value::Nil, Value::Bool(false));
    }

    #[test]
    fn composite_equality_is_by_reference() {
        let a: Value = vec![Value::Number(1.0)].into();
        let b: Value = vec![Value::Number(1.0)].into();
        let alias = a.clone();

        assert_ne!(a, b);
        assert_eq!(a, alias);
    }

    #[test]
    fn deep_clone_is_independent() {
        let inner: Value = vec![Value::Number(1.0)].into();
        let outer: Value = vec![inner].into();
        let copy = outer.deep_clone();

        if let (Value::Array(original), Value::Array(cloned)) = (&outer, &copy) {
            assert!(!Rc::ptr_eq(original, cloned));
            if let (Value::Array(a), Value::Array(b)) =
                (&original.borrow()[0], &cloned.borrow()[0])
            {
                assert!(!Rc::ptr_eq(a, b));
            } else {
                panic!("expected nested arrays");
            }
        } else {
            panic!("expected arrays");
        }
    }
}
