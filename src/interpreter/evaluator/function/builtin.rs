use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
    util::num::usize_to_f64_checked,
};

/// Type alias for builtin function handlers.
///
/// A builtin receives a slice of evaluated argument values and the call's
/// line number. It returns the call result wrapped in `EvalResult`.
pub type BuiltinFn = fn(&[Value], usize) -> EvalResult<Value>;

/// Specifies the allowed number of arguments for a builtin.
///
/// - `Exact(n)` means the builtin must receive exactly `n` arguments.
/// - `Variadic` accepts any count.
#[derive(Clone, Copy, Debug)]
pub enum Arity {
    /// Exactly this many arguments.
    Exact(usize),
    /// Any number of arguments.
    Variadic,
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity
    /// constraint.
    #[must_use]
    pub const fn check(&self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == *m,
            Self::Variadic => true,
        }
    }

    /// The count reported in arity diagnostics. Variadic callables never
    /// produce one.
    #[must_use]
    pub const fn expected(&self) -> usize {
        match self {
            Self::Exact(m) => *m,
            Self::Variadic => 0,
        }
    }
}

/// A built-in callable: its name, arity constraint, and handler.
pub struct BuiltinDef {
    /// The name bound in the global environment.
    pub name:  &'static str,
    /// The arity constraint checked before invocation.
    pub arity: Arity,
    /// The handler run with the evaluated arguments.
    pub func:  BuiltinFn,
}

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - an arity specification,
/// - a function pointer implementing the builtin.
///
/// The macro produces:
/// - `BUILTIN_TABLE` (static table used to populate the global scope),
/// - `BUILTIN_FUNCTIONS` (public list of builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        /// The table of built-ins injected into the global environment.
        pub static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, func: $func },
            )*
        ];
        /// The names of all built-in callables.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "clock"   => { arity: Arity::Exact(0), func: clock },
    "println" => { arity: Arity::Variadic, func: println_values },
    "print"   => { arity: Arity::Variadic, func: print_values },
    "sprint"  => { arity: Arity::Variadic, func: sprint },
    "len"     => { arity: Arity::Exact(1), func: len },
    "clone"   => { arity: Arity::Exact(1), func: clone_value },
}

/// `clock()`: seconds since the Unix epoch as a number.
#[allow(clippy::unnecessary_wraps)]
fn clock(_args: &[Value], _line: usize) -> EvalResult<Value> {
    let seconds = SystemTime::now().duration_since(UNIX_EPOCH)
                                   .map_or(0.0, |elapsed| elapsed.as_secs_f64());
    Ok(Value::Number(seconds))
}

/// `println(...)`: writes the arguments separated by single spaces,
/// newline terminated. Returns nil.
#[allow(clippy::unnecessary_wraps)]
fn println_values(args: &[Value], _line: usize) -> EvalResult<Value> {
    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
    println!("{}", rendered.join(" "));
    Ok(Value::Nil)
}

/// `print(...)`: writes the arguments with no separator and no newline.
/// Returns nil.
#[allow(clippy::unnecessary_wraps)]
fn print_values(args: &[Value], _line: usize) -> EvalResult<Value> {
    for value in args {
        print!("{value}");
    }
    Ok(Value::Nil)
}

/// `sprint(...)`: returns the concatenation of the rendered arguments.
#[allow(clippy::unnecessary_wraps)]
fn sprint(args: &[Value], _line: usize) -> EvalResult<Value> {
    let mut out = String::new();
    for value in args {
        out.push_str(&value.to_string());
    }
    Ok(Value::Str(out))
}

/// `len(x)`: the length of a string (in characters), array, or map.
fn len(args: &[Value], line: usize) -> EvalResult<Value> {
    let length = match &args[0] {
        Value::Str(s) => s.chars().count(),
        Value::Array(arr) => arr.borrow().len(),
        Value::Map(map) => map.borrow().len(),
        other => {
            return Err(RuntimeError::TypeError {
                details: format!("len expects a string, array, or map, got {}", other.type_name()),
                line,
            });
        },
    };
    Ok(Value::Number(usize_to_f64_checked(length, line)?))
}

/// `clone(x)`: a deep copy of an array or map.
fn clone_value(args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        value @ (Value::Array(_) | Value::Map(_)) => Ok(value.deep_clone()),
        other => Err(RuntimeError::TypeError {
            details: format!("clone expects an array or map, got {}", other.type_name()),
            line,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_measures_its_argument() {
        let string = Value::Str("héllo".to_string());
        assert_eq!(len(&[string], 1).unwrap(), Value::Number(5.0));

        let array: Value = vec![Value::Nil, Value::Nil].into();
        assert_eq!(len(&[array], 1).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn len_rejects_scalars() {
        let result = len(&[Value::Number(3.0)], 2);
        assert!(matches!(result, Err(RuntimeError::TypeError { line: 2, .. })));
    }

    #[test]
    fn sprint_concatenates_without_separator() {
        let result = sprint(&[Value::Number(1.0), Value::Str("x".to_string())], 1).unwrap();
        assert_eq!(result, Value::Str("1x".to_string()));
    }

    #[test]
    fn clone_rejects_scalars() {
        let result = clone_value(&[Value::Number(1.0)], 4);
        assert!(matches!(result, Err(RuntimeError::TypeError { line: 4, .. })));
    }

    #[test]
    fn builtin_names_are_registered() {
        assert!(BUILTIN_FUNCTIONS.contains(&"clock"));
        assert!(BUILTIN_FUNCTIONS.contains(&"clone"));
        assert_eq!(BUILTIN_TABLE.len(), BUILTIN_FUNCTIONS.len());
    }
}
