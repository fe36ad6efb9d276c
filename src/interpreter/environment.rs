use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::interpreter::value::core::Value;

/// A lexical scope frame.
///
/// An environment maps names to values and points at its enclosing frame.
/// Frames form a tree rooted at the global scope: each block creates a
/// child, and each function call creates a child of the function's captured
/// closure. Environments are shared through `Rc` so that closures keep
/// their captured scopes alive, and bindings sit behind a `RefCell` because
/// the evaluation is single-threaded and strictly sequential.
#[derive(Debug)]
pub struct Environment {
    enclosing: Option<Rc<Environment>>,
    values:    RefCell<HashMap<String, Value>>,
}

impl Environment {
    /// Creates the root (global) environment.
    ///
    /// # Example
    /// ```
    /// use selva::interpreter::{environment::Environment, value::core::Value};
    ///
    /// let globals = Environment::global();
    /// globals.define("x", Value::Number(1.0));
    ///
    /// assert_eq!(globals.get("x"), Some(Value::Number(1.0)));
    /// ```
    #[must_use]
    pub fn global() -> Rc<Self> {
        Rc::new(Self { enclosing: None,
                       values:    RefCell::new(HashMap::new()), })
    }

    /// Creates a child environment enclosed by `enclosing`.
    #[must_use]
    pub fn with_enclosing(enclosing: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self { enclosing: Some(Rc::clone(enclosing)),
                       values:    RefCell::new(HashMap::new()), })
    }

    /// Unconditionally binds `name` to `value` in this scope, shadowing any
    /// binding of the same name in enclosing scopes.
    pub fn define(&self, name: &str, value: Value) {
        self.values.borrow_mut().insert(name.to_string(), value);
    }

    /// Looks `name` up through the scope chain, innermost first.
    ///
    /// Returns `None` when the name is not bound anywhere in the chain.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.borrow().get(name) {
            return Some(value.clone());
        }
        self.enclosing.as_ref().and_then(|parent| parent.get(name))
    }

    /// Overwrites the binding of `name` in the innermost scope that defines
    /// it.
    ///
    /// Returns whether a binding was found; assigning to a name that is
    /// undefined in the entire chain is a runtime error raised by the
    /// caller.
    #[must_use]
    pub fn assign(&self, name: &str, value: Value) -> bool {
        {
            let mut values = self.values.borrow_mut();
            if values.contains_key(name) {
                values.insert(name.to_string(), value);
                return true;
            }
        }
        self.enclosing
            .as_ref()
            .is_some_and(|parent| parent.assign(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_get() {
        let env = Environment::global();
        env.define("a", Value::Number(1.0));
        assert_eq!(env.get("a"), Some(Value::Number(1.0)));
        assert_eq!(env.get("b"), None);
    }

    #[test]
    fn lookup_walks_the_chain() {
        let outer = Environment::global();
        outer.define("a", Value::Str("outer".to_string()));
        let inner = Environment::with_enclosing(&outer);
        assert_eq!(inner.get("a"), Some(Value::Str("outer".to_string())));
    }

    #[test]
    fn shadowing_does_not_touch_the_outer_binding() {
        let outer = Environment::global();
        outer.define("a", Value::Number(1.0));
        let inner = Environment::with_enclosing(&outer);
        inner.define("a", Value::Number(2.0));

        assert_eq!(inner.get("a"), Some(Value::Number(2.0)));
        assert_eq!(outer.get("a"), Some(Value::Number(1.0)));
    }

    #[test]
    fn assign_overwrites_the_defining_scope() {
        let outer = Environment::global();
        outer.define("a", Value::Number(1.0));
        let inner = Environment::with_enclosing(&outer);

        assert!(inner.assign("a", Value::Number(9.0)));
        assert_eq!(outer.get("a"), Some(Value::Number(9.0)));
    }

    #[test]
    fn assign_to_undefined_reports_not_found() {
        let env = Environment::global();
        assert!(!env.assign("ghost", Value::Nil));
    }
}
