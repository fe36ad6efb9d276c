/// The built-in callables injected into the global environment.
pub mod builtin;
/// Call dispatch, arity checks, and user-function invocation.
pub mod core;
