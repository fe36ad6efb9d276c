/// Binary-operator semantics.
pub mod binary;
/// The evaluation context, control-flow signal, and AST dispatch.
pub mod core;
/// Call dispatch and the built-in callables.
pub mod function;
/// Selector reads and nested selector assignment.
pub mod selector;
/// String methods, callable as `expr.method(args)` on string receivers.
pub mod strings;
/// Unary-operator semantics.
pub mod unary;
