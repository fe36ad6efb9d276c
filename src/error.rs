/// Parsing errors.
///
/// Defines all error types that can occur during scanning and parsing of
/// source code. Parse errors include syntax mistakes, unexpected tokens,
/// invalid literals, reserved words, and any other issues detected before
/// evaluation.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation and
/// execution. Runtime errors include things like undefined variables, type
/// mismatches, arity mismatches, and bad selector paths.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;
