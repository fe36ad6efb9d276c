//! # selva
//!
//! Selva is a tree-walking interpreter for a small dynamically-typed
//! scripting language in the Lox family, written in Rust. It scans, parses,
//! and evaluates programs with first-class arrays and maps, nested selector
//! indexing with multi-index groups, absolute-value grouping, closures with
//! lexical scoping, and a library of built-in string methods including
//! template interpolation.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{
    error::ParseError,
    interpreter::{evaluator::core::Context, parser::core::parse_program, scanner::scan_tokens},
};

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` and `Stmt` enums and related types that
/// represent the syntactic structure of source code as a tree. The AST is
/// built by the parser and traversed by the evaluator.
///
/// # Responsibilities
/// - Defines expression and statement types for all language constructs.
/// - Attaches source line numbers to AST nodes for error reporting.
/// - Carries variable-declaration initializer variants (scalar, array, map,
///   function) through to evaluation.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during scanning,
/// parsing, or evaluating code. It standardizes error reporting and carries
/// detailed information about failures, including error kinds, descriptions,
/// and source lines.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (scanner, parser, evaluator).
/// - Attaches line numbers and detailed messages for context.
/// - Renders diagnostics in the `[line N] Error: ...` form.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together scanning, parsing, evaluation, value
/// representations, environments, error handling, and all supporting
/// infrastructure to provide a complete runtime for source code evaluation.
///
/// # Responsibilities
/// - Coordinates all core components: scanner, parser, environments, and
///   evaluator.
/// - Provides entry points for parsing and evaluating user code.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for safe numeric conversion and helpers.
///
/// This module provides reusable helpers and conversion routines that are
/// used throughout the parser and evaluator. These include safe conversions
/// between floating-point values and machine integers for indexing.
///
/// # Responsibilities
/// - Safely convert between `f64`, `i64`, and `usize` without silent data
///   loss.
pub mod util;

/// Runs a Selva program from source text.
///
/// The full pipeline is executed: the source is scanned into tokens, parsed
/// into statements, and evaluated in a fresh interpreter context. When
/// several scan or parse diagnostics are produced in one run, the extras are
/// written to stderr and the first is returned as the error.
///
/// With `auto_print` set, the value of the last top-level expression
/// statement is printed after the program finishes.
///
/// # Errors
/// Returns an error if scanning, parsing, or evaluation fails.
///
/// # Examples
/// ```
/// use selva::run_program;
///
/// // A well-formed program runs to completion.
/// let source = "var x = 2 + 2;";
/// assert!(run_program(source, false).is_ok());
///
/// // An undefined variable is a runtime error.
/// let source = "var y = x + 1;";
/// assert!(run_program(source, false).is_err());
/// ```
pub fn run_program(source: &str, auto_print: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (tokens, scan_errors) = scan_tokens(source);
    if !scan_errors.is_empty() {
        return Err(reject(scan_errors));
    }

    let mut iter = tokens.iter().peekable();
    let (statements, parse_errors) = parse_program(&mut iter);
    if !parse_errors.is_empty() {
        return Err(reject(parse_errors));
    }

    let mut context = Context::new();
    let result = context.eval_toplevel(&statements)?;

    if auto_print && let Some(value) = result {
        println!("{value}");
    }

    Ok(())
}

/// Reports every diagnostic beyond the first to stderr and returns the first
/// as the run's error. Callers guarantee the list is non-empty.
fn reject(errors: Vec<ParseError>) -> Box<dyn std::error::Error> {
    let mut iter = errors.into_iter();
    let first = iter.next().expect("at least one diagnostic");
    for extra in iter {
        eprintln!("{extra}");
    }
    Box::new(first)
}
