use crate::{
    ast::Expr,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult},
            function::builtin::Arity,
            strings::template,
        },
        value::core::Value,
    },
    util::num::usize_to_f64_checked,
};

/// Type alias for string-method handlers.
///
/// A method receives the evaluator, the string receiver, and the raw
/// (un-evaluated) argument expressions; the handler evaluates the
/// arguments it needs. This keeps methods like `template` free to consult
/// the current environment.
pub type StringMethodFn = fn(&mut Context, &str, &[Expr], usize) -> EvalResult<Value>;

/// A registered string method: its name, arity constraint, and handler.
pub struct StringMethodDef {
    /// The method name used after the dot.
    pub name:  &'static str,
    /// The arity constraint checked before invocation.
    pub arity: Arity,
    /// The handler run with the raw argument expressions.
    pub func:  StringMethodFn,
}

/// Defines string methods by generating a lookup table and a name list.
macro_rules! string_methods {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        /// The table of registered string methods.
        pub static STRING_METHOD_TABLE: &[StringMethodDef] = &[
            $(
                StringMethodDef { name: $name, arity: $arity, func: $func },
            )*
        ];
        /// The names of all registered string methods.
        pub const STRING_METHODS: &[&str] = &[
            $($name,)*
        ];
    };
}

string_methods! {
    "len"        => { arity: Arity::Exact(0), func: len },
    "lower"      => { arity: Arity::Exact(0), func: lower },
    "upper"      => { arity: Arity::Exact(0), func: upper },
    "trim"       => { arity: Arity::Exact(0), func: trim },
    "trimleft"   => { arity: Arity::Exact(1), func: trim_left },
    "trimright"  => { arity: Arity::Exact(1), func: trim_right },
    "trimprefix" => { arity: Arity::Exact(1), func: trim_prefix },
    "trimsuffix" => { arity: Arity::Exact(1), func: trim_suffix },
    "split"      => { arity: Arity::Exact(1), func: split },
    "number"     => { arity: Arity::Exact(0), func: number },
    "template"   => { arity: Arity::Variadic, func: expand_template },
}

/// Looks a method name up in the registry.
#[must_use]
pub fn find_string_method(name: &str) -> Option<&'static StringMethodDef> {
    STRING_METHOD_TABLE.iter().find(|def| def.name == name)
}

/// Evaluates a method argument that must produce a string.
fn string_argument(ctx: &mut Context, arg: &Expr, line: usize) -> EvalResult<String> {
    let value = ctx.eval(arg)?;
    Ok(value.as_str(line)?.to_string())
}

/// `s.len()`: the length of the receiver in characters.
fn len(_ctx: &mut Context, receiver: &str, _args: &[Expr], line: usize) -> EvalResult<Value> {
    Ok(Value::Number(usize_to_f64_checked(receiver.chars().count(), line)?))
}

/// `s.lower()`: the receiver lowercased.
#[allow(clippy::unnecessary_wraps)]
fn lower(_ctx: &mut Context, receiver: &str, _args: &[Expr], _line: usize) -> EvalResult<Value> {
    Ok(Value::Str(receiver.to_lowercase()))
}

/// `s.upper()`: the receiver uppercased.
#[allow(clippy::unnecessary_wraps)]
fn upper(_ctx: &mut Context, receiver: &str, _args: &[Expr], _line: usize) -> EvalResult<Value> {
    Ok(Value::Str(receiver.to_uppercase()))
}

/// `s.trim()`: the receiver with surrounding whitespace removed.
#[allow(clippy::unnecessary_wraps)]
fn trim(_ctx: &mut Context, receiver: &str, _args: &[Expr], _line: usize) -> EvalResult<Value> {
    Ok(Value::Str(receiver.trim().to_string()))
}

/// `s.trimleft(set)`: the receiver with leading characters from `set`
/// removed.
fn trim_left(ctx: &mut Context, receiver: &str, args: &[Expr], line: usize) -> EvalResult<Value> {
    let set = string_argument(ctx, &args[0], line)?;
    let trimmed = receiver.trim_start_matches(|c: char| set.contains(c));
    Ok(Value::Str(trimmed.to_string()))
}

/// `s.trimright(set)`: the receiver with trailing characters from `set`
/// removed.
fn trim_right(ctx: &mut Context, receiver: &str, args: &[Expr], line: usize) -> EvalResult<Value> {
    let set = string_argument(ctx, &args[0], line)?;
    let trimmed = receiver.trim_end_matches(|c: char| set.contains(c));
    Ok(Value::Str(trimmed.to_string()))
}

/// `s.trimprefix(p)`: the receiver without the prefix `p`, when present.
fn trim_prefix(ctx: &mut Context, receiver: &str, args: &[Expr], line: usize) -> EvalResult<Value> {
    let prefix = string_argument(ctx, &args[0], line)?;
    let trimmed = receiver.strip_prefix(&prefix).unwrap_or(receiver);
    Ok(Value::Str(trimmed.to_string()))
}

/// `s.trimsuffix(p)`: the receiver without the suffix `p`, when present.
fn trim_suffix(ctx: &mut Context, receiver: &str, args: &[Expr], line: usize) -> EvalResult<Value> {
    let suffix = string_argument(ctx, &args[0], line)?;
    let trimmed = receiver.strip_suffix(&suffix).unwrap_or(receiver);
    Ok(Value::Str(trimmed.to_string()))
}

/// `s.split(sep)`: an array of the substrings around `sep`.
fn split(ctx: &mut Context, receiver: &str, args: &[Expr], line: usize) -> EvalResult<Value> {
    let separator = string_argument(ctx, &args[0], line)?;
    let parts: Vec<Value> = receiver.split(&separator)
                                    .map(|part| Value::Str(part.to_string()))
                                    .collect();
    Ok(parts.into())
}

/// `s.number()`: the receiver parsed as a number.
fn number(_ctx: &mut Context, receiver: &str, _args: &[Expr], line: usize) -> EvalResult<Value> {
    receiver.trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| RuntimeError::InvalidArgument {
                details: format!("'{receiver}' cannot be parsed as a number"),
                line,
            })
}

/// `s.template(...)`: the receiver with `${...}` placeholders interpolated
/// against the current environment.
fn expand_template(ctx: &mut Context,
                   receiver: &str,
                   _args: &[Expr],
                   line: usize)
                   -> EvalResult<Value> {
    template::expand(ctx, receiver, line)
}
