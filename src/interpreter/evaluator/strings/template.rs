use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::{core::Value, key::MapKey},
    },
};

/// Interpolates `${...}` placeholders in `receiver` against the current
/// environment.
///
/// A placeholder holds a dot-separated path, optionally ending in a call
/// segment `name(args)`. The leading segment is an environment lookup;
/// later segments descend through map string-keys and numeric array
/// indices. When the path ends in a call segment, the resolved value must
/// be callable and is invoked with `this` bound to the value the path
/// visited just before it.
///
/// Call arguments are comma-separated and may be `true`, `false`, `nil`,
/// `this`, a quoted string, a number, a dotted path, or a bare identifier
/// resolved from the environment.
///
/// # Parameters
/// - `ctx`: The evaluator, consulted for lookups and calls.
/// - `receiver`: The template text.
/// - `line`: Line number for error reporting.
///
/// # Returns
/// The interpolated string.
///
/// # Errors
/// An unterminated `${` and an unresolvable path are errors; so is a call
/// segment that does not resolve to a callable.
pub fn expand(ctx: &mut Context, receiver: &str, line: usize) -> EvalResult<Value> {
    let mut result = String::with_capacity(receiver.len());
    let mut chars = receiver.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' || chars.peek() != Some(&'{') {
            result.push(c);
            continue;
        }
        chars.next();

        let mut segment = String::new();
        let mut closed = false;
        for inner in chars.by_ref() {
            if inner == '}' {
                closed = true;
                break;
            }
            segment.push(inner);
        }
        if !closed {
            return Err(RuntimeError::InvalidArgument {
                details: "unterminated '${' in template".to_string(),
                line,
            });
        }

        let value = resolve_placeholder(ctx, segment.trim(), line)?;
        result.push_str(&value.to_string());
    }

    Ok(Value::Str(result))
}

/// Resolves one placeholder path, invoking a trailing call segment when
/// present.
fn resolve_placeholder(ctx: &mut Context, segment: &str, line: usize) -> EvalResult<Value> {
    let (path_text, call_arguments) = match segment.find('(') {
        Some(open) if segment.ends_with(')') => {
            (&segment[..open], Some(&segment[open + 1..segment.len() - 1]))
        },
        _ => (segment, None),
    };

    let mut parts = path_text.split('.');
    let first = parts.next().unwrap_or_default().trim();
    if first.is_empty() {
        return Err(RuntimeError::InvalidArgument {
            details: "empty placeholder in template".to_string(),
            line,
        });
    }

    let mut value = ctx.env()
                       .get(first)
                       .ok_or_else(|| RuntimeError::UndefinedVariable { name: first.to_string(),
                                                                        line })?;
    let mut this = Value::Nil;

    for part in parts {
        this = value.clone();
        value = descend(&value, part.trim(), line)?;
    }

    if let Some(arguments_text) = call_arguments {
        let Value::Callable(callable) = value else {
            return Err(RuntimeError::NotCallable { line });
        };
        let arguments = parse_arguments(ctx, arguments_text, &this, line)?;
        return ctx.call_value(&callable, arguments, this, line);
    }

    Ok(value)
}

/// Descends one path segment into a map (by string key) or an array (by
/// numeric index). A missing map key reads as nil.
fn descend(value: &Value, part: &str, line: usize) -> EvalResult<Value> {
    match value {
        Value::Map(map) => {
            let key = MapKey::Str(part.to_string());
            Ok(map.borrow().get(&key).cloned().unwrap_or(Value::Nil))
        },
        Value::Array(arr) => {
            let index: usize = part.parse().map_err(|_| RuntimeError::InvalidArgument {
                details: format!("invalid array index '{part}' in template"),
                line,
            })?;
            let items = arr.borrow();
            #[allow(clippy::cast_possible_wrap)]
            let found = index as i64;
            items.get(index).cloned().ok_or(RuntimeError::IndexOutOfBounds {
                len: items.len(),
                found,
                line,
            })
        },
        other => Err(RuntimeError::TypeError {
            details: format!("cannot descend into {} in template path '{part}'", other.type_name()),
            line,
        }),
    }
}

/// Parses the comma-separated argument list of a call segment.
fn parse_arguments(ctx: &mut Context,
                   text: &str,
                   this: &Value,
                   line: usize)
                   -> EvalResult<Vec<Value>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut arguments = Vec::new();
    for raw in text.split(',') {
        arguments.push(parse_argument(ctx, raw.trim(), this, line)?);
    }
    Ok(arguments)
}

/// Parses a single call-segment argument.
fn parse_argument(ctx: &mut Context, raw: &str, this: &Value, line: usize) -> EvalResult<Value> {
    match raw {
        "this" => return Ok(this.clone()),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "nil" => return Ok(Value::Nil),
        _ => {},
    }

    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Ok(Value::Str(raw[1..raw.len() - 1].to_string()));
    }

    if let Ok(number) = raw.parse::<f64>() {
        return Ok(Value::Number(number));
    }

    if raw.contains('.') {
        let mut parts = raw.split('.');
        let first = parts.next().unwrap_or_default();
        let mut value = ctx.env().get(first).unwrap_or(Value::Nil);
        for part in parts {
            value = descend(&value, part.trim(), line)?;
        }
        return Ok(value);
    }

    Ok(ctx.env().get(raw).unwrap_or(Value::Nil))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let mut ctx = Context::new();
        let result = expand(&mut ctx, "no placeholders here", 1).unwrap();
        assert_eq!(result, Value::Str("no placeholders here".to_string()));
    }

    #[test]
    fn simple_lookup_is_interpolated() {
        let mut ctx = Context::new();
        ctx.env().define("name", Value::Str("Ada".to_string()));
        let result = expand(&mut ctx, "hi ${name}!", 1).unwrap();
        assert_eq!(result, Value::Str("hi Ada!".to_string()));
    }

    #[test]
    fn unterminated_placeholder_is_an_error() {
        let mut ctx = Context::new();
        let result = expand(&mut ctx, "broken ${name", 3);
        assert!(matches!(result, Err(RuntimeError::InvalidArgument { line: 3, .. })));
    }

    #[test]
    fn undefined_root_is_an_error() {
        let mut ctx = Context::new();
        let result = expand(&mut ctx, "${ghost}", 2);
        assert!(matches!(result, Err(RuntimeError::UndefinedVariable { line: 2, .. })));
    }
}
