use std::collections::HashMap;

use crate::{
    ast::Expr,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::{core::Value, key::MapKey},
    },
    util::num::f64_to_i64_checked,
};

impl Context {
    /// Applies selector groups to a value, left to right.
    ///
    /// For each group:
    /// - on an array, every index expression picks one element (a negative
    ///   index `i` counts from the end as `len + i`); a group with several
    ///   indices yields an array of the picked elements, while a
    ///   single-index group collapses to the element itself. An
    ///   out-of-range index is fatal.
    /// - on a map, every key expression picks one entry; a multi-key group
    ///   yields a map of the picked entries, a single-key group collapses
    ///   to the value. A missing key reads as nil.
    /// - on a string, the remaining groups are left unapplied and the
    ///   string is returned as-is; this is what lets a trailing method
    ///   name like `s.upper` resolve to the receiver for dispatch.
    /// - on any other value, indexing is a type error.
    ///
    /// After all groups are applied, an access with exactly one group
    /// whose result is a one-element array collapses to that element.
    /// This makes `a[0]` on `[[5]]` yield `5`, which matters for
    /// multi-dimensional indexing.
    ///
    /// # Parameters
    /// - `value`: The value the selectors are applied to.
    /// - `selectors`: The selector groups, in source order.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// The selected value.
    pub fn apply_selectors(&mut self,
                           mut value: Value,
                           selectors: &[Vec<Expr>],
                           line: usize)
                           -> EvalResult<Value> {
        for group in selectors {
            let mut keys = Vec::with_capacity(group.len());
            for expr in group {
                keys.push(self.eval(expr)?);
            }

            value = match &value {
                Value::Array(arr) => {
                    let items = arr.borrow();
                    let mut picked = Vec::with_capacity(keys.len());
                    for key in &keys {
                        let index = resolve_index(key, items.len(), line)?;
                        picked.push(items[index].clone());
                    }
                    if picked.len() == 1 {
                        picked.remove(0)
                    } else {
                        drop(items);
                        picked.into()
                    }
                },
                Value::Map(map) => {
                    let entries = map.borrow();
                    if keys.len() == 1 {
                        let key = MapKey::from_value(&keys[0], line)?;
                        entries.get(&key).cloned().unwrap_or(Value::Nil)
                    } else {
                        let mut picked = HashMap::with_capacity(keys.len());
                        for key_value in &keys {
                            let key = MapKey::from_value(key_value, line)?;
                            let entry = entries.get(&key).cloned().unwrap_or(Value::Nil);
                            picked.insert(key, entry);
                        }
                        drop(entries);
                        picked.into()
                    }
                },
                Value::Str(_) => break,
                other => {
                    return Err(RuntimeError::TypeError {
                        details: format!("Cannot index into {}", other.type_name()),
                        line,
                    });
                },
            };
        }

        if selectors.len() == 1 {
            let single = match &value {
                Value::Array(arr) => {
                    let items = arr.borrow();
                    if items.len() == 1 { Some(items[0].clone()) } else { None }
                },
                _ => None,
            };
            if let Some(single) = single {
                value = single;
            }
        }

        Ok(value)
    }

    /// Writes `value` through a selector path into the composite bound to
    /// `name`.
    ///
    /// The root binding is resolved first; assigning through an undefined
    /// name is a runtime error. Every group of an assignment target must
    /// hold exactly one index expression. The index expressions are
    /// evaluated left to right before the walk begins.
    ///
    /// Intermediate steps descend into the existing element; a missing
    /// intermediate map key or a non-composite intermediate is a path
    /// error. At the final step the value is written: map keys are
    /// inserted or overwritten, and an array write past the end extends
    /// the array with nil padding.
    ///
    /// # Parameters
    /// - `name`: The root variable name.
    /// - `selectors`: The selector groups of the assignment target.
    /// - `value`: The value to write.
    /// - `line`: Line number for error reporting.
    pub fn assign_selector_path(&mut self,
                                name: &str,
                                selectors: &[Vec<Expr>],
                                value: Value,
                                line: usize)
                                -> EvalResult<()> {
        let root = self.env()
                       .get(name)
                       .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.to_string(),
                                                                        line })?;

        let mut path = Vec::with_capacity(selectors.len());
        for group in selectors {
            if group.len() != 1 {
                return Err(RuntimeError::BadSelectorPath {
                    details: "assignment target selectors must have a single index".to_string(),
                    line,
                });
            }
            path.push(self.eval(&group[0])?);
        }

        set_by_path(&root, &path, value, line)
    }
}

/// Resolves one index value against an array of length `len`.
///
/// The index must be an integral number. A negative index counts from the
/// end; anything still outside `0..len` after adjustment is out of
/// bounds.
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_sign_loss)]
fn resolve_index(key: &Value, len: usize, line: usize) -> EvalResult<usize> {
    let raw = f64_to_i64_checked(key.as_number(line)?, line)?;

    let adjusted = if raw < 0 { raw + len as i64 } else { raw };

    if adjusted >= 0 && (adjusted as usize) < len {
        Ok(adjusted as usize)
    } else {
        Err(RuntimeError::IndexOutOfBounds { len, found: raw, line })
    }
}

/// Recursively walks `path` into `target` and writes `value` at the final
/// step. Arrays and maps share their storage through `Rc`, so the write
/// is visible through every alias of the root.
fn set_by_path(target: &Value, path: &[Value], value: Value, line: usize) -> EvalResult<()> {
    match target {
        Value::Array(arr) => {
            let raw = f64_to_i64_checked(path[0].as_number(line)?, line)?;
            if raw < 0 {
                return Err(RuntimeError::BadSelectorPath {
                    details: "negative index in assignment".to_string(),
                    line,
                });
            }
            #[allow(clippy::cast_sign_loss)]
            let index = raw as usize;

            if path.len() == 1 {
                let mut items = arr.borrow_mut();
                if index >= items.len() {
                    items.resize(index + 1, Value::Nil);
                }
                items[index] = value;
                return Ok(());
            }

            let next = {
                let items = arr.borrow();
                items.get(index).cloned()
            };
            let next = next.ok_or(RuntimeError::IndexOutOfBounds { len: arr.borrow().len(),
                                                                   found: raw,
                                                                   line })?;
            set_by_path(&next, &path[1..], value, line)
        },

        Value::Map(map) => {
            let key = MapKey::from_value(&path[0], line)?;

            if path.len() == 1 {
                map.borrow_mut().insert(key, value);
                return Ok(());
            }

            let next = map.borrow().get(&key).cloned();
            let next = next.ok_or_else(|| RuntimeError::MissingKey { key: key.to_string(),
                                                                     line })?;
            set_by_path(&next, &path[1..], value, line)
        },

        other => Err(RuntimeError::BadSelectorPath {
            details: format!("cannot descend into {}", other.type_name()),
            line,
        }),
    }
}
