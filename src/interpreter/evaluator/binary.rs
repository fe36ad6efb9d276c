use crate::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
    util::num::MAX_SAFE_INT,
};

impl Context {
    /// Evaluates a binary operation between two values.
    ///
    /// Operand typing is strict: an operand combination outside the table
    /// below raises a type error instead of silently producing nil.
    ///
    /// - `+`: number + number, or string + string (concatenation).
    /// - `-`, `/`: number arithmetic. Division follows IEEE-754, so
    ///   dividing by zero yields an infinity rather than an error.
    /// - `*`: number * number, or string repetition when one side is a
    ///   string and the other a number (the count truncates toward zero).
    /// - `**`: number exponentiation.
    /// - `%`: percentage, so `a % b` is `a * b / 100`.
    /// - `<`, `<=`, `>`, `>=`: number comparison.
    /// - `==`, `!=`: structural on scalars, reference identity on
    ///   composites and callables.
    ///
    /// # Parameters
    /// - `op`: The operator.
    /// - `left`: Left operand.
    /// - `right`: Right operand.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// An `EvalResult<Value>` containing the evaluated result.
    ///
    /// # Example
    /// ```
    /// use selva::{
    ///     ast::BinaryOperator,
    ///     interpreter::{evaluator::core::Context, value::core::Value},
    /// };
    ///
    /// let left = Value::Number(10.0);
    /// let right = Value::Number(90.0);
    ///
    /// let result = Context::eval_binary(BinaryOperator::Percent, &left, &right, 1);
    /// assert_eq!(result.unwrap(), Value::Number(9.0));
    /// ```
    pub fn eval_binary(op: BinaryOperator,
                       left: &Value,
                       right: &Value,
                       line: usize)
                       -> EvalResult<Value> {
        use BinaryOperator::{
            Add, Div, Equal, Greater, GreaterEqual, Less, LessEqual, Mul, NotEqual, Percent, Pow,
            Sub,
        };
        use Value::{Number, Str};

        match op {
            Add => match (left, right) {
                (Number(a), Number(b)) => Ok(Number(a + b)),
                (Str(a), Str(b)) => Ok(Str(format!("{a}{b}"))),
                _ => Err(type_error(op, left, right, line)),
            },

            Sub => match (left, right) {
                (Number(a), Number(b)) => Ok(Number(a - b)),
                _ => Err(type_error(op, left, right, line)),
            },

            Mul => match (left, right) {
                (Number(a), Number(b)) => Ok(Number(a * b)),
                (Number(count), Str(s)) | (Str(s), Number(count)) => {
                    Ok(Str(repeat_string(s, *count, line)?))
                },
                _ => Err(type_error(op, left, right, line)),
            },

            Div => match (left, right) {
                (Number(a), Number(b)) => Ok(Number(a / b)),
                _ => Err(type_error(op, left, right, line)),
            },

            Pow => match (left, right) {
                (Number(a), Number(b)) => Ok(Number(a.powf(*b))),
                _ => Err(type_error(op, left, right, line)),
            },

            Percent => match (left, right) {
                (Number(a), Number(b)) => Ok(Number(a * b / 100.0)),
                _ => Err(type_error(op, left, right, line)),
            },

            Less | LessEqual | Greater | GreaterEqual => match (left, right) {
                (Number(a), Number(b)) => {
                    let result = match op {
                        Less => a < b,
                        LessEqual => a <= b,
                        Greater => a > b,
                        _ => a >= b,
                    };
                    Ok(Value::Bool(result))
                },
                _ => Err(type_error(op, left, right, line)),
            },

            Equal => Ok(Value::Bool(left == right)),
            NotEqual => Ok(Value::Bool(left != right)),
        }
    }
}

/// Builds the diagnostic for an operand combination outside an operator's
/// table.
fn type_error(op: BinaryOperator, left: &Value, right: &Value, line: usize) -> RuntimeError {
    RuntimeError::TypeError {
        details: format!("Cannot apply '{op}' to {} and {}", left.type_name(), right.type_name()),
        line,
    }
}

/// Repeats a string `count` times, truncating the count toward zero.
///
/// A non-positive count produces the empty string.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_precision_loss)]
fn repeat_string(s: &str, count: f64, line: usize) -> EvalResult<String> {
    if !count.is_finite() || count > MAX_SAFE_INT as f64 {
        return Err(RuntimeError::NumberTooLarge { line });
    }
    let count = count.trunc();
    if count <= 0.0 {
        return Ok(String::new());
    }
    Ok(s.repeat(count as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(n: f64) -> Value {
        Value::Number(n)
    }

    fn string(s: &str) -> Value {
        Value::Str(s.to_string())
    }

    #[test]
    fn percent_is_a_percentage_not_a_modulus() {
        let result = Context::eval_binary(BinaryOperator::Percent, &number(10.0), &number(90.0), 1);
        assert_eq!(result.unwrap(), number(9.0));
    }

    #[test]
    fn string_repetition_commutes() {
        let left = Context::eval_binary(BinaryOperator::Mul, &number(3.0), &string("ab"), 1);
        let right = Context::eval_binary(BinaryOperator::Mul, &string("ab"), &number(3.0), 1);
        assert_eq!(left.unwrap(), string("ababab"));
        assert_eq!(right.unwrap(), string("ababab"));
    }

    #[test]
    fn repetition_count_truncates_and_clamps() {
        let fractional = Context::eval_binary(BinaryOperator::Mul, &number(2.9), &string("x"), 1);
        assert_eq!(fractional.unwrap(), string("xx"));

        let negative = Context::eval_binary(BinaryOperator::Mul, &number(-1.0), &string("x"), 1);
        assert_eq!(negative.unwrap(), string(""));
    }

    #[test]
    fn mismatched_operands_raise_type_errors() {
        let result = Context::eval_binary(BinaryOperator::Add, &number(1.0), &string("x"), 7);
        assert!(matches!(result, Err(RuntimeError::TypeError { line: 7, .. })));

        let result = Context::eval_binary(BinaryOperator::Less, &string("a"), &string("b"), 8);
        assert!(matches!(result, Err(RuntimeError::TypeError { line: 8, .. })));
    }

    #[test]
    fn equality_spans_types_without_errors() {
        let result = Context::eval_binary(BinaryOperator::Equal, &Value::Nil, &number(0.0), 1);
        assert_eq!(result.unwrap(), Value::Bool(false));

        let result = Context::eval_binary(BinaryOperator::NotEqual, &Value::Nil, &Value::Nil, 1);
        assert_eq!(result.unwrap(), Value::Bool(false));
    }
}
