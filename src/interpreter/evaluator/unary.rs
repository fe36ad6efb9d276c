use crate::{
    ast::UnaryOperator,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

impl Context {
    /// Evaluates a unary operator applied to a value.
    ///
    /// - `-x` negates a number.
    /// - `!x` is logical not over truthiness, so `!nil` and `!false` are
    ///   true and everything else maps to false.
    /// - prefix `++x` / `--x` yield `x ± 1` without mutating `x`.
    ///
    /// # Parameters
    /// - `op`: The unary operator.
    /// - `value`: The evaluated operand.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// The computed value.
    ///
    /// # Example
    /// ```
    /// use selva::{
    ///     ast::UnaryOperator,
    ///     interpreter::{evaluator::core::Context, value::core::Value},
    /// };
    ///
    /// let value = Value::Number(5.0);
    /// let negated = Context::eval_unary(UnaryOperator::Negate, &value, 1).unwrap();
    /// assert_eq!(negated, Value::Number(-5.0));
    ///
    /// let incremented = Context::eval_unary(UnaryOperator::Increment, &value, 1).unwrap();
    /// assert_eq!(incremented, Value::Number(6.0));
    /// ```
    pub fn eval_unary(op: UnaryOperator, value: &Value, line: usize) -> EvalResult<Value> {
        match op {
            UnaryOperator::Negate => Ok(Value::Number(-value.as_number(line)?)),
            UnaryOperator::Not => Ok(Value::Bool(!value.is_truthy())),
            UnaryOperator::Increment => Ok(Value::Number(value.as_number(line)? + 1.0)),
            UnaryOperator::Decrement => Ok(Value::Number(value.as_number(line)? - 1.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;

    #[test]
    fn not_follows_truthiness() {
        assert_eq!(
            Context::eval_unary(UnaryOperator::Not, &Value::Nil, 1).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            Context::eval_unary(UnaryOperator::Not, &Value::Number(0.0), 1).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn negating_a_non_number_is_an_error() {
        let result = Context::eval_unary(UnaryOperator::Negate, &Value::Str("x".to_string()), 3);
        assert!(matches!(result, Err(RuntimeError::ExpectedNumber { line: 3 })));
    }
}
