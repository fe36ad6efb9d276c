use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// Largest integer value exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_INT: u64 = 9_007_199_254_740_991;

/// Safely converts an `f64` to `i64` if the value is finite, within range,
/// and not fractional.
///
/// This is the conversion behind selector indices and declared sizes, where
/// a fractional or non-finite number is a programming error rather than
/// something to truncate silently.
///
/// # Parameters
/// - `value`: The floating-point value to convert.
/// - `line`: Source code line number for error reporting.
///
/// # Returns
/// - `Ok(i64)`: The converted value if safe.
/// - `Err(RuntimeError::TypeError | NumberTooLarge | FractionalIndex)`: If
///   conversion is invalid.
///
/// # Example
/// ```
/// use selva::{error::RuntimeError, util::num::f64_to_i64_checked};
///
/// // Safe conversion
/// let int = f64_to_i64_checked(1000.0, 1).unwrap();
/// assert_eq!(int, 1000);
///
/// // Fractional value
/// let err = f64_to_i64_checked(1.5, 123).unwrap_err();
/// assert!(matches!(err, RuntimeError::FractionalIndex { line: 123 }));
///
/// // Out of range
/// let err = f64_to_i64_checked(1e20, 5).unwrap_err();
/// assert!(matches!(err, RuntimeError::NumberTooLarge { line: 5 }));
/// ```
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
pub fn f64_to_i64_checked(value: f64, line: usize) -> EvalResult<i64> {
    if !value.is_finite() {
        return Err(RuntimeError::TypeError {
            details: format!("Cannot convert non-finite value {value} to an integer"),
            line,
        });
    }
    if value.abs() > MAX_SAFE_INT as f64 {
        return Err(RuntimeError::NumberTooLarge { line });
    }
    if value.fract() != 0.0 {
        return Err(RuntimeError::FractionalIndex { line });
    }
    Ok(value as i64)
}

/// Safely converts a `usize` to `f64` if and only if it is exactly
/// representable.
///
/// Used when surfacing lengths and counts back into the language, where
/// every number is an `f64`.
///
/// # Parameters
/// - `value`: The value to convert.
/// - `line`: Source code line number for error reporting.
///
/// # Returns
/// - `Ok(f64)`: The converted value if safe.
/// - `Err(RuntimeError::NumberTooLarge { line })`: If the value is too
///   large.
///
/// # Example
/// ```
/// use selva::util::num::usize_to_f64_checked;
///
/// let val = usize_to_f64_checked(100, 0).unwrap();
/// assert_eq!(val, 100.0);
/// ```
#[allow(clippy::cast_precision_loss)]
pub const fn usize_to_f64_checked(value: usize, line: usize) -> EvalResult<f64> {
    if value as u64 > MAX_SAFE_INT {
        return Err(RuntimeError::NumberTooLarge { line });
    }

    Ok(value as f64)
}
