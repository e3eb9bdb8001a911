use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// Largest integer value exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_INT: f64 = 9_007_199_254_740_991.0;

/// Whether a real is a finite whole number.
///
/// # Example
/// ```
/// use argand::util::num::is_integral;
///
/// assert!(is_integral(4.0));
/// assert!(!is_integral(4.5));
/// assert!(!is_integral(f64::INFINITY));
/// ```
#[must_use]
pub fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}

/// Converts a real to `i64` if it is finite, whole, and in range.
///
/// # Parameters
/// - `value`: The real to convert.
/// - `what`: Short noun for the error message, e.g. `"index"`.
/// - `line`: Source line for error reporting.
///
/// # Errors
/// Returns `RuntimeError::BadArgument` for non-finite, fractional, or
/// out-of-range values.
///
/// # Example
/// ```
/// use argand::util::num::f64_to_i64_checked;
///
/// assert_eq!(f64_to_i64_checked(1000.0, "index", 1).unwrap(), 1000);
/// assert!(f64_to_i64_checked(1.5, "index", 1).is_err());
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn f64_to_i64_checked(value: f64, what: &str, line: usize) -> EvalResult<i64> {
    if !value.is_finite() {
        return Err(RuntimeError::BadArgument { details: format!("{what} must be finite, got {value}"),
                                               line });
    }
    if value.fract() != 0.0 {
        return Err(RuntimeError::BadArgument { details: format!("{what} must be a whole number, got {value}"),
                                               line });
    }
    if value.abs() > MAX_SAFE_INT {
        return Err(RuntimeError::BadArgument { details: format!("{what} {value} is out of range"),
                                               line });
    }
    Ok(value as i64)
}

/// Converts a collection length to `f64`.
///
/// Lossless for any length a collection in this engine can actually reach;
/// lengths beyond `2^53` saturate to [`MAX_SAFE_INT`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn usize_to_f64(value: usize) -> f64 {
    let converted = value as f64;
    if converted > MAX_SAFE_INT { MAX_SAFE_INT } else { converted }
}

/// Resolves a possibly negative index against a collection length.
///
/// Negative indices count from the end. Returns `None` when the resolved
/// position is outside `0..len` (callers decide whether that is an error or
/// an undefined result).
///
/// # Example
/// ```
/// use argand::util::num::resolve_index;
///
/// assert_eq!(resolve_index(-1, 5), Some(4));
/// assert_eq!(resolve_index(2, 5), Some(2));
/// assert_eq!(resolve_index(5, 5), None);
/// assert_eq!(resolve_index(-6, 5), None);
/// ```
#[must_use]
pub fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len_i = i64::try_from(len).ok()?;
    let resolved = if index < 0 { index + len_i } else { index };
    if (0..len_i).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{f64_to_i64_checked, is_integral, resolve_index};

    #[test]
    fn integral_detection() {
        assert!(is_integral(0.0));
        assert!(is_integral(-3.0));
        assert!(!is_integral(f64::NAN));
        assert!(!is_integral(0.25));
    }

    #[test]
    fn checked_conversion_rejects_fractional() {
        assert!(f64_to_i64_checked(2.5, "value", 0).is_err());
        assert_eq!(f64_to_i64_checked(-7.0, "value", 0).unwrap(), -7);
    }

    #[test]
    fn negative_indices_count_from_end() {
        assert_eq!(resolve_index(-2, 4), Some(2));
        assert_eq!(resolve_index(0, 0), None);
    }
}
