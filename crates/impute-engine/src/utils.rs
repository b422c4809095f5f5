//! Shared helpers for type detection and numeric formatting.

use polars::prelude::*;

/// Largest magnitude at which every integer is exactly representable as `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Try to parse a raw text token as a number.
///
/// Surrounding whitespace is ignored. Non-finite literals (`NaN`, `inf`,
/// `1e400`) still parse; the numeric column stores them as missing.
pub fn parse_numeric_token(token: &str) -> Option<f64> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Parse a raw text token as an exact `i64` literal.
pub fn parse_integer_token(token: &str) -> Option<i64> {
    token.trim().parse::<i64>().ok()
}

/// Return the value as `i64` when it has no fractional part and fits exactly.
pub fn as_exact_integer(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        Some(value as i64)
    } else {
        None
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float32));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_parse_numeric_token() {
        assert_eq!(parse_numeric_token(" 42 "), Some(42.0));
        assert_eq!(parse_numeric_token("-1.5e2"), Some(-150.0));
        assert_eq!(parse_numeric_token("abc"), None);
        assert_eq!(parse_numeric_token(""), None);
        assert!(parse_numeric_token("NaN").unwrap().is_nan());
        assert_eq!(parse_numeric_token("inf"), Some(f64::INFINITY));
        assert_eq!(parse_numeric_token("1e400"), Some(f64::INFINITY));
    }

    #[test]
    fn test_parse_integer_token() {
        assert_eq!(parse_integer_token(" 17"), Some(17));
        assert_eq!(parse_integer_token("9007199254740993"), Some(9_007_199_254_740_993));
        assert_eq!(parse_integer_token("17.0"), None);
        assert_eq!(parse_integer_token("99999999999999999999"), None);
    }

    #[test]
    fn test_as_exact_integer() {
        assert_eq!(as_exact_integer(30.0), Some(30));
        assert_eq!(as_exact_integer(-2.0), Some(-2));
        assert_eq!(as_exact_integer(30.5), None);
        assert_eq!(as_exact_integer(f64::INFINITY), None);
        assert_eq!(as_exact_integer(1e300), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(33.33333, 2), 33.33);
        assert_eq!(round_to(66.666666, 2), 66.67);
        assert_eq!(round_to(25.0, 2), 25.0);
    }
}
