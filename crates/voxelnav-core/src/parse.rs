//! Parsing of numeric values from untrusted JSON input.

use serde_json::Value;

use crate::error::{json_type_name, ParseError};

/// Parse a JSON array of exactly `N` finite numbers.
pub fn parse_finite_vec<const N: usize>(value: &Value) -> Result<[f64; N], ParseError> {
    let Value::Array(items) = value else {
        return Err(ParseError::NotAnArray(json_type_name(value)));
    };
    if items.len() != N {
        return Err(ParseError::WrongLength {
            expected: N,
            actual: items.len(),
        });
    }

    let mut out = [0.0; N];
    for (index, (slot, item)) in out.iter_mut().zip(items).enumerate() {
        let x = item.as_f64().ok_or(ParseError::NotANumber { index })?;
        if !x.is_finite() {
            return Err(ParseError::NonFinite { index });
        }
        *slot = x;
    }
    Ok(out)
}

/// Parse a JSON array of exactly `N` finite, strictly positive numbers.
pub fn parse_positive_vec<const N: usize>(value: &Value) -> Result<[f64; N], ParseError> {
    let out = parse_finite_vec::<N>(value)?;
    match out.iter().position(|&x| x <= 0.0) {
        Some(index) => Err(ParseError::NonPositive { index }),
        None => Ok(out),
    }
}

/// Parse a single finite, strictly positive number.
pub fn parse_finite_positive(value: &Value) -> Result<f64, ParseError> {
    let x = value
        .as_f64()
        .ok_or_else(|| ParseError::NotANumberValue(json_type_name(value)))?;
    if x.is_finite() && x > 0.0 {
        Ok(x)
    } else {
        Err(ParseError::NotPositive)
    }
}
