//! Numeric coercion for loosely typed upstream fields.
//!
//! GraphQL numeric scalars sometimes arrive as strings ("-7.5") and nullable
//! fields arrive as `null`. Everything is coerced once, at deserialization,
//! so analyzers only ever see `Option<f64>` / `Option<i64>`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Convert a JSON value to a finite `f64`.
///
/// Returns `None` for null, non-numeric strings, booleans, arrays, objects and
/// non-finite values. Never panics.
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Convert a JSON value to an integer. Fractional values are rejected.
pub fn to_integer(value: &Value) -> Option<i64> {
    if let Value::Number(n) = value {
        if let Some(i) = n.as_i64() {
            return Some(i);
        }
    }
    let n = to_number(value)?;
    (n.fract() == 0.0 && n.abs() < i64::MAX as f64).then_some(n as i64)
}

/// Serde adapter: lenient optional float.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(to_number))
}

/// Serde adapter: lenient optional integer.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(to_integer))
}

/// Serde adapter: lenient optional string. Numbers are stringified, other
/// shapes become `None`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Serde adapter: `null` (or a missing field, with `#[serde(default)]`) becomes `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
