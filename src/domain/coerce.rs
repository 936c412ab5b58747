//! Lenient coercion for upstream market data.
//!
//! Every numeric or string field coming off the wire goes through one of
//! these helpers. Absent, null, or wrong-typed values coerce to a default
//! instead of failing deserialization, so one dirty field never drops a
//! whole pair record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Extract an `f64` from a JSON value: numbers pass through, numeric
/// strings are parsed, everything else is `None`.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Deserialize a numeric field that may arrive as a number, a numeric
/// string, null, or garbage.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

/// Deserialize an epoch-milliseconds timestamp with the same tolerance.
pub fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64).map(|v| v as i64))
}

/// Deserialize a non-negative count; null/missing/garbage become 0.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let count = value
        .as_ref()
        .and_then(value_as_f64)
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v as u64)
        .unwrap_or(0);
    Ok(count)
}

/// Deserialize a string field; numbers are stringified, null/missing
/// become the empty string.
pub fn lenient_str<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let s = match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    Ok(s)
}

/// Like [`lenient_str`] but keeps absence distinguishable from presence.
pub fn lenient_opt_str<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let s = match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    Ok(s)
}

/// Read an optional numeric as a plain value, defaulting to zero.
pub fn or_zero(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

/// Treat zero as absent, mirroring the upstream convention that a zero
/// market cap means "no data".
pub fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}
