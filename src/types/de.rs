//! Forgiving deserializers for tracker payloads.
//!
//! Jira returns `null`, missing keys, or differently shaped objects for the
//! same field depending on project configuration. These helpers turn any of
//! those into the field's default instead of failing the whole page.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize an optional nested object, yielding `None` if it is missing,
/// `null`, or does not match the expected shape.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Deserialize a list, keeping only the elements that match the expected
/// shape. `null` or a non-array value yields an empty list.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(CountedVec::deserialize(deserializer)?.items)
}

/// A leniently parsed list that remembers how many elements the server sent,
/// including the ones dropped for having the wrong shape.
#[derive(Debug)]
pub struct CountedVec<T> {
    pub items: Vec<T>,
    pub received: usize,
}

impl<T> Default for CountedVec<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            received: 0,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for CountedVec<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Value::Array(raw) = Value::deserialize(deserializer)? else {
            return Ok(Self::default());
        };

        let received = raw.len();
        let items = raw
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        Ok(Self { items, received })
    }
}

/// Deserialize a string that may be `null`, treating `null` as empty.
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Coerce a loosely typed counter into a non-negative integer.
///
/// Accepts integers, floats and numeric strings such as `"3.0"`; anything
/// else (including negatives) is treated as zero.
pub fn coerce_count(value: Option<&Value>) -> u64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() && n > 0.0 => n.trunc() as u64,
        _ => 0,
    }
}
