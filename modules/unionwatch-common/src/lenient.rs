//! Field deserializers for model-written and sparsely stored JSON.
//!
//! Use with `#[serde(default, deserialize_with = "...")]` so a missing field,
//! an explicit `null` and a stray scalar all land on something usable.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Text field. `null` is empty; numbers and booleans are rendered as text.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Any defaultable field where `null` means "absent".
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
