//! Whitespace normalisation shared by the write paths.

use serde::{Deserialize, Deserializer};

/// `Some(trimmed)` if `value` has any non-whitespace content.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
  value.map(str::trim).filter(|v| !v.is_empty())
}

/// Owned variant of [`non_blank`]; blank strings collapse to `None`.
pub(crate) fn clean(value: Option<&String>) -> Option<String> {
  non_blank(value.map(String::as_str)).map(str::to_owned)
}

/// Deserialise a string field that may arrive as `null`, which reads as empty.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}
