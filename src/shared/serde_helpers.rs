//! Query-string helpers. HTML forms submit untouched fields as `name=`,
//! which reaches these as an empty string.

use std::fmt::Display;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};

/// Deserialize an optional value where an empty or blank string means absent
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

/// Deserialize a flag that is false when absent or blank
pub fn blank_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    empty_string_as_none::<D, bool>(deserializer).map(|flag| flag.unwrap_or(false))
}
