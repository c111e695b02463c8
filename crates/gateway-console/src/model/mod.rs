//! Gateway configuration domain types: mappings, providers, the root aggregate.

pub mod gateway;
pub mod mapping;
pub mod provider;

pub use gateway::*;
pub use mapping::*;
pub use provider::*;

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` the same as a missing field.
///
/// The gateway encodes empty sequences as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read a stored integer, falling back to `fallback` when it is null, out of
/// range for `T`, or rejected by `valid`.
pub(crate) fn int_or<'de, D, T>(
    deserializer: D,
    valid: impl Fn(&T) -> bool,
    fallback: T,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    Ok(Option::<i64>::deserialize(deserializer)?
        .and_then(|raw| T::try_from(raw).ok())
        .filter(|v| valid(v))
        .unwrap_or(fallback))
}

/// Parse an operator-entered integer, keeping only values accepted by `valid`.
pub(crate) fn parse_lenient<T>(raw: &str, valid: impl Fn(&T) -> bool) -> Option<T>
where
    T: std::str::FromStr,
{
    raw.trim().parse::<T>().ok().filter(|v| valid(v))
}
