//! Serde helpers shared by the decoded platform types

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as `T::default()`
///
/// The platform writes `null` for values it has nothing for (a service
/// without a password, an unset route flag).
pub(crate) fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value: Option<T> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
