//! Decoding of the base64-encoded JSON variables

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;

use crate::env::EnvReader;
use crate::error::{ConfigError, ConfigResult};

/// Read `name` and decode it as base64 JSON into `T`
///
/// An empty or unset variable yields `T::default()`.
pub fn decode_var<T, E>(env: &E, name: &str) -> ConfigResult<T>
where
    T: DeserializeOwned + Default,
    E: EnvReader + ?Sized,
{
    decode_value(name, &env.get(name))
}

/// Decode an already read variable value
///
/// Line breaks inside the base64 text are skipped. A JSON `null` document
/// yields `T::default()`, the same as an empty variable.
pub fn decode_value<T>(name: &str, raw: &str) -> ConfigResult<T>
where
    T: DeserializeOwned + Default,
{
    let unwrapped: String = raw.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    let bytes = STANDARD.decode(unwrapped.trim()).map_err(|source| {
        log::warn!("{} is not valid base64: {}", name, source);
        ConfigError::Encoding {
            variable: name.to_string(),
            source,
        }
    })?;

    if bytes.is_empty() {
        log::debug!("{} is empty, using default", name);
        return Ok(T::default());
    }

    let value: Option<T> = serde_json::from_slice(&bytes).map_err(|source| {
        log::warn!("{} does not contain the expected JSON: {}", name, source);
        ConfigError::Decode {
            variable: name.to_string(),
            source,
        }
    })?;

    log::debug!("Decoded {} ({} bytes)", name, bytes.len());
    Ok(value.unwrap_or_default())
}
