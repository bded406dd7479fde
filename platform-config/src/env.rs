//! Environment variable access
//!
//! Every read goes through [`EnvReader`] so that configuration can be
//! extracted from something other than the process environment, which is
//! what the tests do.

use std::collections::HashMap;

/// Source of environment variables
///
/// A missing variable reads as an empty string. Callers treat "unset" and
/// "set to empty" identically.
pub trait EnvReader {
    /// Read a variable, or `""` if it is not set
    fn get(&self, name: &str) -> String;
}

impl<F> EnvReader for F
where
    F: Fn(&str) -> String,
{
    fn get(&self, name: &str) -> String {
        self(name)
    }
}

impl EnvReader for HashMap<String, String> {
    fn get(&self, name: &str) -> String {
        HashMap::get(self, name).cloned().unwrap_or_default()
    }
}

/// Reads from the process environment
///
/// Values that are not valid unicode read as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvReader for ProcessEnv {
    fn get(&self, name: &str) -> String {
        std::env::var(name).unwrap_or_default()
    }
}
