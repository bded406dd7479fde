//! Credential formatters
//!
//! A formatter turns the first [`Credential`] of a relationship into whatever
//! a client library wants: a DSN string, a URL, a connection options struct.
//! The registry is open, so applications register their own next to the
//! built-in `sqldsn`.

use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::credentials::Credential;

/// Name of the built-in MySQL DSN formatter
pub const SQL_DSN: &str = "sqldsn";

/// Type-erased formatter function
pub type Formatter = Arc<dyn Fn(&Credential) -> Box<dyn Any + Send> + Send + Sync>;

/// Thread-safe mapping of formatter name to formatter
pub struct FormatterRegistry {
    formatters: RwLock<HashMap<String, Formatter>>,
}

impl FormatterRegistry {
    /// Create a registry holding the built-in formatters
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register(SQL_DSN, sql_dsn);
        registry
    }

    /// Create a registry with no formatters at all
    pub fn empty() -> Self {
        Self {
            formatters: RwLock::new(HashMap::new()),
        }
    }

    /// Register a formatter, replacing any previous one with the same name
    pub fn register<F, R>(&self, name: impl Into<String>, formatter: F)
    where
        F: Fn(&Credential) -> R + Send + Sync + 'static,
        R: Any + Send,
    {
        let name = name.into();
        let erased: Formatter = Arc::new(move |credential: &Credential| {
            Box::new(formatter(credential)) as Box<dyn Any + Send>
        });

        if self.formatters.write().insert(name.clone(), erased).is_some() {
            log::debug!("Replaced credential formatter {}", name);
        } else {
            log::debug!("Registered credential formatter {}", name);
        }
    }

    /// Look up a formatter by name
    pub fn get(&self, name: &str) -> Option<Formatter> {
        self.formatters.read().get(name).cloned()
    }

    /// Whether a formatter is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.formatters.read().contains_key(name)
    }

    /// Registered formatter names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.formatters.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for FormatterRegistry {
    fn clone(&self) -> Self {
        Self {
            formatters: RwLock::new(self.formatters.read().clone()),
        }
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("formatters", &self.names())
            .finish()
    }
}

/// MySQL DSN in the form used by the Go MySQL driver
///
/// `user:password@tcp(host:port)/path?charset=utf8`
pub fn sql_dsn(credential: &Credential) -> String {
    format!(
        "{}:{}@tcp({}:{})/{}?charset=utf8",
        credential.username, credential.password, credential.host, credential.port, credential.path
    )
}
