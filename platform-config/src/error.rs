//! Configuration error types

use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The sentinel `APPLICATION_NAME` variable is empty or unset
    #[error("No valid platform found.")]
    InvalidEnvironment,

    /// A complex variable is not valid base64
    #[error("Failed to decode base64 in {variable}: {source}")]
    Encoding {
        variable: String,
        #[source]
        source: base64::DecodeError,
    },

    /// A complex variable decoded to bytes that are not the expected JSON
    #[error("Failed to parse JSON in {variable}: {source}")]
    Decode {
        variable: String,
        #[source]
        source: serde_json::Error,
    },

    /// No relationship with that name
    #[error("No such relationship defined: {0}.")]
    RelationshipNotFound(String),

    /// The relationship exists but has no credential entries
    #[error("No first relationship defined for: {0}.")]
    EmptyRelationship(String),

    /// Credential index past the end of the relationship
    #[error("Relationship {name} has {len} credential(s), index {index} requested")]
    CredentialIndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },

    /// No formatter registered under that name
    #[error("No such credential formatter: {0}")]
    FormatterNotFound(String),

    /// The formatter produced a value of another type than requested
    #[error("Formatter {formatter} did not produce a {expected}")]
    FormatterOutputMismatch {
        formatter: String,
        expected: &'static str,
    },

    /// No route with that id
    #[error("No such route: {0}")]
    RouteNotFound(String),
}

impl ConfigError {
    /// Whether this error is a lookup miss rather than a construction failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ConfigError::RelationshipNotFound(_)
                | ConfigError::EmptyRelationship(_)
                | ConfigError::CredentialIndexOutOfRange { .. }
                | ConfigError::FormatterNotFound(_)
                | ConfigError::RouteNotFound(_)
        )
    }
}
