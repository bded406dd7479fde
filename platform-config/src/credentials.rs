//! Relationship credentials

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::null_to_default;

/// Relationship name to its credential entries, primary first
pub type Relationships = HashMap<String, Vec<Credential>>;

/// Connection details for one service endpoint
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Credential {
    #[serde(deserialize_with = "null_to_default")]
    pub host: String,

    #[serde(deserialize_with = "null_to_default")]
    pub username: String,

    #[serde(deserialize_with = "null_to_default")]
    pub password: String,

    #[serde(deserialize_with = "null_to_default")]
    pub ip: String,

    /// Database name for SQL services
    #[serde(deserialize_with = "null_to_default")]
    pub path: String,

    #[serde(deserialize_with = "null_to_default")]
    pub scheme: String,

    #[serde(deserialize_with = "null_to_default")]
    pub port: u16,

    #[serde(deserialize_with = "null_to_default")]
    pub query: CredentialQuery,

    /// Keys the platform sends that have no dedicated field
    /// (`service`, `rel`, `cluster`, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Replica information attached to a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialQuery {
    #[serde(deserialize_with = "null_to_default")]
    pub is_master: bool,
}

impl Credential {
    /// Whether this endpoint is the primary of a replicated service
    pub fn is_master(&self) -> bool {
        self.query.is_master
    }

    /// Look up one of the keys without a dedicated field
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}
