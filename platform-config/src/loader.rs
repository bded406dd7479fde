//! Configuration loading from the platform environment

use crate::config::{Build, Context, PlatformConfig, Runtime};
use crate::env::{EnvReader, ProcessEnv};
use crate::error::ConfigResult;

/// Prefix of the variables the platform sets
pub const DEFAULT_PREFIX: &str = "PLATFORM_";

/// Configuration loader with environment variable prefix
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix, used verbatim
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Load the build-time configuration from `env`
    pub fn build<E>(&self, env: &E) -> ConfigResult<PlatformConfig<Build>>
    where
        E: EnvReader + ?Sized,
    {
        self.load(env)
    }

    /// Load the runtime configuration from `env`
    pub fn runtime<E>(&self, env: &E) -> ConfigResult<PlatformConfig<Runtime>>
    where
        E: EnvReader + ?Sized,
    {
        self.load(env)
    }

    /// Load the build-time configuration from the process environment
    pub fn build_from_env(&self) -> ConfigResult<PlatformConfig<Build>> {
        self.build(&ProcessEnv)
    }

    /// Load the runtime configuration from the process environment
    pub fn runtime_from_env(&self) -> ConfigResult<PlatformConfig<Runtime>> {
        self.runtime(&ProcessEnv)
    }

    fn load<C, E>(&self, env: &E) -> ConfigResult<PlatformConfig<C>>
    where
        C: Context,
        E: EnvReader + ?Sized,
    {
        PlatformConfig::from_reader(env, &self.prefix)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Build-time configuration from the process environment, default prefix
pub fn build() -> ConfigResult<PlatformConfig<Build>> {
    ConfigLoader::new().build_from_env()
}

/// Runtime configuration from the process environment, default prefix
pub fn runtime() -> ConfigResult<PlatformConfig<Runtime>> {
    ConfigLoader::new().runtime_from_env()
}
