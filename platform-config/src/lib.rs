//! Typed access to the Platform.sh application environment
//!
//! The platform describes an application through environment variables:
//! plain strings such as `PLATFORM_BRANCH`, and base64-encoded JSON for
//! relationships, variables, routes and the application definition. This
//! crate reads them once into a [`PlatformConfig`].
//!
//! Build hooks get a [`PlatformConfig<Build>`], which only exposes what the
//! platform provides while building. Deploy hooks and the running
//! application get a [`PlatformConfig<Runtime>`], which adds branch and
//! environment details, relationships, routes and credential formatting.
//!
//! ```no_run
//! use platform_config::formatter::SQL_DSN;
//!
//! # fn main() -> platform_config::ConfigResult<()> {
//! let config = platform_config::runtime()?;
//! if config.on_production() {
//!     let dsn: String = config.formatted_credentials_as("database", SQL_DSN)?;
//!     println!("{}", dsn);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod decode;
pub mod env;
pub mod error;
pub mod formatter;
pub mod loader;
pub mod routes;

mod utils;

// Re-export main types
pub use config::{Build, Context, PlatformConfig, Runtime};
pub use credentials::{Credential, CredentialQuery, Relationships};
pub use env::{EnvReader, ProcessEnv};
pub use error::{ConfigError, ConfigResult};
pub use formatter::{FormatterRegistry, SQL_DSN};
pub use loader::{build, runtime, ConfigLoader, DEFAULT_PREFIX};
pub use routes::{Route, RouteType, Routes};
