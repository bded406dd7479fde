//! Simple configuration demo
//!
//! Run it with the platform variables set, for instance:
//!
//! ```sh
//! PLATFORM_APPLICATION_NAME=app PLATFORM_ENVIRONMENT=main PLATFORM_BRANCH=main \
//!     cargo run -p platform-config --example simple_config_demo
//! ```

use platform_config::{ConfigError, ConfigResult, Credential, SQL_DSN};

fn main() -> ConfigResult<()> {
    env_logger::init();

    let config = match platform_config::runtime() {
        Ok(config) => config,
        Err(ConfigError::InvalidEnvironment) => {
            println!("Not running on the platform, nothing to show");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    println!("Application: {}", config.application_name());
    println!("   Project: {}", config.project());
    println!("   Branch: {} (production: {})", config.branch(), config.on_production());
    println!("   Listening on port {}", config.port());

    for name in config.relationships().keys() {
        println!("   Relationship: {}", name);
    }

    match config.formatted_credentials_as::<String>("database", SQL_DSN) {
        Ok(dsn) => println!("   Database DSN: {}", dsn),
        Err(e) if e.is_not_found() => println!("   No database relationship"),
        Err(e) => return Err(e),
    }

    config.register_formatter("address", |c: &Credential| format!("{}:{}", c.host, c.port));
    if let Ok(address) = config.formatted_credentials_as::<String>("cache", "address") {
        println!("   Cache at {}", address);
    }

    Ok(())
}
