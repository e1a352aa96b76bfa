//! Application configuration module
//!
//! Provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with
//! the `STOCKLINK` prefix and nested values use double underscores as
//! separators. Every field has a default, so a bare environment points
//! the client at a local inventory service.
//!
//! # Example
//!
//! ```no_run
//! use stocklink::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("push channel at {}", config.push.ws_url(&config.api.base_url));
//! ```

mod api;
mod error;
mod push;

pub use api::ApiConfig;
pub use error::{ConfigError, ValidationError};
pub use push::PushConfig;

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// REST boundary (base URL, request timeout)
    #[serde(default)]
    pub api: ApiConfig,

    /// Push channel (path, reconnect delay)
    #[serde(default)]
    pub push: PushConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with the `STOCKLINK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `STOCKLINK__API__BASE_URL=http://inventory:8000` -> `api.base_url`
    /// - `STOCKLINK__PUSH__RECONNECT_DELAY_MS=5000` -> `push.reconnect_delay_ms`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("STOCKLINK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.api.validate()?;
        self.push.validate()?;
        Ok(())
    }
}
