//! Configuration management for VidGate
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use vidgate::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `VIDGATE__<section>__<key>`
//!
//! Examples:
//! - `VIDGATE__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `VIDGATE__SERVER__DOWNLOADS_DIR=/var/lib/vidgate/downloads`
//! - `VIDGATE__EXTRACTOR__TIMEOUT_SECS=300`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/vidgate.toml`.
//! This can be overridden using the `VIDGATE_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{Config, CorsConfig, ExtractorConfig, ServerConfig};
pub use validation::{ValidationError, normalize_origin};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`VIDGATE__*`)
    /// 2. TOML file (default: `config/vidgate.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (invalid origins, zero timeouts, etc.)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
