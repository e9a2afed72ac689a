//! Configuration module with sub-modules per concern
//!
//! - `otp` - code length, lifetime and sweeper cadence
//! - `mail` - SMTP credentials and message settings
//! - `storage` - which backend keeps pending records
//! - `cache` - Redis connection settings
//! - `database` - MySQL connection settings
//! - `environment` - environment detection and logging configuration

pub mod cache;
pub mod database;
pub mod environment;
pub mod mail;
pub mod otp;
pub mod storage;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use mail::{MailConfig, MailProvider};
pub use otp::OtpConfig;
pub use storage::{StorageBackend, StorageConfig};

/// Prefix for environment variables read by [`AppConfig::load`]
pub const ENV_PREFIX: &str = "OTPMAIL";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration value: {field}")]
    Missing { field: String },

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// OTP issuance settings
    #[serde(default)]
    pub otp: OtpConfig,

    /// Mail delivery settings
    #[serde(default)]
    pub mail: MailConfig,

    /// Record storage selection
    #[serde(default)]
    pub storage: StorageConfig,

    /// Redis configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// MySQL configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            otp: OtpConfig::default(),
            mail: MailConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            otp: OtpConfig::default(),
            mail: MailConfig {
                provider: MailProvider::Smtp,
                ..Default::default()
            },
            storage: StorageConfig {
                backend: StorageBackend::Redis,
                ..Default::default()
            },
            cache: CacheConfig::default(),
            database: DatabaseConfig::default().with_max_connections(50),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from plain environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            otp: OtpConfig::from_env(),
            mail: MailConfig::from_env(),
            storage: StorageConfig::from_env(),
            cache: CacheConfig::from_env(),
            database: DatabaseConfig::from_env(),
            logging: LoggingConfig::for_environment(environment).with_env_overrides(),
        }
    }

    /// Load configuration from the environment's TOML file (if any) layered
    /// under `OTPMAIL__SECTION__KEY` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&environment.config_file()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app: AppConfig = settings.try_deserialize()?;
        app.environment = environment;
        app.validate()?;
        Ok(app)
    }

    /// Check every sub-configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.otp.validate()?;
        self.mail.validate()?;
        Ok(())
    }
}

/// Read and parse an environment variable, falling back to `default`
/// when it is unset or unparsable
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
