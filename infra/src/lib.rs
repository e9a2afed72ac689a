//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for OtpMail. It provides
//! concrete implementations of the ports defined in `om_core` and wires them
//! into a ready-to-use verification service.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Storage**: in-memory and JSON file OTP stores
//! - **Cache**: Redis client and the Redis-backed OTP store
//! - **Database**: MySQL OTP store and verified-identity repository using SQLx
//! - **Mail**: mail transports (mock, SMTP via lettre) and the gateway adapter
//! - **Telemetry**: tracing subscriber installation
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis store support (default)

use anyhow::Context;
use std::sync::Arc;
use tokio::task::JoinHandle;

use om_core::services::clock::{Clock, SystemClock};
use om_core::services::verification::{
    ExpirySweeper, ExpirySweeperConfig, MailGatewayTrait, OtpStoreTrait, VerificationService,
    VerificationServiceConfig,
};
use om_shared::config::{AppConfig, ConfigError};

// Re-export core types for convenience
pub use om_core::errors::*;

/// Cache module - Redis client and Redis-backed OTP store
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Mail module - transports and the core gateway adapter
pub mod mail;

/// Storage module - local OTP stores and backend selection
pub mod storage;

/// Telemetry module - tracing subscriber setup
pub mod telemetry;

/// Verification service as assembled by [`initialize`]
pub type OtpVerificationService = VerificationService<dyn MailGatewayTrait, dyn OtpStoreTrait>;

/// Infrastructure service container
#[derive(Clone)]
pub struct InfrastructureServices {
    /// Ready verification service
    pub verification: Arc<OtpVerificationService>,
    /// The store behind the service
    pub otp_store: Arc<dyn OtpStoreTrait>,
    /// Expiry sweeper, `None` when disabled by configuration
    pub sweeper: Option<Arc<ExpirySweeper<dyn OtpStoreTrait>>>,
}

impl InfrastructureServices {
    /// Start the expiry sweeper in the background if one is configured
    pub fn start_sweeper(&self) -> Option<JoinHandle<()>> {
        self.sweeper
            .as_ref()
            .and_then(|sweeper| sweeper.clone().start_background_task())
    }
}

/// Initialize infrastructure services from configuration
///
/// This function sets up:
/// - The configured OTP store (memory, JSON file, Redis or MySQL)
/// - The verified identity store
/// - The configured mail transport behind the core gateway
/// - The verification service and the expiry sweeper
pub async fn initialize(config: &AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    initialize_with_clock(config, Arc::new(SystemClock)).await
}

/// Same as [`initialize`] with an explicit time source
pub async fn initialize_with_clock(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(
        environment = %config.environment,
        backend = %config.storage.backend,
        "Initializing infrastructure services..."
    );

    config.validate()?;

    let stores = storage::create_stores(config, clock.clone()).await?;
    let mail_gateway = mail::create_mail_gateway(&config.mail, &config.otp)?;

    let verification = VerificationService::new(
        mail_gateway,
        stores.otp.clone(),
        VerificationServiceConfig::from(&config.otp),
    )
    .with_clock(clock)
    .with_verified_identity_store(stores.verified);

    let sweeper_config = ExpirySweeperConfig::from_interval(config.otp.sweep_interval_seconds);
    let sweeper = sweeper_config
        .enabled
        .then(|| Arc::new(ExpirySweeper::new(stores.otp.clone(), sweeper_config)));

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices {
        verification: Arc::new(verification),
        otp_store: stores.otp,
        sweeper,
    })
}

/// Load `.env` and layered configuration, then initialize
pub async fn initialize_from_env() -> anyhow::Result<InfrastructureServices> {
    dotenvy::dotenv().ok(); // Load .env file if present

    let config = AppConfig::load().context("Failed to load configuration")?;
    initialize(&config)
        .await
        .context("Failed to initialize infrastructure services")
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Mail transport error
    #[error("Mail error: {0}")]
    Mail(String),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ConfigError> for InfrastructureError {
    fn from(err: ConfigError) -> Self {
        InfrastructureError::Config(err.to_string())
    }
}

impl From<InfrastructureError> for StorageError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Serialization(e) => StorageError::corrupted(e.to_string()),
            other => StorageError::unavailable(other.to_string()),
        }
    }
}

impl From<InfrastructureError> for DeliveryError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Mail(reason) => DeliveryError::new(reason),
            other => DeliveryError::new(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_errors_map_to_corrupted() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let storage: StorageError = InfrastructureError::from(err).into();
        assert!(matches!(storage, StorageError::Corrupted { .. }));
    }

    #[test]
    fn test_io_errors_map_to_unavailable() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let storage: StorageError = InfrastructureError::from(err).into();
        assert!(matches!(storage, StorageError::Unavailable { .. }));
    }

    #[test]
    fn test_mail_errors_keep_reason() {
        let delivery: DeliveryError = InfrastructureError::Mail("relay refused".into()).into();
        assert_eq!(delivery.reason, "relay refused");
    }

    #[test]
    fn test_config_errors_convert() {
        let err: InfrastructureError = ConfigError::Missing {
            field: "mail.username".to_string(),
        }
        .into();
        assert!(err.to_string().contains("mail.username"));
    }
}
