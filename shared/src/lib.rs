//! Shared configuration and utilities for the OtpMail workspace
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Email address utilities

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, DatabaseConfig, Environment, LogFormat, LoggingConfig,
    MailConfig, MailProvider, OtpConfig, StorageBackend, StorageConfig,
};
pub use utils::email;
