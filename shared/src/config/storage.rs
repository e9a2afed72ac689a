//! OTP record storage selection

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::env_or;

/// Backend that holds pending OTP records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process memory; lost on restart
    #[default]
    Memory,
    /// A single JSON document on local disk
    File,
    /// Redis keys with native expiry
    Redis,
    /// MySQL table
    Mysql,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "file" | "json" => Ok(StorageBackend::File),
            "redis" => Ok(StorageBackend::Redis),
            "mysql" => Ok(StorageBackend::Mysql),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Redis => write!(f, "redis"),
            StorageBackend::Mysql => write!(f, "mysql"),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Selected backend
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path of the JSON document for the file backend
    #[serde(default = "default_file_path")]
    pub file_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            file_path: default_file_path(),
        }
    }
}

impl StorageConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            backend: env_or("OTP_STORE", StorageBackend::Memory),
            file_path: std::env::var("OTP_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_file_path()),
        }
    }
}

fn default_file_path() -> PathBuf {
    PathBuf::from("otp_records.json")
}
