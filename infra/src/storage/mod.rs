//! Local OTP stores and backend selection
//!
//! Provides the store implementations that need no external service and the
//! factory choosing a backend from configuration.

pub mod json_file;
pub mod memory;

#[cfg(test)]
mod tests;

pub use json_file::JsonFileOtpStore;
pub use memory::{InMemoryOtpStore, InMemoryVerifiedIdentityStore};

use std::sync::Arc;

use om_core::services::clock::Clock;
use om_core::services::verification::{OtpStoreTrait, VerifiedIdentityStoreTrait};
use om_shared::config::{AppConfig, StorageBackend};

use crate::InfrastructureError;

/// The stores a verification service runs against
pub struct Stores {
    /// Pending OTP records
    pub otp: Arc<dyn OtpStoreTrait>,
    /// Sink for verified identities
    pub verified: Arc<dyn VerifiedIdentityStoreTrait>,
}

/// Create the stores for the configured backend
///
/// The MySQL backend keeps verified identities in its own table; every other
/// backend keeps them in process memory.
pub async fn create_stores(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<Stores, InfrastructureError> {
    let backend = config.storage.backend;
    tracing::info!(backend = %backend, "Creating OTP store");

    match backend {
        StorageBackend::Memory => Ok(Stores {
            otp: Arc::new(InMemoryOtpStore::new(clock)),
            verified: Arc::new(InMemoryVerifiedIdentityStore::new()),
        }),
        StorageBackend::File => {
            let store = JsonFileOtpStore::open(&config.storage.file_path, clock).await?;
            Ok(Stores {
                otp: Arc::new(store),
                verified: Arc::new(InMemoryVerifiedIdentityStore::new()),
            })
        }
        #[cfg(feature = "redis-cache")]
        StorageBackend::Redis => {
            let client = crate::cache::RedisClient::new(config.cache.clone()).await?;
            Ok(Stores {
                otp: Arc::new(crate::cache::RedisOtpStore::new(client, clock)),
                verified: Arc::new(InMemoryVerifiedIdentityStore::new()),
            })
        }
        #[cfg(feature = "mysql")]
        StorageBackend::Mysql => {
            use crate::database::{DatabasePool, MySqlOtpStore, MySqlVerifiedIdentityRepository};

            let pool = DatabasePool::new(config.database.clone()).await?;
            if config.database.auto_migrate {
                pool.run_migrations().await?;
            }
            Ok(Stores {
                otp: Arc::new(MySqlOtpStore::new(pool.get_pool().clone(), clock)),
                verified: Arc::new(MySqlVerifiedIdentityRepository::new(pool.get_pool().clone())),
            })
        }
        #[allow(unreachable_patterns)]
        other => Err(InfrastructureError::Config(format!(
            "Storage backend '{}' is not enabled in this build",
            other
        ))),
    }
}
