//! Redis-backed OTP store
//!
//! One key per identity (`{prefix}:otp:{identity}`) holding the JSON record.
//! The key's Redis TTL is the record's remaining lifetime plus a configurable
//! stale grace, so an expired code stays observable for a while and can be
//! reported as expired instead of missing. Liveness is still decided against
//! the injected clock, never by Redis expiry alone.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use om_core::domain::entities::OtpRecord;
use om_core::errors::StorageResult;
use om_core::services::clock::Clock;
use om_core::services::verification::OtpStoreTrait;
use om_shared::email::mask_email;

use crate::cache::RedisClient;
use crate::InfrastructureError;

/// Key namespace for OTP records
const OTP_KEY_NAMESPACE: &str = "otp";

/// OTP store keeping one Redis key per identity
pub struct RedisOtpStore {
    /// Redis client for cache operations
    redis_client: RedisClient,
    clock: Arc<dyn Clock>,
}

impl RedisOtpStore {
    pub fn new(redis_client: RedisClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            redis_client,
            clock,
        }
    }

    /// Format Redis key for an identity
    fn format_key(&self, identity: &str) -> String {
        self.redis_client
            .config()
            .make_key(&format!("{}:{}", OTP_KEY_NAMESPACE, identity))
    }

    /// Redis key TTL for a record: remaining lifetime plus stale grace, at least one second
    fn key_ttl_seconds(&self, record: &OtpRecord) -> u64 {
        let remaining = record
            .time_until_expiration(self.clock.now())
            .num_seconds()
            .max(0) as u64;
        (remaining + self.redis_client.config().stale_grace_seconds).max(1)
    }

    fn encode(record: &OtpRecord) -> Result<String, InfrastructureError> {
        Ok(serde_json::to_string(record)?)
    }

    async fn fetch(&self, key: &str) -> Result<Option<(String, OtpRecord)>, InfrastructureError> {
        let Some(raw) = self.redis_client.get(key).await? else {
            return Ok(None);
        };
        let record = serde_json::from_str(&raw)?;
        Ok(Some((raw, record)))
    }
}

#[async_trait]
impl OtpStoreTrait for RedisOtpStore {
    async fn upsert(&self, record: &OtpRecord) -> StorageResult<()> {
        let key = self.format_key(&record.identity);
        let value = Self::encode(record)?;
        let ttl = self.key_ttl_seconds(record);

        self.redis_client.set_with_expiry(&key, &value, ttl).await?;

        debug!(
            identity = %mask_email(&record.identity),
            key_ttl = ttl,
            "Stored OTP record in Redis"
        );
        Ok(())
    }

    async fn get(&self, identity: &str) -> StorageResult<Option<OtpRecord>> {
        let key = self.format_key(identity);
        let Some((raw, record)) = self.fetch(&key).await? else {
            return Ok(None);
        };

        if record.is_live(self.clock.now()) {
            return Ok(Some(record));
        }

        // Stale: evict unless a reissue replaced it concurrently
        self.redis_client.compare_and_delete(&key, &raw).await?;
        debug!(identity = %mask_email(identity), "Evicted stale OTP record");
        Ok(None)
    }

    async fn load(&self, identity: &str) -> StorageResult<Option<OtpRecord>> {
        let key = self.format_key(identity);
        Ok(self.fetch(&key).await?.map(|(_, record)| record))
    }

    async fn delete(&self, identity: &str) -> StorageResult<()> {
        let key = self.format_key(identity);
        self.redis_client.delete(&key).await?;
        Ok(())
    }

    async fn consume(&self, record: &OtpRecord) -> StorageResult<bool> {
        let key = self.format_key(&record.identity);
        let expected = Self::encode(record)?;
        Ok(self.redis_client.compare_and_delete(&key, &expected).await?)
    }

    async fn sweep_expired(&self) -> StorageResult<usize> {
        let pattern = self
            .redis_client
            .config()
            .make_key(&format!("{}:*", OTP_KEY_NAMESPACE));
        let keys = self.redis_client.scan_keys(&pattern).await?;
        let now = self.clock.now();

        let mut removed = 0;
        for key in keys {
            match self.fetch(&key).await {
                Ok(Some((raw, record))) if record.is_expired(now) => {
                    if self.redis_client.compare_and_delete(&key, &raw).await? {
                        removed += 1;
                    }
                }
                Ok(_) => {}
                Err(InfrastructureError::Serialization(e)) => {
                    warn!(key = %key, error = %e, "Skipping undecodable OTP record");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(removed)
    }
}
