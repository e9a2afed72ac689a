//! In-process OTP store
//!
//! Records live in a map behind an async lock. Every operation takes the lock
//! once, so each is atomic per key and no critical section spans an await.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use om_core::domain::entities::{OtpRecord, VerifiedIdentity};
use om_core::errors::StorageResult;
use om_core::services::clock::Clock;
use om_core::services::verification::{OtpStoreTrait, VerifiedIdentityStoreTrait};
use om_shared::email::mask_email;

/// OTP store held in process memory; contents are lost on restart
pub struct InMemoryOtpStore {
    records: RwLock<HashMap<String, OtpRecord>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryOtpStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of records held, live or stale
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl OtpStoreTrait for InMemoryOtpStore {
    async fn upsert(&self, record: &OtpRecord) -> StorageResult<()> {
        self.records
            .write()
            .await
            .insert(record.identity.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, identity: &str) -> StorageResult<Option<OtpRecord>> {
        let now = self.clock.now();

        {
            let records = self.records.read().await;
            match records.get(identity) {
                None => return Ok(None),
                Some(record) if record.is_live(now) => return Ok(Some(record.clone())),
                Some(_) => {}
            }
        }

        // Stale: evict unless a fresh record replaced it in the meantime
        let mut records = self.records.write().await;
        match records.get(identity) {
            Some(record) if record.is_live(now) => Ok(Some(record.clone())),
            Some(_) => {
                records.remove(identity);
                debug!(identity = %mask_email(identity), "Evicted stale OTP record");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn load(&self, identity: &str) -> StorageResult<Option<OtpRecord>> {
        Ok(self.records.read().await.get(identity).cloned())
    }

    async fn delete(&self, identity: &str) -> StorageResult<()> {
        self.records.write().await.remove(identity);
        Ok(())
    }

    async fn consume(&self, record: &OtpRecord) -> StorageResult<bool> {
        let mut records = self.records.write().await;
        if records.get(&record.identity) == Some(record) {
            records.remove(&record.identity);
            return Ok(true);
        }
        Ok(false)
    }

    async fn sweep_expired(&self) -> StorageResult<usize> {
        let now = self.clock.now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| record.is_live(now));
        Ok(before - records.len())
    }
}

/// Verified identities kept in process memory, latest verification per identity
#[derive(Default)]
pub struct InMemoryVerifiedIdentityStore {
    verified: RwLock<HashMap<String, VerifiedIdentity>>,
}

impl InMemoryVerifiedIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerifiedIdentityStoreTrait for InMemoryVerifiedIdentityStore {
    async fn record_verified(&self, verified: &VerifiedIdentity) -> StorageResult<()> {
        self.verified
            .write()
            .await
            .insert(verified.identity.clone(), verified.clone());
        Ok(())
    }

    async fn find_verified(&self, identity: &str) -> StorageResult<Option<VerifiedIdentity>> {
        Ok(self.verified.read().await.get(identity).cloned())
    }
}
