//! OTP store persisted as a single JSON document
//!
//! The file holds a JSON array of records. Every operation is a
//! read-modify-write under one async mutex, and writes go to a temporary
//! sibling file that is then renamed over the original, so readers never see
//! a half-written document.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use om_core::domain::entities::OtpRecord;
use om_core::errors::StorageResult;
use om_core::services::clock::Clock;
use om_core::services::verification::OtpStoreTrait;
use om_shared::email::mask_email;

use crate::InfrastructureError;

/// OTP store backed by a JSON file on local disk
pub struct JsonFileOtpStore {
    path: PathBuf,
    /// Serializes every read-modify-write cycle
    lock: Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl JsonFileOtpStore {
    /// Open the store at `path`, creating parent directories as needed
    ///
    /// A missing file is an empty store. A file that does not parse is
    /// reported instead of being overwritten.
    pub async fn open(
        path: impl AsRef<Path>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, InfrastructureError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let store = Self {
            path,
            lock: Mutex::new(()),
            clock,
        };
        let records = store.read_all().await?;

        info!(
            path = %store.path.display(),
            records = records.len(),
            "Opened JSON file OTP store"
        );
        Ok(store)
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<OtpRecord>, InfrastructureError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    async fn write_all(&self, records: &[OtpRecord]) -> Result<(), InfrastructureError> {
        let json = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl OtpStoreTrait for JsonFileOtpStore {
    async fn upsert(&self, record: &OtpRecord) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let now = self.clock.now();
        let mut records = self.read_all().await?;

        // Stale records are pruned on every write
        let before = records.len();
        records.retain(|r| r.identity != record.identity && r.is_live(now));
        let pruned = before - records.len();

        records.push(record.clone());
        self.write_all(&records).await?;

        debug!(
            identity = %mask_email(&record.identity),
            pruned = pruned,
            "Stored OTP record in JSON file"
        );
        Ok(())
    }

    async fn get(&self, identity: &str) -> StorageResult<Option<OtpRecord>> {
        let _guard = self.lock.lock().await;
        let now = self.clock.now();
        let mut records = self.read_all().await?;

        let Some(index) = records.iter().position(|r| r.identity == identity) else {
            return Ok(None);
        };
        if records[index].is_live(now) {
            return Ok(Some(records.swap_remove(index)));
        }

        records.remove(index);
        self.write_all(&records).await?;
        debug!(identity = %mask_email(identity), "Evicted stale OTP record");
        Ok(None)
    }

    async fn load(&self, identity: &str) -> StorageResult<Option<OtpRecord>> {
        let _guard = self.lock.lock().await;
        let records = self.read_all().await?;
        Ok(records.into_iter().find(|r| r.identity == identity))
    }

    async fn delete(&self, identity: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        let before = records.len();
        records.retain(|r| r.identity != identity);
        if records.len() != before {
            self.write_all(&records).await?;
        }
        Ok(())
    }

    async fn consume(&self, record: &OtpRecord) -> StorageResult<bool> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        let Some(index) = records.iter().position(|r| r == record) else {
            return Ok(false);
        };
        records.remove(index);
        self.write_all(&records).await?;
        Ok(true)
    }

    async fn sweep_expired(&self) -> StorageResult<usize> {
        let _guard = self.lock.lock().await;
        let now = self.clock.now();
        let mut records = self.read_all().await?;
        let before = records.len();
        records.retain(|r| r.is_live(now));
        let removed = before - records.len();
        if removed > 0 {
            self.write_all(&records).await?;
        }
        Ok(removed)
    }
}
