//! MySQL implementation of the OTP store.
//!
//! One row per identity in `otp_records`. Reissue is an upsert on the primary
//! key, and consume is a `DELETE` conditioned on the full record so a verify
//! racing a reissue cannot remove the newer code.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySqlPool, Row};
use std::sync::Arc;
use tracing::debug;

use om_core::domain::entities::OtpRecord;
use om_core::errors::StorageResult;
use om_core::services::clock::Clock;
use om_core::services::verification::OtpStoreTrait;
use om_shared::email::mask_email;

use super::storage_error;

/// MySQL implementation of OtpStoreTrait
pub struct MySqlOtpStore {
    /// Database connection pool
    pool: MySqlPool,
    clock: Arc<dyn Clock>,
}

impl MySqlOtpStore {
    pub fn new(pool: MySqlPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Convert database row to OtpRecord entity
    fn row_to_record(row: &MySqlRow) -> Result<OtpRecord, sqlx::Error> {
        Ok(OtpRecord {
            identity: row.try_get("identity")?,
            code: row.try_get("code")?,
            issued_at: row.try_get::<DateTime<Utc>, _>("issued_at")?,
            expires_at: row.try_get::<DateTime<Utc>, _>("expires_at")?,
        })
    }

    /// Delete the row only if it still holds exactly `record`
    async fn delete_exact(&self, record: &OtpRecord) -> StorageResult<bool> {
        let query = r#"
            DELETE FROM otp_records
            WHERE identity = ? AND code = ? AND issued_at = ? AND expires_at = ?
        "#;

        let result = sqlx::query(query)
            .bind(&record.identity)
            .bind(&record.code)
            .bind(record.issued_at)
            .bind(record.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete OTP record", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OtpStoreTrait for MySqlOtpStore {
    async fn upsert(&self, record: &OtpRecord) -> StorageResult<()> {
        let query = r#"
            INSERT INTO otp_records (identity, code, issued_at, expires_at)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                code = VALUES(code),
                issued_at = VALUES(issued_at),
                expires_at = VALUES(expires_at)
        "#;

        sqlx::query(query)
            .bind(&record.identity)
            .bind(&record.code)
            .bind(record.issued_at)
            .bind(record.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to store OTP record", e))?;

        debug!(identity = %mask_email(&record.identity), "Stored OTP record in MySQL");
        Ok(())
    }

    async fn get(&self, identity: &str) -> StorageResult<Option<OtpRecord>> {
        let Some(record) = self.load(identity).await? else {
            return Ok(None);
        };
        if record.is_live(self.clock.now()) {
            return Ok(Some(record));
        }

        self.delete_exact(&record).await?;
        debug!(identity = %mask_email(identity), "Evicted stale OTP record");
        Ok(None)
    }

    async fn load(&self, identity: &str) -> StorageResult<Option<OtpRecord>> {
        let query = r#"
            SELECT identity, code, issued_at, expires_at
            FROM otp_records
            WHERE identity = ?
        "#;

        let row = sqlx::query(query)
            .bind(identity)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to load OTP record", e))?;

        row.as_ref()
            .map(Self::row_to_record)
            .transpose()
            .map_err(|e| storage_error("Failed to decode OTP record", e))
    }

    async fn delete(&self, identity: &str) -> StorageResult<()> {
        sqlx::query("DELETE FROM otp_records WHERE identity = ?")
            .bind(identity)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete OTP record", e))?;
        Ok(())
    }

    async fn consume(&self, record: &OtpRecord) -> StorageResult<bool> {
        self.delete_exact(record).await
    }

    async fn sweep_expired(&self) -> StorageResult<usize> {
        let result = sqlx::query("DELETE FROM otp_records WHERE expires_at <= ?")
            .bind(self.clock.now())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to sweep expired OTP records", e))?;

        Ok(result.rows_affected() as usize)
    }
}
