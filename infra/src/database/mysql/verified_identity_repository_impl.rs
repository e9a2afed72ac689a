//! MySQL implementation of the verified identity store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};

use om_core::domain::entities::VerifiedIdentity;
use om_core::errors::StorageResult;
use om_core::services::verification::VerifiedIdentityStoreTrait;

use super::storage_error;

/// Keeps the latest verification per identity in `verified_identities`
pub struct MySqlVerifiedIdentityRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlVerifiedIdentityRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerifiedIdentityStoreTrait for MySqlVerifiedIdentityRepository {
    async fn record_verified(&self, verified: &VerifiedIdentity) -> StorageResult<()> {
        let query = r#"
            INSERT INTO verified_identities (identity, verified_at)
            VALUES (?, ?)
            ON DUPLICATE KEY UPDATE verified_at = VALUES(verified_at)
        "#;

        sqlx::query(query)
            .bind(&verified.identity)
            .bind(verified.verified_at)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to record verified identity", e))?;
        Ok(())
    }

    async fn find_verified(&self, identity: &str) -> StorageResult<Option<VerifiedIdentity>> {
        let row = sqlx::query("SELECT identity, verified_at FROM verified_identities WHERE identity = ?")
            .bind(identity)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to find verified identity", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let identity: String = row
            .try_get("identity")
            .map_err(|e| storage_error("Failed to get identity", e))?;
        let verified_at: DateTime<Utc> = row
            .try_get("verified_at")
            .map_err(|e| storage_error("Failed to get verified_at", e))?;

        Ok(Some(VerifiedIdentity::new(identity, verified_at)))
    }
}
