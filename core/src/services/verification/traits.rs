//! Traits for storage and mail integration

use async_trait::async_trait;

use crate::domain::entities::{OtpRecord, VerifiedIdentity};
use crate::errors::{DeliveryError, StorageResult};

/// Trait for mail gateway integration
#[async_trait]
pub trait MailGatewayTrait: Send + Sync {
    /// Deliver a code to the identity, returning the transport's message id
    async fn deliver(&self, identity: &str, code: &str) -> Result<String, DeliveryError>;
    /// Check whether the identity is an address this gateway can deliver to
    fn is_valid_identity(&self, identity: &str) -> bool;
}

/// Keyed store of pending codes, one record per identity
///
/// Every operation must be atomic per identity.
#[async_trait]
pub trait OtpStoreTrait: Send + Sync {
    /// Insert or replace the record for `record.identity`
    async fn upsert(&self, record: &OtpRecord) -> StorageResult<()>;

    /// Live record for the identity; stale records found here are evicted
    async fn get(&self, identity: &str) -> StorageResult<Option<OtpRecord>>;

    /// Stored record for the identity whether live or stale
    async fn load(&self, identity: &str) -> StorageResult<Option<OtpRecord>>;

    /// Remove the identity's record; no error when absent
    async fn delete(&self, identity: &str) -> StorageResult<()>;

    /// Remove the stored record only if it still equals `record`.
    /// Returns whether this call removed it.
    async fn consume(&self, record: &OtpRecord) -> StorageResult<bool>;

    /// Remove every record whose expiry has passed, returning how many
    async fn sweep_expired(&self) -> StorageResult<usize>;
}

/// Sink for identities that completed verification
#[async_trait]
pub trait VerifiedIdentityStoreTrait: Send + Sync {
    /// Record (or refresh) a verified identity
    async fn record_verified(&self, verified: &VerifiedIdentity) -> StorageResult<()>;
    /// Most recent verification of the identity, if any
    async fn find_verified(&self, identity: &str) -> StorageResult<Option<VerifiedIdentity>>;
}
