//! MySQL implementations of the core storage traits

mod otp_store_impl;
mod verified_identity_repository_impl;

pub use otp_store_impl::MySqlOtpStore;
pub use verified_identity_repository_impl::MySqlVerifiedIdentityRepository;

use om_core::errors::StorageError;

use crate::InfrastructureError;

/// Log a failed query and convert it into a storage error
pub(crate) fn storage_error(context: &str, err: sqlx::Error) -> StorageError {
    tracing::error!(error = %err, "{}", context);
    match err {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StorageError::corrupted(format!("{}: {}", context, err))
        }
        other => InfrastructureError::Database(other).into(),
    }
}
