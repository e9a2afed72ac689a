//! Error types for OTP storage, delivery and verification
//!
//! Storage and delivery errors are system faults surfaced to the caller so it
//! can decide on retry. Verification errors are the user-facing outcomes of a
//! `verify` call and carry no detail beyond their variant.

use thiserror::Error;

/// Failures of the backing medium behind an OTP store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable: {message}")]
    Unavailable { message: String },

    #[error("Stored data is corrupted: {message}")]
    Corrupted { message: String },
}

impl StorageError {
    /// Backing medium could not be reached or rejected the operation
    pub fn unavailable(message: impl Into<String>) -> Self {
        StorageError::Unavailable {
            message: message.into(),
        }
    }

    /// Stored bytes could not be decoded into a record
    pub fn corrupted(message: impl Into<String>) -> Self {
        StorageError::Corrupted {
            message: message.into(),
        }
    }
}

/// Mail transport failed to hand the code over for delivery
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Delivery failed: {reason}")]
pub struct DeliveryError {
    /// Human-readable reason reported by the transport
    pub reason: String,
}

impl DeliveryError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Outcome of a failed verification
///
/// `NotFound` deliberately covers "never issued", "already consumed" and
/// "expired and evicted".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    #[error("No pending verification code")]
    NotFound,

    #[error("Invalid verification code")]
    Mismatch,

    #[error("Verification code expired")]
    Expired,
}

pub type StorageResult<T> = Result<T, StorageError>;
