//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

pub use types::{DeliveryError, StorageError, StorageResult, VerificationError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Verification(#[from] VerificationError),
}

impl DomainError {
    /// The verification outcome carried by this error, if any
    pub fn verification(&self) -> Option<VerificationError> {
        match self {
            DomainError::Verification(outcome) => Some(*outcome),
            _ => None,
        }
    }

    /// Whether this error is a system fault rather than a user-facing outcome
    pub fn is_system_fault(&self) -> bool {
        matches!(
            self,
            DomainError::Storage(_) | DomainError::Delivery(_) | DomainError::Internal { .. }
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
