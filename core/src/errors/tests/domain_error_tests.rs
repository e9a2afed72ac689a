//! Unit tests for domain error bridging

use crate::errors::{DeliveryError, DomainError, StorageError, VerificationError};

#[test]
fn test_storage_error_converts_into_domain_error() {
    let error: DomainError = StorageError::unavailable("connection refused").into();
    assert!(matches!(error, DomainError::Storage(StorageError::Unavailable { .. })));
    assert!(error.is_system_fault());
    assert_eq!(error.to_string(), "Storage unavailable: connection refused");
}

#[test]
fn test_delivery_error_keeps_reason() {
    let error: DomainError = DeliveryError::new("mailbox unavailable").into();
    assert!(error.is_system_fault());
    assert_eq!(error.to_string(), "Delivery failed: mailbox unavailable");
}

#[test]
fn test_verification_outcome_is_not_a_fault() {
    let error: DomainError = VerificationError::Mismatch.into();
    assert!(!error.is_system_fault());
    assert_eq!(error.verification(), Some(VerificationError::Mismatch));
}

#[test]
fn test_verification_messages_do_not_leak_state() {
    assert_eq!(VerificationError::NotFound.to_string(), "No pending verification code");
    assert_eq!(VerificationError::Mismatch.to_string(), "Invalid verification code");
    assert_eq!(VerificationError::Expired.to_string(), "Verification code expired");
}

#[test]
fn test_validation_error_has_no_outcome() {
    let error = DomainError::Validation {
        message: "Invalid email address".to_string(),
    };
    assert_eq!(error.verification(), None);
    assert!(!error.is_system_fault());
}
