//! Domain entities representing core business objects.

pub mod otp_record;
pub mod verified_identity;

// Re-export commonly used types
pub use otp_record::{OtpRecord, DEFAULT_CODE_LENGTH, DEFAULT_TTL_SECONDS};
pub use verified_identity::VerifiedIdentity;
