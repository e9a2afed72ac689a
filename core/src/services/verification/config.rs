//! Configuration for the verification service

use chrono::Duration;
use om_shared::config::OtpConfig;

use crate::domain::entities::otp_record::{DEFAULT_CODE_LENGTH, DEFAULT_TTL_SECONDS};

/// Longest lifetime honoured for a code
const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Number of digits per generated code
    pub code_length: usize,
    /// Seconds a code stays valid after issuance
    pub ttl_seconds: u64,
    /// Hand the generated code back to the caller of `issue`
    pub expose_code: bool,
    /// Persist a verified-identity record on success when a sink is attached
    pub record_verified_identities: bool,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            expose_code: false,
            record_verified_identities: true,
        }
    }
}

impl VerificationServiceConfig {
    /// Code lifetime as a chrono duration, capped at ten years
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_seconds.min(MAX_TTL_SECONDS) as i64)
    }
}

impl From<&OtpConfig> for VerificationServiceConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            code_length: config.code_length,
            ttl_seconds: config.ttl_seconds,
            expose_code: config.expose_code,
            record_verified_identities: config.record_verified_identities,
        }
    }
}
