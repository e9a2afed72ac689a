//! OTP issuance configuration module

use serde::{Deserialize, Serialize};

use super::{env_or, ConfigError};

/// Default number of digits in a generated code
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Longest code any store backend can hold
pub const MAX_CODE_LENGTH: usize = 32;

/// Default lifetime of an issued code (5 minutes)
pub const DEFAULT_TTL_SECONDS: u64 = 300;

/// Default interval between background expiry sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// One-time passcode settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of decimal digits per code
    #[serde(default = "default_code_length")]
    pub code_length: usize,

    /// Seconds a code stays valid after issuance
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Seconds between background sweeps of stale records (0 disables the sweeper)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Return the generated code to the caller of `issue`.
    /// Only for local deployments where the caller performs delivery itself.
    #[serde(default)]
    pub expose_code: bool,

    /// Persist a verified-identity record on successful verification
    #[serde(default = "default_record_verified")]
    pub record_verified_identities: bool,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
            expose_code: false,
            record_verified_identities: default_record_verified(),
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            code_length: env_or("OTP_CODE_LENGTH", DEFAULT_CODE_LENGTH),
            ttl_seconds: env_or("OTP_TTL_SECONDS", DEFAULT_TTL_SECONDS),
            sweep_interval_seconds: env_or(
                "OTP_SWEEP_INTERVAL_SECONDS",
                DEFAULT_SWEEP_INTERVAL_SECONDS,
            ),
            expose_code: env_or("OTP_EXPOSE_CODE", false),
            record_verified_identities: env_or(
                "OTP_RECORD_VERIFIED",
                default_record_verified(),
            ),
        }
    }

    /// Set the code length
    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }

    /// Set the code lifetime in seconds
    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Whole minutes of validity, rounded up, for user-facing messages
    pub fn ttl_minutes(&self) -> u64 {
        self.ttl_seconds.div_ceil(60)
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_length == 0 || self.code_length > MAX_CODE_LENGTH {
            return Err(ConfigError::Invalid {
                field: "otp.code_length".to_string(),
                reason: format!("must be between 1 and {}", MAX_CODE_LENGTH),
            });
        }
        if self.ttl_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "otp.ttl_seconds".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_ttl_seconds() -> u64 {
    DEFAULT_TTL_SECONDS
}

fn default_sweep_interval() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECONDS
}

fn default_record_verified() -> bool {
    true
}
