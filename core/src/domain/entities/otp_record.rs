//! Pending one-time passcode record

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Length of a generated code unless configured otherwise
pub const DEFAULT_CODE_LENGTH: usize = om_shared::config::otp::DEFAULT_CODE_LENGTH;

/// Lifetime of a code unless configured otherwise (5 minutes)
pub const DEFAULT_TTL_SECONDS: u64 = om_shared::config::otp::DEFAULT_TTL_SECONDS;

/// The single outstanding code for an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Identity the code was issued to, exactly as supplied
    pub identity: String,

    /// Fixed-length string of decimal digits
    pub code: String,

    /// When the code was issued
    pub issued_at: DateTime<Utc>,

    /// First instant at which the code is no longer valid
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Create a record issued at `now` that stays live for `ttl`
    pub fn issue(
        identity: impl Into<String>,
        code: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            identity: identity.into(),
            code: code.into(),
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    /// A record is live strictly before its expiry instant
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Inverse of [`OtpRecord::is_live`]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.is_live(now)
    }

    /// Time left before expiry, or zero if already expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}
