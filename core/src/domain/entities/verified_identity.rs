//! Proof that an identity completed verification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Created only as a side effect of a successful verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// The identity that presented the correct code
    pub identity: String,

    /// When the code was accepted
    pub verified_at: DateTime<Utc>,
}

impl VerifiedIdentity {
    pub fn new(identity: impl Into<String>, verified_at: DateTime<Utc>) -> Self {
        Self {
            identity: identity.into(),
            verified_at,
        }
    }
}
