//! Types for verification service results

use chrono::{DateTime, Utc};

/// Result of issuing (or resending) a code
#[derive(Clone)]
pub struct IssueResult {
    /// Identity the code was issued to
    pub identity: String,
    /// When the code was issued
    pub issued_at: DateTime<Utc>,
    /// When the code stops being valid
    pub expires_at: DateTime<Utc>,
    /// Message id reported by the mail transport
    pub message_id: String,
    /// The code itself; only populated when the service exposes codes
    pub code: Option<String>,
}

impl std::fmt::Debug for IssueResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueResult")
            .field("identity", &self.identity)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("message_id", &self.message_id)
            .field("code", &self.code.as_ref().map(|_| "<hidden>"))
            .finish()
    }
}
