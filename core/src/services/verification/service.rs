//! Main verification service implementation

use constant_time_eq::constant_time_eq;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use om_shared::email::mask_email;

use crate::domain::entities::{OtpRecord, VerifiedIdentity};
use crate::errors::{DomainError, DomainResult, VerificationError};
use crate::services::clock::{Clock, SystemClock};
use crate::services::code_generator::{CodeGenerator, SecureCodeGenerator};

use super::config::VerificationServiceConfig;
use super::traits::{MailGatewayTrait, OtpStoreTrait, VerifiedIdentityStoreTrait};
use super::types::IssueResult;

/// Verification service driving the issue / verify lifecycle of email codes
///
/// Per identity the service moves between no pending code and exactly one
/// pending code. Issuing always replaces the pending code, a successful
/// verification consumes it, and an expired code is removed the first time
/// a verification observes it.
pub struct VerificationService<M, S>
where
    M: MailGatewayTrait + ?Sized,
    S: OtpStoreTrait + ?Sized,
{
    /// Mail gateway delivering codes
    mail_gateway: Arc<M>,
    /// Store holding pending codes
    otp_store: Arc<S>,
    /// Time source for issuance and expiry
    clock: Arc<dyn Clock>,
    /// Source of new codes
    code_generator: Arc<dyn CodeGenerator>,
    /// Optional sink for verified identities
    verified_store: Option<Arc<dyn VerifiedIdentityStoreTrait>>,
    /// Service configuration
    config: VerificationServiceConfig,
}

impl<M, S> VerificationService<M, S>
where
    M: MailGatewayTrait + ?Sized,
    S: OtpStoreTrait + ?Sized,
{
    /// Create a new verification service using the system clock and the
    /// OS-backed code generator
    ///
    /// # Arguments
    ///
    /// * `mail_gateway` - Mail gateway implementation
    /// * `otp_store` - OTP store implementation
    /// * `config` - Service configuration
    pub fn new(mail_gateway: Arc<M>, otp_store: Arc<S>, config: VerificationServiceConfig) -> Self {
        Self {
            mail_gateway,
            otp_store,
            clock: Arc::new(SystemClock),
            code_generator: Arc::new(SecureCodeGenerator),
            verified_store: None,
            config,
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the code generator
    pub fn with_code_generator(mut self, code_generator: Arc<dyn CodeGenerator>) -> Self {
        self.code_generator = code_generator;
        self
    }

    /// Attach a sink that records every successful verification
    pub fn with_verified_identity_store(
        mut self,
        verified_store: Arc<dyn VerifiedIdentityStoreTrait>,
    ) -> Self {
        self.verified_store = Some(verified_store);
        self
    }

    /// Service configuration
    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Issue a new code for an identity and deliver it
    ///
    /// This method:
    /// 1. Validates the identity with the mail gateway
    /// 2. Generates a new code
    /// 3. Stores it, replacing any pending code for the identity
    /// 4. Delivers it through the mail gateway
    ///
    /// If delivery fails the new code stays stored and `DomainError::Delivery`
    /// is returned; the caller may `redeliver` or issue again.
    ///
    /// # Returns
    ///
    /// * `Ok(IssueResult)` - Issuance details; `code` is only set when exposure is enabled
    /// * `Err(DomainError)` - Validation, storage or delivery failure
    pub async fn issue(&self, identity: &str) -> DomainResult<IssueResult> {
        self.validate_identity(identity)?;

        let code = self.code_generator.generate(self.config.code_length)?;
        let record = OtpRecord::issue(identity, code, self.clock.now(), self.config.ttl());

        self.otp_store.upsert(&record).await.map_err(|e| {
            error!(
                identity = %mask_email(identity),
                error = %e,
                event = "otp_storage_failed",
                "Failed to store verification code"
            );
            DomainError::from(e)
        })?;

        info!(
            identity = %mask_email(identity),
            expires_at = %record.expires_at,
            event = "otp_issued",
            "Issued new verification code"
        );

        let message_id = self.deliver(&record).await?;
        Ok(self.issue_result(&record, message_id))
    }

    /// Resend a code; rotates the code and restarts the validity window
    pub async fn resend(&self, identity: &str) -> DomainResult<IssueResult> {
        debug!(identity = %mask_email(identity), event = "otp_resend", "Resending verification code");
        self.issue(identity).await
    }

    /// Deliver the currently pending code again without rotating it
    ///
    /// Meant for retrying after a delivery failure. Returns
    /// `VerificationError::NotFound` when nothing live is pending.
    pub async fn redeliver(&self, identity: &str) -> DomainResult<IssueResult> {
        let record = self
            .otp_store
            .get(identity)
            .await?
            .ok_or(VerificationError::NotFound)?;

        let message_id = self.deliver(&record).await?;

        info!(
            identity = %mask_email(identity),
            event = "otp_redelivered",
            "Redelivered pending verification code"
        );

        Ok(self.issue_result(&record, message_id))
    }

    /// Verify a presented code
    ///
    /// This method:
    /// 1. Loads the pending record (`NotFound` if none)
    /// 2. Removes it and reports `Expired` if its expiry has passed
    /// 3. Compares codes in constant time (`Mismatch` keeps the record)
    /// 4. Consumes the record so the code cannot be replayed
    /// 5. Records the verified identity when a sink is attached
    ///
    /// # Returns
    ///
    /// * `Ok(VerifiedIdentity)` - The code matched and was consumed
    /// * `Err(DomainError::Verification(_))` - `NotFound`, `Mismatch` or `Expired`
    /// * `Err(DomainError::Storage(_))` - The store failed
    pub async fn verify(&self, identity: &str, presented_code: &str) -> DomainResult<VerifiedIdentity> {
        let Some(record) = self.otp_store.load(identity).await? else {
            debug!(
                identity = %mask_email(identity),
                event = "otp_not_found",
                "No pending verification code"
            );
            return Err(VerificationError::NotFound.into());
        };

        let now = self.clock.now();
        if record.is_expired(now) {
            self.otp_store.consume(&record).await?;
            info!(
                identity = %mask_email(identity),
                expired_at = %record.expires_at,
                event = "otp_expired",
                "Verification code expired and was removed"
            );
            return Err(VerificationError::Expired.into());
        }

        if !Self::constant_time_compare(&record.code, presented_code) {
            warn!(
                identity = %mask_email(identity),
                event = "otp_verification_failed",
                "Verification code mismatch"
            );
            return Err(VerificationError::Mismatch.into());
        }

        // Another verification or a reissue may have replaced the record since it was loaded
        if !self.otp_store.consume(&record).await? {
            debug!(
                identity = %mask_email(identity),
                event = "otp_consumed_concurrently",
                "Verification code was consumed or replaced concurrently"
            );
            return Err(VerificationError::NotFound.into());
        }

        let verified = VerifiedIdentity::new(identity, now);
        if self.config.record_verified_identities {
            if let Some(store) = &self.verified_store {
                store.record_verified(&verified).await.map_err(|e| {
                    error!(
                        identity = %mask_email(identity),
                        error = %e,
                        event = "verified_identity_storage_failed",
                        "Failed to record verified identity"
                    );
                    DomainError::from(e)
                })?;
            }
        }

        info!(
            identity = %mask_email(identity),
            event = "otp_verified_success",
            "Verification code successfully verified"
        );

        Ok(verified)
    }

    /// Drop any pending code for the identity
    pub async fn invalidate(&self, identity: &str) -> DomainResult<()> {
        self.otp_store.delete(identity).await?;
        info!(
            identity = %mask_email(identity),
            event = "otp_invalidated",
            "Invalidated pending verification code"
        );
        Ok(())
    }

    /// Whether a live code is pending for the identity
    pub async fn has_pending(&self, identity: &str) -> DomainResult<bool> {
        Ok(self.otp_store.get(identity).await?.is_some())
    }

    /// Remove every expired record from the store
    pub async fn sweep_expired(&self) -> DomainResult<usize> {
        let removed = self.otp_store.sweep_expired().await?;
        debug!(removed = removed, event = "otp_sweep", "Swept expired verification codes");
        Ok(removed)
    }

    /// Perform constant-time comparison of two codes
    fn constant_time_compare(code_a: &str, code_b: &str) -> bool {
        if code_a.len() != code_b.len() {
            return false;
        }
        constant_time_eq(code_a.as_bytes(), code_b.as_bytes())
    }

    fn validate_identity(&self, identity: &str) -> DomainResult<()> {
        if identity.trim().is_empty() {
            return Err(DomainError::Validation {
                message: "Identity must not be empty".to_string(),
            });
        }
        if !self.mail_gateway.is_valid_identity(identity) {
            return Err(DomainError::Validation {
                message: format!("Invalid email address: {}", mask_email(identity)),
            });
        }
        Ok(())
    }

    async fn deliver(&self, record: &OtpRecord) -> DomainResult<String> {
        self.mail_gateway
            .deliver(&record.identity, &record.code)
            .await
            .map_err(|e| {
                warn!(
                    identity = %mask_email(&record.identity),
                    reason = %e.reason,
                    event = "otp_delivery_failed",
                    "Failed to deliver verification code; the stored code remains valid"
                );
                DomainError::from(e)
            })
    }

    fn issue_result(&self, record: &OtpRecord, message_id: String) -> IssueResult {
        IssueResult {
            identity: record.identity.clone(),
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            message_id,
            code: self.config.expose_code.then(|| record.code.clone()),
        }
    }
}
