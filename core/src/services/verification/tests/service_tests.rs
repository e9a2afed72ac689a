//! Unit tests for verification service

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

use crate::errors::{DomainError, VerificationError};
use crate::services::clock::{Clock, ManualClock};
use crate::services::verification::{
    VerificationService, VerificationServiceConfig, VerifiedIdentityStoreTrait,
};

use super::mocks::{
    MockMailGateway, MockOtpStore, MockVerifiedIdentityStore, ScriptedCodeGenerator,
};

struct Harness {
    clock: Arc<ManualClock>,
    mail: Arc<MockMailGateway>,
    store: Arc<MockOtpStore>,
    service: VerificationService<MockMailGateway, MockOtpStore>,
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn harness_with(config: VerificationServiceConfig, codes: Option<&[&str]>) -> Harness {
    let clock = Arc::new(ManualClock::new(t0()));
    let mail = Arc::new(MockMailGateway::new(false));
    let store = Arc::new(MockOtpStore::new(clock.clone()));

    let mut service = VerificationService::new(mail.clone(), store.clone(), config)
        .with_clock(clock.clone());
    if let Some(codes) = codes {
        service = service.with_code_generator(Arc::new(ScriptedCodeGenerator::new(codes)));
    }

    Harness {
        clock,
        mail,
        store,
        service,
    }
}

fn harness() -> Harness {
    harness_with(VerificationServiceConfig::default(), None)
}

fn outcome(error: DomainError) -> VerificationError {
    error.verification().expect("expected a verification outcome")
}

#[tokio::test]
async fn test_issue_stores_and_delivers() {
    let h = harness();

    let result = h.service.issue("a@x.com").await.unwrap();
    assert_eq!(result.identity, "a@x.com");
    assert_eq!(result.issued_at, t0());
    assert_eq!(result.expires_at, t0() + Duration::seconds(300));
    assert!(result.message_id.starts_with("mock-msg-"));

    let stored = h.store.stored("a@x.com").unwrap();
    assert_eq!(stored.code.len(), 6);
    assert!(stored.code.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(h.mail.last_code_for("a@x.com"), Some(stored.code));
}

#[tokio::test]
async fn test_issue_hides_code_by_default() {
    let h = harness();
    let result = h.service.issue("a@x.com").await.unwrap();
    assert!(result.code.is_none());
    assert!(!format!("{:?}", result).contains(&h.store.stored("a@x.com").unwrap().code));
}

#[tokio::test]
async fn test_issue_exposes_code_when_enabled() {
    let config = VerificationServiceConfig {
        expose_code: true,
        ..Default::default()
    };
    let h = harness_with(config, Some(&["482913"]));

    let result = h.service.issue("a@x.com").await.unwrap();
    assert_eq!(result.code.as_deref(), Some("482913"));
}

#[tokio::test]
async fn test_issue_uses_configured_length_and_ttl() {
    let config = VerificationServiceConfig {
        code_length: 8,
        ttl_seconds: 60,
        ..Default::default()
    };
    let h = harness_with(config, None);

    let result = h.service.issue("a@x.com").await.unwrap();
    assert_eq!(result.expires_at, t0() + Duration::seconds(60));
    assert_eq!(h.store.stored("a@x.com").unwrap().code.len(), 8);
}

#[tokio::test]
async fn test_issue_rejects_invalid_identity() {
    let h = harness();

    let result = h.service.issue("not-an-email").await;
    assert!(matches!(result, Err(DomainError::Validation { .. })));

    let result = h.service.issue("   ").await;
    assert!(matches!(result, Err(DomainError::Validation { .. })));

    assert_eq!(h.mail.sent_count(), 0);
}

#[tokio::test]
async fn test_issue_storage_failure_is_surfaced() {
    let h = harness();
    h.store.set_should_fail(true);

    let result = h.service.issue("a@x.com").await;
    assert!(matches!(result, Err(DomainError::Storage(_))));
    assert_eq!(h.mail.sent_count(), 0);
}

#[tokio::test]
async fn test_delivery_failure_keeps_code_valid() {
    let h = harness_with(VerificationServiceConfig::default(), Some(&["111222"]));
    h.mail.set_should_fail(true);

    let result = h.service.issue("a@x.com").await;
    assert!(matches!(result, Err(DomainError::Delivery(_))));
    assert!(h.store.contains("a@x.com"));

    // The committed code still verifies
    let verified = h.service.verify("a@x.com", "111222").await.unwrap();
    assert_eq!(verified.identity, "a@x.com");
}

#[tokio::test]
async fn test_redeliver_sends_same_code() {
    let h = harness_with(VerificationServiceConfig::default(), Some(&["111222", "333444"]));
    h.mail.set_should_fail(true);
    assert!(h.service.issue("a@x.com").await.is_err());

    h.mail.set_should_fail(false);
    let result = h.service.redeliver("a@x.com").await.unwrap();
    assert_eq!(result.expires_at, t0() + Duration::seconds(300));
    assert_eq!(h.mail.last_code_for("a@x.com").as_deref(), Some("111222"));

    assert!(h.service.verify("a@x.com", "111222").await.is_ok());
}

#[tokio::test]
async fn test_redeliver_without_pending_code() {
    let h = harness();
    let err = h.service.redeliver("a@x.com").await.unwrap_err();
    assert_eq!(outcome(err), VerificationError::NotFound);
}

#[tokio::test]
async fn test_verify_never_issued_is_not_found() {
    let h = harness();
    for code in ["000000", "123456", ""] {
        let err = h.service.verify("nobody@x.com", code).await.unwrap_err();
        assert_eq!(outcome(err), VerificationError::NotFound);
    }
}

#[tokio::test]
async fn test_verify_succeeds_exactly_once() {
    let h = harness_with(VerificationServiceConfig::default(), Some(&["482913"]));
    h.service.issue("a@x.com").await.unwrap();

    h.clock.advance(Duration::seconds(299));
    let verified = h.service.verify("a@x.com", "482913").await.unwrap();
    assert_eq!(verified.identity, "a@x.com");
    assert_eq!(verified.verified_at, t0() + Duration::seconds(299));
    assert!(!h.store.contains("a@x.com"));

    let err = h.service.verify("a@x.com", "482913").await.unwrap_err();
    assert_eq!(outcome(err), VerificationError::NotFound);
}

#[tokio::test]
async fn test_mismatch_keeps_record() {
    let h = harness_with(VerificationServiceConfig::default(), Some(&["482913"]));
    h.service.issue("a@x.com").await.unwrap();

    let err = h.service.verify("a@x.com", "000000").await.unwrap_err();
    assert!(!err.to_string().contains("482913"));
    assert_eq!(outcome(err), VerificationError::Mismatch);
    assert!(h.store.contains("a@x.com"));

    // Wrong length is a mismatch too
    let err = h.service.verify("a@x.com", "48291").await.unwrap_err();
    assert_eq!(outcome(err), VerificationError::Mismatch);

    assert!(h.service.verify("a@x.com", "482913").await.is_ok());
}

#[tokio::test]
async fn test_expired_code_is_reported_and_removed() {
    let h = harness_with(VerificationServiceConfig::default(), Some(&["765432"]));
    h.service.issue("b@x.com").await.unwrap();

    h.clock.advance(Duration::seconds(301));
    let err = h.service.verify("b@x.com", "765432").await.unwrap_err();
    assert_eq!(outcome(err), VerificationError::Expired);
    assert!(!h.store.contains("b@x.com"));

    let err = h.service.verify("b@x.com", "765432").await.unwrap_err();
    assert_eq!(outcome(err), VerificationError::NotFound);
}

#[tokio::test]
async fn test_expiry_boundary_is_exclusive() {
    let h = harness_with(VerificationServiceConfig::default(), Some(&["765432"]));
    h.service.issue("b@x.com").await.unwrap();

    h.clock.advance(Duration::seconds(300));
    let err = h.service.verify("b@x.com", "765432").await.unwrap_err();
    assert_eq!(outcome(err), VerificationError::Expired);
}

#[tokio::test]
async fn test_expired_with_wrong_code_reports_expired() {
    let h = harness_with(VerificationServiceConfig::default(), Some(&["765432"]));
    h.service.issue("b@x.com").await.unwrap();

    h.clock.advance(Duration::minutes(10));
    let err = h.service.verify("b@x.com", "000000").await.unwrap_err();
    assert_eq!(outcome(err), VerificationError::Expired);
}

#[tokio::test]
async fn test_reissue_invalidates_previous_code() {
    let h = harness_with(VerificationServiceConfig::default(), Some(&["111111", "222222"]));
    h.service.issue("a@x.com").await.unwrap();

    h.clock.advance(Duration::seconds(200));
    let second = h.service.resend("a@x.com").await.unwrap();
    assert_eq!(second.expires_at, t0() + Duration::seconds(500));

    let err = h.service.verify("a@x.com", "111111").await.unwrap_err();
    assert_eq!(outcome(err), VerificationError::Mismatch);

    // The rotated code outlives the first window
    h.clock.advance(Duration::seconds(250));
    assert!(h.service.verify("a@x.com", "222222").await.is_ok());
}

#[tokio::test]
async fn test_invalidate_removes_pending_code() {
    let h = harness_with(VerificationServiceConfig::default(), Some(&["482913"]));
    h.service.issue("a@x.com").await.unwrap();
    assert!(h.service.has_pending("a@x.com").await.unwrap());

    h.service.invalidate("a@x.com").await.unwrap();
    assert!(!h.service.has_pending("a@x.com").await.unwrap());

    let err = h.service.verify("a@x.com", "482913").await.unwrap_err();
    assert_eq!(outcome(err), VerificationError::NotFound);

    // Idempotent
    h.service.invalidate("a@x.com").await.unwrap();
}

#[tokio::test]
async fn test_has_pending_is_false_once_stale() {
    let h = harness();
    h.service.issue("a@x.com").await.unwrap();

    h.clock.advance(Duration::seconds(300));
    assert!(!h.service.has_pending("a@x.com").await.unwrap());
    // Lazy eviction removed the stale record
    assert!(!h.store.contains("a@x.com"));
}

#[tokio::test]
async fn test_identities_are_independent_and_case_sensitive() {
    let h = harness_with(VerificationServiceConfig::default(), Some(&["111111", "222222"]));
    h.service.issue("a@x.com").await.unwrap();
    h.service.issue("A@x.com").await.unwrap();

    let err = h.service.verify("a@x.com", "222222").await.unwrap_err();
    assert_eq!(outcome(err), VerificationError::Mismatch);

    assert!(h.service.verify("A@x.com", "222222").await.is_ok());
    assert!(h.service.verify("a@x.com", "111111").await.is_ok());
}

#[tokio::test]
async fn test_verify_records_verified_identity() {
    let h = harness_with(VerificationServiceConfig::default(), Some(&["482913"]));
    let verified_store = Arc::new(MockVerifiedIdentityStore::default());
    let service = h.service.with_verified_identity_store(verified_store.clone());

    service.issue("a@x.com").await.unwrap();
    service.verify("a@x.com", "482913").await.unwrap();

    let found = verified_store.find_verified("a@x.com").await.unwrap().unwrap();
    assert_eq!(found.verified_at, h.clock.now());
}

#[tokio::test]
async fn test_verified_identity_recording_can_be_disabled() {
    let config = VerificationServiceConfig {
        record_verified_identities: false,
        ..Default::default()
    };
    let h = harness_with(config, Some(&["482913"]));
    let verified_store = Arc::new(MockVerifiedIdentityStore::default());
    let service = h.service.with_verified_identity_store(verified_store.clone());

    service.issue("a@x.com").await.unwrap();
    service.verify("a@x.com", "482913").await.unwrap();

    assert!(verified_store.verified.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_verify_storage_failure_is_surfaced() {
    let h = harness();
    h.service.issue("a@x.com").await.unwrap();
    h.store.set_should_fail(true);

    let result = h.service.verify("a@x.com", "000000").await;
    assert!(matches!(result, Err(DomainError::Storage(_))));
}

#[tokio::test]
async fn test_sweep_expired_counts_removed_records() {
    let h = harness();
    h.service.issue("a@x.com").await.unwrap();
    h.service.issue("b@x.com").await.unwrap();
    h.clock.advance(Duration::seconds(200));
    h.service.issue("c@x.com").await.unwrap();

    h.clock.advance(Duration::seconds(150));
    assert_eq!(h.service.sweep_expired().await.unwrap(), 2);
    assert!(h.store.contains("c@x.com"));
    assert_eq!(h.service.sweep_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn test_concurrent_verifies_succeed_once() {
    let h = harness_with(VerificationServiceConfig::default(), Some(&["482913"]));
    h.service.issue("a@x.com").await.unwrap();
    let service = Arc::new(h.service);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.verify("a@x.com", "482913").await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert_eq!(outcome(e), VerificationError::NotFound),
        }
    }
    assert_eq!(successes, 1);
}
