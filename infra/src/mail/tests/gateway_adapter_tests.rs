//! Tests for the core gateway adapter

use std::sync::Arc;

use om_core::services::verification::MailGatewayTrait;
use om_shared::config::{MailConfig, MailProvider, OtpConfig};

use crate::mail::{create_mail_gateway, MailGatewayAdapter, MockMailService, OtpMailTemplate};

fn adapter() -> (Arc<MockMailService>, MailGatewayAdapter<MockMailService>) {
    let mock = Arc::new(MockMailService::with_options(false, false));
    let template = OtpMailTemplate::new("Your OTP for verification", None, 5);
    (mock.clone(), MailGatewayAdapter::new(mock, template))
}

#[tokio::test]
async fn test_deliver_renders_code_into_message() {
    let (mock, adapter) = adapter();

    let id = adapter.deliver("a@x.com", "482913").await.unwrap();
    let sent = mock.last_message_to("a@x.com").await.unwrap();

    assert_eq!(sent.message_id, id);
    assert_eq!(sent.subject, "Your OTP for verification");
    assert!(sent.html_body.contains("482913"));
    assert!(sent.html_body.contains("5 minutes"));
}

#[tokio::test]
async fn test_transport_failure_becomes_delivery_error() {
    let (mock, adapter) = adapter();
    mock.set_simulate_failure(true);

    let err = adapter.deliver("a@x.com", "482913").await.unwrap_err();
    assert!(err.reason.contains("Simulated"));
    assert!(!err.to_string().contains("482913"));
}

#[test]
fn test_identity_validation() {
    let (_, adapter) = adapter();
    assert!(adapter.is_valid_identity("a@x.com"));
    assert!(!adapter.is_valid_identity("a@x"));
    assert!(!adapter.is_valid_identity(""));
}

#[test]
fn test_factory_builds_mock_gateway() {
    let mail = MailConfig {
        provider: MailProvider::Mock,
        ..Default::default()
    };
    let gateway = create_mail_gateway(&mail, &OtpConfig::default()).unwrap();
    assert!(gateway.is_valid_identity("a@x.com"));
}

#[test]
fn test_factory_rejects_incomplete_smtp_settings() {
    let mail = MailConfig {
        provider: MailProvider::Smtp,
        ..Default::default()
    };
    assert!(create_mail_gateway(&mail, &OtpConfig::default()).is_err());
}
