//! SMTP mail service using lettre
//!
//! Connects with implicit TLS on port 465 and STARTTLS on any other port,
//! authenticating with the configured credentials.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use om_shared::config::MailConfig;
use om_shared::email::mask_email;

use super::mail_service::MailService;
use crate::InfrastructureError;

/// Port on which the server expects TLS from the first byte
const IMPLICIT_TLS_PORT: u16 = 465;

/// Mail service delivering through an authenticated SMTP relay
pub struct SmtpMailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    host: String,
}

impl SmtpMailService {
    /// Build the transport from mail settings
    ///
    /// No connection is made until the first message is sent.
    pub fn new(config: &MailConfig) -> Result<Self, InfrastructureError> {
        config.validate()?;

        let address: Address = config.sender_address().parse().map_err(|e| {
            InfrastructureError::Config(format!("Invalid sender address: {}", e))
        })?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);

        let builder = if config.smtp_port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        }
        .map_err(|e| InfrastructureError::Config(format!("Invalid SMTP relay: {}", e)))?;

        let mailer = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_seconds)))
            .build();

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            "SMTP mail service configured"
        );

        Ok(Self {
            mailer,
            from,
            host: config.smtp_host.clone(),
        })
    }

    fn message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain())
    }
}

#[async_trait]
impl MailService for SmtpMailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<String, InfrastructureError> {
        let recipient: Mailbox = to.parse().map_err(|e| {
            InfrastructureError::Mail(format!("Invalid recipient {}: {}", mask_email(to), e))
        })?;
        let message_id = self.message_id();

        let email = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| InfrastructureError::Mail(format!("Failed to build message: {}", e)))?;

        debug!(to = %mask_email(to), host = %self.host, "Sending email over SMTP");

        self.mailer.send(email).await.map_err(|e| {
            error!(to = %mask_email(to), error = %e, "SMTP delivery failed");
            InfrastructureError::Mail(format!("SMTP delivery failed: {}", e))
        })?;

        info!(
            target: "mail_service",
            provider = "smtp",
            to = %mask_email(to),
            message_id = %message_id,
            "Email sent"
        );

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "SMTP"
    }

    async fn is_available(&self) -> bool {
        match self.mailer.test_connection().await {
            Ok(ok) => ok,
            Err(e) => {
                error!(host = %self.host, error = %e, "SMTP connection test failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_requires_credentials() {
        let config = MailConfig {
            provider: om_shared::config::MailProvider::Smtp,
            ..Default::default()
        };
        assert!(SmtpMailService::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_builds_with_gmail_defaults() {
        let config = MailConfig::smtp("smtp.gmail.com", "sender@example.com", "app-password");
        let service = SmtpMailService::new(&config).unwrap();

        assert_eq!(service.provider_name(), "SMTP");
        assert_eq!(service.from.email.to_string(), "sender@example.com");
        assert!(service.message_id().ends_with("@example.com>"));
    }

    #[tokio::test]
    async fn test_rejects_invalid_sender() {
        let mut config = MailConfig::smtp("smtp.gmail.com", "sender@example.com", "pw");
        config.from_address = "not an address".to_string();
        assert!(matches!(
            SmtpMailService::new(&config),
            Err(InfrastructureError::Config(_))
        ));
    }
}
