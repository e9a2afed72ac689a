//! Mail Service Module
//!
//! This module provides mail transports for delivering verification codes
//! and the adapter exposing them to the core verification service.
//!
//! ## Features
//!
//! - **Mail Service Trait**: Common interface for all transports
//! - **Mock Implementation**: In-process outbox and console output for development
//! - **SMTP Support**: Authenticated SMTP over TLS via lettre
//! - **Templates**: Default or custom HTML body with code and validity window
//! - **Security**: Email masking in logs

pub mod gateway_adapter;
pub mod mail_service;
pub mod mock_mail;
pub mod smtp;
pub mod template;

// Re-export commonly used types
pub use gateway_adapter::MailGatewayAdapter;
pub use mail_service::MailService;
pub use mock_mail::{MockMailService, SentMail};
pub use smtp::SmtpMailService;
pub use template::{OtpMailTemplate, DEFAULT_HTML_TEMPLATE};

#[cfg(test)]
mod tests;

use std::sync::Arc;

use om_core::services::verification::MailGatewayTrait;
use om_shared::config::{MailConfig, MailProvider, OtpConfig};

use crate::InfrastructureError;

/// Create a mail service based on configuration
pub fn create_mail_service(config: &MailConfig) -> Result<Arc<dyn MailService>, InfrastructureError> {
    match config.provider {
        MailProvider::Mock => {
            tracing::warn!("Using mock mail service; codes are printed, not sent");
            Ok(Arc::new(MockMailService::new()))
        }
        MailProvider::Smtp => Ok(Arc::new(SmtpMailService::new(config)?)),
    }
}

/// Create the core mail gateway for the configured transport
pub fn create_mail_gateway(
    mail: &MailConfig,
    otp: &OtpConfig,
) -> Result<Arc<dyn MailGatewayTrait>, InfrastructureError> {
    let service = create_mail_service(mail)?;
    Ok(Arc::new(MailGatewayAdapter::new(
        service,
        OtpMailTemplate::from_config(mail, otp),
    )))
}
