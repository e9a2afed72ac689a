//! Mail Gateway Adapter
//!
//! Implements the core `MailGatewayTrait` on top of any infrastructure
//! `MailService`, rendering the code into the configured template.

use async_trait::async_trait;
use std::sync::Arc;

use om_core::errors::DeliveryError;
use om_core::services::verification::MailGatewayTrait;
use om_shared::email::is_valid_email;

use super::mail_service::MailService;
use super::template::OtpMailTemplate;

/// Adapter that implements the core MailGatewayTrait for a mail service
pub struct MailGatewayAdapter<M: MailService + ?Sized> {
    inner: Arc<M>,
    template: OtpMailTemplate,
}

impl<M: MailService + ?Sized> MailGatewayAdapter<M> {
    pub fn new(inner: Arc<M>, template: OtpMailTemplate) -> Self {
        Self { inner, template }
    }

    /// The wrapped mail service
    pub fn inner(&self) -> &Arc<M> {
        &self.inner
    }
}

#[async_trait]
impl<M: MailService + ?Sized> MailGatewayTrait for MailGatewayAdapter<M> {
    async fn deliver(&self, identity: &str, code: &str) -> Result<String, DeliveryError> {
        let body = self.template.render(code);
        self.inner
            .send_email(identity, self.template.subject(), &body)
            .await
            .map_err(DeliveryError::from)
    }

    fn is_valid_identity(&self, identity: &str) -> bool {
        is_valid_email(identity)
    }
}
