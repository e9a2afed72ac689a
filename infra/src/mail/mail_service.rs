//! Mail Service Interface
//!
//! Defines the trait for mail transports that deliver rendered messages.

use async_trait::async_trait;

use crate::InfrastructureError;

/// Mail service trait for sending HTML email
///
/// Implementations include:
/// - SMTP via lettre
/// - Mock implementation for development
#[async_trait]
pub trait MailService: Send + Sync {
    /// Send an HTML email
    ///
    /// # Arguments
    ///
    /// * `to` - The recipient's email address
    /// * `subject` - Subject line
    /// * `html_body` - Rendered HTML body
    ///
    /// # Returns
    ///
    /// * `Ok(message_id)` - Unique identifier for the sent message
    /// * `Err(InfrastructureError)` - If sending fails
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<String, InfrastructureError>;

    /// Get the service provider name
    fn provider_name(&self) -> &str;

    /// Check if the service is available
    ///
    /// Default implementation always returns true.
    async fn is_available(&self) -> bool {
        true
    }
}
