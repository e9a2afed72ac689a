//! Mock Mail Service Implementation
//!
//! A mock implementation of the mail service for development and testing.
//! Messages are kept in an in-process outbox and optionally printed to the
//! console instead of being sent.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use om_shared::email::{is_valid_email, mask_email};

use super::mail_service::MailService;
use crate::InfrastructureError;

/// A message accepted by the mock service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub message_id: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Mock mail service for development and testing
///
/// This implementation:
/// - Validates recipient addresses
/// - Generates mock message IDs
/// - Keeps every accepted message in an outbox
/// - Can simulate transport failures
#[derive(Clone)]
pub struct MockMailService {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Accepted messages, oldest first
    outbox: Arc<RwLock<Vec<SentMail>>>,
    /// Whether to simulate failures
    simulate_failure: Arc<AtomicBool>,
    /// Whether to print messages to console
    console_output: bool,
}

impl MockMailService {
    /// Create a new mock mail service
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    /// Create a mock service with configurable options
    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            outbox: Arc::new(RwLock::new(Vec::new())),
            simulate_failure: Arc::new(AtomicBool::new(simulate_failure)),
            console_output,
        }
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }

    /// Every accepted message, oldest first
    pub async fn sent_messages(&self) -> Vec<SentMail> {
        self.outbox.read().await.clone()
    }

    /// Most recent message sent to `to`
    pub async fn last_message_to(&self, to: &str) -> Option<SentMail> {
        self.outbox
            .read()
            .await
            .iter()
            .rev()
            .find(|m| m.to == to)
            .cloned()
    }
}

impl Default for MockMailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailService for MockMailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<String, InfrastructureError> {
        if !is_valid_email(to) {
            return Err(InfrastructureError::Mail(format!(
                "Invalid email address: {}",
                mask_email(to)
            )));
        }

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(
                "Mock mail service simulating failure for: {}",
                mask_email(to)
            );
            return Err(InfrastructureError::Mail(
                "Simulated mail sending failure".to_string(),
            ));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        self.outbox.write().await.push(SentMail {
            message_id: message_id.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });

        if self.console_output {
            // Console output for development - show full message
            println!("\n{}", "=".repeat(60));
            println!("MOCK MAIL SERVICE - MESSAGE #{}", count);
            println!("{}", "=".repeat(60));
            println!("To: {}", to);
            println!("Subject: {}", subject);
            println!("Message ID: {}", message_id);
            println!("{}", html_body);
            println!("{}\n", "=".repeat(60));
        }

        // Structured logging never carries the body
        info!(
            target: "mail_service",
            provider = "mock",
            to = %mask_email(to),
            message_id = %message_id,
            count = count,
            "Mock email sent"
        );

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}
