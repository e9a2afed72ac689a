//! Verification service module for email one-time passcodes
//!
//! This module provides the complete code workflow:
//! - Code generation, storage and delivery
//! - Verification with expiry and single-use enforcement
//! - Resend with code rotation, redelivery without rotation
//! - Periodic sweeping of expired records

mod config;
mod service;
mod sweeper;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::VerificationServiceConfig;
pub use service::VerificationService;
pub use sweeper::{ExpirySweeper, ExpirySweeperConfig};
pub use traits::{MailGatewayTrait, OtpStoreTrait, VerifiedIdentityStoreTrait};
pub use types::IssueResult;
