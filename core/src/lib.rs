//! # OtpMail Core
//!
//! Core business logic for issuing and verifying one-time passcodes sent by email.
//! This crate contains the domain records, the verification engine, the ports
//! it depends on (mail gateway, OTP store, clock, code generator) and error types.
//! Concrete stores and mail transports live in `om_infra`.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
