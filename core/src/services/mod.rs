//! Business services containing the verification engine and its collaborators.

pub mod clock;
pub mod code_generator;
pub mod verification;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use code_generator::{CodeGenerator, SecureCodeGenerator};
pub use verification::{
    ExpirySweeper, ExpirySweeperConfig, IssueResult, MailGatewayTrait, OtpStoreTrait,
    VerificationService, VerificationServiceConfig, VerifiedIdentityStoreTrait,
};
