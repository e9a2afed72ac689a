//! Domain layer containing the records the verification engine manages.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
