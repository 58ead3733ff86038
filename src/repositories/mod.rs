//! # Repository Module
//!
//! Read access to the credential store that holds onboarded users and their
//! API key pairs. Records are provisioned by an external onboarding flow.

pub mod credential;
pub use credential::*;

// Redis base utilities for shared functionality
pub mod redis_base;
