//! Token service module
//!
//! This module handles the token lifecycle:
//! - Issuance with inherited permissions and, for tunnel subtypes, fresh key pairs
//! - Resolution with lazy expiry checks
//! - Permission checks against the resolved record
//! - Reversible revocation through the store

mod clock;
mod config;
mod service;
mod tunnel;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::TokenServiceConfig;
pub use service::TokenService;
