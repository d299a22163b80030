//! # TokenGate Core
//!
//! Core domain layer of the token authentication and secure-tunnel subsystem.
//! This crate contains the token record model, the store interface with an
//! in-memory backend, the subtype permission model, RSA key pairs with the
//! tunnel payload codec, and the token service that ties them together.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::*;
pub use services::*;
pub use repositories::*;
pub use errors::*;
