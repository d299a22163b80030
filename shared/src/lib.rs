//! Shared configuration types for TokenGate
//!
//! This crate holds the configuration consumed by every other member:
//! - Token store configuration (storage root, sharding, identifier digest, key size)
//! - Environment detection and logging configuration

pub mod config;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, Environment, LogFormat, LoggingConfig, TokenStoreConfig,
};
