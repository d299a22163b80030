//! Domain-specific error types and error handling.

mod types;

// Re-export all error types and utilities
pub use types::TokenError;

use thiserror::Error;

/// Core domain errors
///
/// `Token` carries the per-request failures that are safe to report to an end
/// user. The remaining variants are hard failures of the current operation:
/// storage I/O, broken configuration, or data-integrity violations.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Token store I/O failure: {message}")]
    StoreIo { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Operation not supported by this token store: {operation}")]
    NotSupported { operation: String },

    #[error("Data integrity violation: {message}")]
    Integrity { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Shorthand for a `BadToken` failure with a log-only reason
    pub fn bad_token(reason: impl Into<String>) -> Self {
        DomainError::Token(TokenError::BadToken {
            reason: reason.into(),
        })
    }

    /// Shorthand for a `NoAccess` failure with a log-only reason
    pub fn no_access(reason: impl Into<String>) -> Self {
        DomainError::Token(TokenError::NoAccess {
            reason: reason.into(),
        })
    }

    pub fn store_io(message: impl Into<String>) -> Self {
        DomainError::StoreIo {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        DomainError::Configuration {
            message: message.into(),
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        DomainError::Integrity {
            message: message.into(),
        }
    }

    /// Stable error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Token(err) => err.error_code(),
            DomainError::StoreIo { .. } => "STORE_IO",
            DomainError::Configuration { .. } => "CONFIGURATION_ERROR",
            DomainError::NotSupported { .. } => "NOT_SUPPORTED",
            DomainError::Integrity { .. } => "INTEGRITY_ERROR",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure points at the environment rather than the request
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DomainError::StoreIo { .. }
                | DomainError::Configuration { .. }
                | DomainError::Integrity { .. }
        )
    }

    /// Returns `true` for `BadToken`
    pub fn is_bad_token(&self) -> bool {
        matches!(self, DomainError::Token(TokenError::BadToken { .. }))
    }

    /// Returns `true` for `ExpiredToken`
    pub fn is_expired(&self) -> bool {
        matches!(self, DomainError::Token(TokenError::ExpiredToken))
    }

    /// Returns `true` for `NoAccess`
    pub fn is_no_access(&self) -> bool {
        matches!(self, DomainError::Token(TokenError::NoAccess { .. }))
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::StoreIo {
            message: err.to_string(),
        }
    }
}
