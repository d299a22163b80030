//! Token-related error types
//!
//! Display strings are deliberately generic so that they can be shown to an
//! end user as-is. The `reason` fields are for logs only.

use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug)]
pub enum TokenError {
    /// Identifier not found, malformed, unsafe, or tunnel material missing/corrupt
    #[error("Invalid token")]
    BadToken { reason: String },

    /// Valid identifier whose lifetime has elapsed
    #[error("Token expired")]
    ExpiredToken,

    /// Valid token lacking a required permission, or a revoke/restore target
    /// that does not exist
    #[error("Access denied")]
    NoAccess { reason: String },
}

impl TokenError {
    /// Stable error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::BadToken { .. } => "BAD_TOKEN",
            TokenError::ExpiredToken => "EXPIRED_TOKEN",
            TokenError::NoAccess { .. } => "NO_ACCESS",
        }
    }

    /// Log-only detail, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            TokenError::BadToken { reason } | TokenError::NoAccess { reason } => Some(reason),
            TokenError::ExpiredToken => None,
        }
    }
}
