//! Domain entities representing tokens, subtypes and audit entries.

pub mod audit;
pub mod subtype;
pub mod token;

// Re-export commonly used types
pub use audit::{AuditAction, AuditEntry};
pub use subtype::TokenSubtype;
pub use token::{
    extension_keys, normalize_permissions, ClientToken, ExtensionData, NewToken, TokenRecord,
};
