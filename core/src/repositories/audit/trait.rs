//! Audit sink trait for token access-state changes.

use async_trait::async_trait;

use crate::domain::entities::audit::AuditEntry;
use crate::errors::DomainResult;

/// Destination for audit entries
///
/// Stores call the sink on create, disable and enable. A failed append is a
/// hard error for create; for disable/enable the store logs and carries on.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one entry
    ///
    /// # Returns
    /// * `Ok(())` - Entry durably appended
    /// * `Err(DomainError::StoreIo)` - The entry could not be written
    async fn append(&self, entry: &AuditEntry) -> DomainResult<()>;
}
