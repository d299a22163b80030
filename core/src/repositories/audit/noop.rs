//! No-op implementation of AuditSink for when audit logging is disabled

use async_trait::async_trait;

use super::AuditSink;
use crate::domain::entities::audit::AuditEntry;
use crate::errors::DomainResult;

/// Audit sink that drops every entry
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAuditSink;

#[async_trait]
impl AuditSink for NoOpAuditSink {
    async fn append(&self, _entry: &AuditEntry) -> DomainResult<()> {
        Ok(())
    }
}
