//! In-memory audit sink, mostly useful in tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::AuditSink;
use crate::domain::entities::audit::{AuditAction, AuditEntry};
use crate::errors::{DomainError, DomainResult};

/// Keeps audit entries in memory. Can be switched into a failing mode to
/// exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: RwLock<Vec<AuditEntry>>,
    failing: AtomicBool,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent append fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }

    /// Actions recorded for one identifier, in order
    pub async fn actions_for(&self, public_id: &str) -> Vec<AuditAction> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|entry| entry.public_id == public_id)
            .map(|entry| entry.action)
            .collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, entry: &AuditEntry) -> DomainResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::store_io("audit sink unavailable"));
        }
        self.entries.write().await.push(entry.clone());
        Ok(())
    }
}
