//! Append-only audit log kept next to the token records
//!
//! Each shard directory gets a `log/` subdirectory with one file per UTC day.
//! Every line is a JSON-encoded [`AuditEntry`].

use async_trait::async_trait;
use std::sync::Arc;

use tg_core::domain::entities::audit::AuditEntry;
use tg_core::domain::value_objects::PublicId;
use tg_core::errors::{DomainError, DomainResult};
use tg_core::repositories::AuditSink;

use crate::storage::{Filesystem, ShardLayout};

/// Audit sink writing time-bucketed log files under the shard tree
pub struct FileAuditSink<F: Filesystem> {
    fs: Arc<F>,
    layout: ShardLayout,
    dir_mode: u32,
}

impl<F: Filesystem> FileAuditSink<F> {
    pub fn new(fs: Arc<F>, layout: ShardLayout, dir_mode: u32) -> Self {
        Self {
            fs,
            layout,
            dir_mode,
        }
    }
}

#[async_trait]
impl<F: Filesystem> AuditSink for FileAuditSink<F> {
    async fn append(&self, entry: &AuditEntry) -> DomainResult<()> {
        let id = PublicId::parse(&entry.public_id)?;
        let dir = self.layout.audit_dir(&id)?;
        let path = self.layout.audit_path(&id, &entry.bucket())?;

        let line = entry.to_line().map_err(|e| DomainError::Internal {
            message: format!("Failed to encode audit entry: {}", e),
        })?;

        self.fs
            .create_dir_all(&dir, self.dir_mode)
            .await
            .map_err(|e| DomainError::store_io(format!("Failed to create {}: {}", dir.display(), e)))?;
        self.fs
            .append(&path, line.as_bytes())
            .await
            .map_err(|e| DomainError::store_io(format!("Failed to append to {}: {}", path.display(), e)))?;

        tracing::trace!(
            event = "audit_appended",
            public_id = %id,
            action = entry.action.as_str()
        );
        Ok(())
    }
}
