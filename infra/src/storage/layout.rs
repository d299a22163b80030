//! Sharded directory layout
//!
//! `root/ab/cd/ef/12/<id>.token` for an identifier starting with `abcdef12`
//! at the default fan-out of four levels, two characters each.

use std::path::{Path, PathBuf};

use tg_core::domain::value_objects::PublicId;
use tg_core::errors::{DomainError, DomainResult};
use tg_shared::TokenStoreConfig;

/// Extension of an enabled record
pub const RECORD_EXTENSION: &str = "token";

/// Suffix appended to a disabled record's file name
pub const DISABLED_SUFFIX: &str = ".unable";

/// Suffix of an in-flight write
pub const TEMP_SUFFIX: &str = ".tmp";

/// Directory holding a shard's audit log
pub const AUDIT_DIR: &str = "log";

/// Maps validated identifiers to paths
#[derive(Debug, Clone)]
pub struct ShardLayout {
    root: PathBuf,
    depth: usize,
    width: usize,
}

impl ShardLayout {
    pub fn new(root: impl Into<PathBuf>, depth: usize, width: usize) -> Self {
        Self {
            root: root.into(),
            depth,
            width,
        }
    }

    pub fn from_config(config: &TokenStoreConfig) -> Self {
        Self::new(config.root_dir.clone(), config.shard_depth, config.shard_width)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the record for `id`
    pub fn shard_dir(&self, id: &PublicId) -> DomainResult<PathBuf> {
        let segments = id.shard_segments(self.depth, self.width).ok_or_else(|| {
            DomainError::configuration(format!(
                "identifier of {} characters cannot be sharded {}x{}",
                id.as_str().len(),
                self.depth,
                self.width
            ))
        })?;

        let mut dir = self.root.clone();
        dir.extend(segments);
        Ok(dir)
    }

    /// Path of the enabled record
    pub fn record_path(&self, id: &PublicId) -> DomainResult<PathBuf> {
        Ok(self.shard_dir(id)?.join(record_file_name(id)))
    }

    /// Path of the record while disabled
    pub fn disabled_path(&self, id: &PublicId) -> DomainResult<PathBuf> {
        Ok(self
            .shard_dir(id)?
            .join(format!("{}{}", record_file_name(id), DISABLED_SUFFIX)))
    }

    /// Path the record is written to before it is renamed into place
    pub fn temp_path(&self, id: &PublicId) -> DomainResult<PathBuf> {
        Ok(self
            .shard_dir(id)?
            .join(format!("{}{}", record_file_name(id), TEMP_SUFFIX)))
    }

    pub fn audit_dir(&self, id: &PublicId) -> DomainResult<PathBuf> {
        Ok(self.shard_dir(id)?.join(AUDIT_DIR))
    }

    /// Audit log file for `id`'s shard and the given day bucket (`YYYY-MM-DD`)
    pub fn audit_path(&self, id: &PublicId, bucket: &str) -> DomainResult<PathBuf> {
        Ok(self.audit_dir(id)?.join(format!("{}.log", bucket)))
    }
}

fn record_file_name(id: &PublicId) -> String {
    format!("{}.{}", id.as_str(), RECORD_EXTENSION)
}
