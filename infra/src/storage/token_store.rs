//! Filesystem implementation of the TokenStore trait.
//!
//! Records live at `root/ab/cd/ef/12/<id>.token`. Disabling renames the file to
//! `<id>.token.unable` and enabling renames it back, so availability changes
//! are single atomic renames. Records are never rewritten after creation.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tg_core::domain::entities::audit::{AuditAction, AuditEntry};
use tg_core::domain::entities::token::{NewToken, TokenRecord};
use tg_core::domain::value_objects::{IdentifierDigest, IdentifierGenerator, PublicId};
use tg_core::errors::{DomainError, DomainResult};
use tg_core::repositories::token::ensure_subtype;
use tg_core::repositories::{AuditSink, NoOpAuditSink, TokenStore};
use tg_shared::TokenStoreConfig;

use crate::audit::FileAuditSink;

use super::fs::{Filesystem, LocalFilesystem};
use super::layout::ShardLayout;
use super::record::StoredToken;

/// Token store keeping one JSON file per token in a sharded directory tree
pub struct FsTokenStore<F: Filesystem = LocalFilesystem> {
    fs: Arc<F>,
    layout: ShardLayout,
    dir_mode: u32,
    generator: IdentifierGenerator,
    audit: Arc<dyn AuditSink>,
}

impl FsTokenStore<LocalFilesystem> {
    /// Opens a store on the local filesystem
    ///
    /// # Errors
    ///
    /// `DomainError::Configuration` if the configuration does not validate
    pub fn open(config: &TokenStoreConfig) -> DomainResult<Self> {
        Self::with_filesystem(config, Arc::new(LocalFilesystem))
    }
}

impl<F: Filesystem + 'static> FsTokenStore<F> {
    /// Opens a store on an arbitrary [`Filesystem`]
    ///
    /// When `audit_enabled` is set, a [`FileAuditSink`] on the same filesystem
    /// is attached.
    pub fn with_filesystem(config: &TokenStoreConfig, fs: Arc<F>) -> DomainResult<Self> {
        config.validate().map_err(DomainError::configuration)?;
        let digest: IdentifierDigest = config.hash_algorithm.parse()?;
        let layout = ShardLayout::from_config(config);

        let audit: Arc<dyn AuditSink> = if config.audit_enabled {
            Arc::new(FileAuditSink::new(fs.clone(), layout.clone(), config.dir_mode))
        } else {
            Arc::new(NoOpAuditSink)
        };

        tracing::debug!(
            event = "token_store_opened",
            root = %layout.root().display(),
            digest = digest.name(),
            audit = config.audit_enabled
        );

        Ok(Self {
            fs,
            layout,
            dir_mode: config.dir_mode,
            generator: IdentifierGenerator::new(digest),
            audit,
        })
    }
}

impl<F: Filesystem> FsTokenStore<F> {
    /// Replaces the audit sink
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn layout(&self) -> &ShardLayout {
        &self.layout
    }

    /// Renames `from` to `to`, reporting a missing source as `false`
    async fn toggle(&self, from: &Path, to: &Path) -> DomainResult<bool> {
        match self.fs.rename(from, to).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("rename", from, e)),
        }
    }

    /// Best-effort removal of a file left by a failed create
    async fn discard(&self, path: &Path) {
        match self.fs.remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                event = "token_cleanup_failed",
                path = %path.display(),
                error = %e
            ),
        }
    }

    async fn record_state_change(&self, action: AuditAction, id: &PublicId) {
        if let Err(e) = self.audit.append(&AuditEntry::new(action, id.as_str())).await {
            tracing::warn!(
                event = "audit_append_failed",
                public_id = %id,
                action = action.as_str(),
                error = %e
            );
        }
    }
}

#[async_trait]
impl<F: Filesystem> TokenStore for FsTokenStore<F> {
    async fn create(&self, token: NewToken) -> DomainResult<TokenRecord> {
        let id = self.generator.generate(&token)?;
        let issued_at = chrono::Utc::now().timestamp();
        let document = StoredToken::from_new_token(&token, issued_at)?.to_bytes()?;
        let user_id = token.user_id;
        let record = TokenRecord::new(id.as_str(), id.as_str(), issued_at, token)?;

        let dir = self.layout.shard_dir(&id)?;
        let path = self.layout.record_path(&id)?;
        let disabled = self.layout.disabled_path(&id)?;
        let temp = self.layout.temp_path(&id)?;

        self.fs
            .create_dir_all(&dir, self.dir_mode)
            .await
            .map_err(|e| io_error("create", &dir, e))?;

        let taken = self.fs.exists(&path).await.map_err(|e| io_error("stat", &path, e))?
            || self
                .fs
                .exists(&disabled)
                .await
                .map_err(|e| io_error("stat", &disabled, e))?;
        if taken {
            return Err(DomainError::integrity(format!("token identifier collision: {}", id)));
        }

        if let Err(e) = self.fs.write_new(&temp, &document).await {
            if e.kind() == io::ErrorKind::AlreadyExists {
                return Err(DomainError::integrity(format!("token identifier collision: {}", id)));
            }
            self.discard(&temp).await;
            return Err(io_error("write", &temp, e));
        }

        if let Err(e) = self.fs.rename(&temp, &path).await {
            self.discard(&temp).await;
            return Err(io_error("rename", &temp, e));
        }

        let entry = AuditEntry::new(AuditAction::Create, id.as_str()).with_user(user_id);
        if let Err(e) = self.audit.append(&entry).await {
            // Issuance must not lose its audit trail.
            self.discard(&path).await;
            return Err(e);
        }

        tracing::debug!(event = "token_stored", public_id = %id, path = %path.display());
        Ok(record)
    }

    async fn find(&self, public_id: &str, subtype: &str) -> DomainResult<Option<TokenRecord>> {
        let id = PublicId::parse(public_id)?;
        let path = self.layout.record_path(&id)?;

        let bytes = match self.fs.read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("read", &path, e)),
        };

        let record = StoredToken::from_bytes(id.as_str(), &bytes)?.into_record(id.as_str(), subtype)?;
        ensure_subtype(record, subtype).map(Some)
    }

    async fn disable(&self, public_id: &str) -> DomainResult<bool> {
        let id = PublicId::parse(public_id)?;
        let changed = self
            .toggle(&self.layout.record_path(&id)?, &self.layout.disabled_path(&id)?)
            .await?;

        if changed {
            self.record_state_change(AuditAction::Disable, &id).await;
        }
        Ok(changed)
    }

    async fn enable(&self, public_id: &str) -> DomainResult<bool> {
        let id = PublicId::parse(public_id)?;
        let changed = self
            .toggle(&self.layout.disabled_path(&id)?, &self.layout.record_path(&id)?)
            .await?;

        if changed {
            self.record_state_change(AuditAction::Enable, &id).await;
        }
        Ok(changed)
    }
}

fn io_error(action: &str, path: &Path, err: io::Error) -> DomainError {
    DomainError::store_io(format!("Failed to {} {}: {}", action, path.display(), err))
}
