//! Filesystem primitives used by the token store
//!
//! The store never touches `tokio::fs` directly. Everything goes through the
//! [`Filesystem`] trait so that tests can observe (or forbid) every call.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Minimal async filesystem interface
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Create `path` and any missing parents with permission bits `mode` (unix)
    async fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Write a file that must not exist yet, flushing it to disk
    async fn write_new(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Read a whole file
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Atomically rename `from` to `to`
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Append to a file, creating it if needed
    async fn append(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    async fn exists(&self, path: &Path) -> io::Result<bool>;

    async fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// [`Filesystem`] backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

#[async_trait]
impl Filesystem for LocalFilesystem {
    async fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(mode);
        #[cfg(not(unix))]
        let _ = mode;
        builder.create(path).await
    }

    async fn write_new(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        file.write_all(contents).await?;
        file.sync_all().await
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        tokio::fs::rename(from, to).await
    }

    async fn append(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(contents).await?;
        file.flush().await
    }

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        tokio::fs::try_exists(path).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}
