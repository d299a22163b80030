
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::fs::{Filesystem, LocalFilesystem};

/// Wraps the local filesystem, counting calls and optionally failing appends
#[derive(Default)]
pub(crate) struct RecordingFilesystem {
    inner: LocalFilesystem,
    calls: AtomicUsize,
    paths: Mutex<Vec<PathBuf>>,
    fail_appends: AtomicBool,
    fail_removals: AtomicBool,
}

impl RecordingFilesystem {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }

    fn record(&self, path: &Path) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(path.to_path_buf());
    }
}

#[async_trait]
impl Filesystem for RecordingFilesystem {
    async fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        self.record(path);
        self.inner.create_dir_all(path, mode).await
    }

    async fn write_new(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.record(path);
        self.inner.write_new(path, contents).await
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.record(path);
        self.inner.read(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.record(from);
        self.inner.rename(from, to).await
    }

    async fn append(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.record(path);
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "append refused"));
        }
        self.inner.append(path, contents).await
    }

    async fn exists(&self, path: &Path) -> io::Result<bool> {
        self.record(path);
        self.inner.exists(path).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.record(path);
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "remove refused"));
        }
        self.inner.remove_file(path).await
    }
}
