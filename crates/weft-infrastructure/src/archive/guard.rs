//! Scoped archive access that persists on every exit path.

use super::store::Archive;
use std::ops::{Deref, DerefMut};
use weft_core::Result;

/// Owns an [`Archive`] and saves it when dropped.
///
/// Errors during the implicit save can only be logged; call
/// [`ArchiveGuard::close`] to observe them.
pub struct ArchiveGuard {
    archive: Archive,
    closed: bool,
}

impl ArchiveGuard {
    pub(crate) fn new(archive: Archive) -> Self {
        Self {
            archive,
            closed: false,
        }
    }

    /// Saves now and returns the outcome. Dropping afterwards does not save
    /// again.
    pub fn close(mut self) -> Result<()> {
        let result = self.archive.save();
        self.closed = true;
        result
    }
}

impl Deref for ArchiveGuard {
    type Target = Archive;

    fn deref(&self) -> &Archive {
        &self.archive
    }
}

impl DerefMut for ArchiveGuard {
    fn deref_mut(&mut self) -> &mut Archive {
        &mut self.archive
    }
}

impl Drop for ArchiveGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.archive.save() {
            tracing::error!(path = %self.archive.path().display(), error = %e, "Failed to save archive on scope exit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use weft_core::record::ConfigRecord;

    #[tokio::test]
    async fn test_drop_saves() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("archive.json");

        {
            let mut guard = Archive::new(&path).scoped();
            guard.add(ConfigRecord::with_default_model("sk-test-0000000000000000")).await.unwrap();
        }

        assert_eq!(Archive::new(&path).len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_close_reports_save_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("archive.json");

        let mut guard = Archive::new(&path).scoped();
        guard.add(ConfigRecord::with_default_model("sk-test-0000000000000000")).await.unwrap();

        // A non-empty directory cannot be replaced by a file.
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("child"), "x").unwrap();

        assert!(guard.close().is_err());
    }

    #[tokio::test]
    async fn test_close_saves_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("archive.json");

        let mut guard = Archive::new(&path).scoped();
        guard.add(ConfigRecord::with_default_model("sk-test-0000000000000000")).await.unwrap();
        guard.close().unwrap();

        assert_eq!(Archive::new(&path).len().await.unwrap(), 1);
    }
}
