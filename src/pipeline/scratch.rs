//! Scratch directories owned by a single pipeline stage.
//!
//! The rasterizer leaves its output in a directory and that listing is the
//! only record of what it produced, so every run starts from an empty
//! directory and removes it afterwards. Callers finish with
//! [`ScratchDir::remove`]; `Drop` is the blocking fallback for early returns
//! via `?` and panics.

use crate::error::FlipbookError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A directory that is emptied on creation and deleted on drop.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    /// Cleared once [`ScratchDir::remove`] has run.
    armed: bool,
}

impl ScratchDir {
    /// Delete any stale directory at `path`, then create it empty.
    pub async fn fresh(path: impl Into<PathBuf>) -> Result<Self, FlipbookError> {
        let path = path.into();
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("Removing stale scratch directory {}", path.display());
            tokio::fs::remove_dir_all(&path)
                .await
                .map_err(|e| FlipbookError::OutputWriteFailed {
                    path: path.clone(),
                    source: e,
                })?;
        }
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| FlipbookError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        Ok(Self { path, armed: true })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File names (not paths) currently in the directory.
    ///
    /// Entries that are not valid UTF-8 are skipped.
    pub async fn file_names(&self) -> std::io::Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.path).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete the directory on the async runtime. Best effort.
    pub async fn remove(mut self) {
        let result = tokio::fs::remove_dir_all(&self.path).await;
        log_cleanup_error(&self.path, result);
        self.armed = false;
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.armed {
            log_cleanup_error(&self.path, std::fs::remove_dir_all(&self.path));
        }
    }
}

/// A failed cleanup never turns into a failed run.
fn log_cleanup_error(path: &Path, result: std::io::Result<()>) {
    if let Err(e) = result {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!("Could not remove {}: {}", path.display(), e);
        }
    }
}
