//! Scratch directories for temporary workspaces.
//!
//! A [`ScratchDir`] owns a freshly created directory. Unless it is retained
//! for debugging, the directory is removed when the value is dropped, on
//! success and error paths alike. A retained directory is persisted at
//! creation time and left for the caller to inspect and remove.

use std::path::{Path, PathBuf};

use log::warn;
use tempfile::TempDir;

use crate::error::Result;

/// A temporary directory with optional retention.
#[derive(Debug)]
pub enum ScratchDir {
    /// Removed when dropped.
    Owned(TempDir),
    /// Kept on disk after the run.
    Retained(PathBuf),
}

impl ScratchDir {
    /// Create a new directory named `<prefix><random>` under `root`, or
    /// under the system temporary directory when `root` is `None`.
    pub fn create(root: Option<&Path>, prefix: &str, retain: bool) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        if retain {
            let path = dir.keep();
            warn!("Keeping workspace {} after the run", path.display());
            Ok(ScratchDir::Retained(path))
        } else {
            Ok(ScratchDir::Owned(dir))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ScratchDir::Owned(dir) => dir.path(),
            ScratchDir::Retained(path) => path,
        }
    }

    /// The path of a retained directory.
    pub fn retained_path(&self) -> Option<&Path> {
        match self {
            ScratchDir::Owned(_) => None,
            ScratchDir::Retained(path) => Some(path),
        }
    }
}
