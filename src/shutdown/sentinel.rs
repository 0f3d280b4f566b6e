// src/shutdown/sentinel.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::fs::FileSystem;

/// The shutdown marker on disk.
///
/// Creating the guard writes the file; dropping it (or calling
/// [`SentinelGuard::clear`]) removes it if it is still there. The server is
/// allowed to delete the file first.
#[derive(Debug)]
pub struct SentinelGuard<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
    armed: bool,
}

impl<'a> SentinelGuard<'a> {
    /// Write the (empty) marker file.
    pub fn arm(fs: &'a dyn FileSystem, path: &Path) -> Result<Self> {
        fs.write(path, b"")
            .with_context(|| format!("creating shutdown sentinel {}", path.display()))?;
        debug!(path = %path.display(), "shutdown sentinel created");
        Ok(Self {
            fs,
            path: path.to_path_buf(),
            armed: true,
        })
    }

    /// Remove the marker now.
    pub fn clear(mut self) -> Result<()> {
        self.remove()
    }

    fn remove(&mut self) -> Result<()> {
        if !self.armed {
            return Ok(());
        }
        self.armed = false;
        if self.fs.exists(&self.path) {
            self.fs
                .remove_file(&self.path)
                .with_context(|| format!("removing shutdown sentinel {}", self.path.display()))?;
            debug!(path = %self.path.display(), "shutdown sentinel removed");
        } else {
            debug!(path = %self.path.display(), "shutdown sentinel already consumed");
        }
        Ok(())
    }
}

impl Drop for SentinelGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.remove() {
            warn!(error = %e, "failed to remove shutdown sentinel");
        }
    }
}
