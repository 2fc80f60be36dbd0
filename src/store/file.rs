//! # JSON file backend.
//!
//! Commits are atomic with respect to crashes using write-to-temp-then-rename:
//! 1. Write to `<path>.tmp`
//! 2. fsync the temp file
//! 3. Rename to `<path>`
//! 4. fsync the parent directory
//!
//! Readers (including the next process) always see either the old or the new
//! namespace, never a partial write.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;
use crate::store::{Namespace, StoreBackend};

/// Namespace persisted as a single JSON document.
#[derive(Clone, Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the JSON document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.tmp_path();
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fsync_dir(parent),
            _ => Ok(()),
        }
    }
}

/// Syncs a directory so a rename inside it survives power loss.
fn fsync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

impl StoreBackend for FileBackend {
    fn load(&self) -> Result<Namespace, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no namespace on disk, starting empty");
                return Ok(Namespace::new());
            }
            Err(e) => return Err(StoreError::unavailable(e)),
        };
        serde_json::from_slice(&bytes).map_err(StoreError::unavailable)
    }

    fn commit(&self, ns: &Namespace) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(ns).map_err(StoreError::unavailable)?;
        self.write_atomic(&bytes).map_err(StoreError::unavailable)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
