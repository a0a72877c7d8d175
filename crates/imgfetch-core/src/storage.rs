//! Part-file lifecycle for streamed downloads.
//!
//! Bytes stream sequentially into `<final>.part`; a completed transfer is
//! fsynced and renamed onto the final path, so a partially fetched file
//! never appears under its final name.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Suffix for in-progress downloads.
pub const PART_SUFFIX: &str = ".part";

/// Path of the in-progress file for `final_path` (`a.png` -> `a.png.part`).
pub fn part_path(final_path: &Path) -> PathBuf {
    let mut name = final_path.as_os_str().to_owned();
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

/// Sequential writer for one part file. Cloning shares the same open file,
/// so a transfer callback can own a clone while the caller keeps the
/// original for `sync`/`finalize`.
#[derive(Clone)]
pub struct PartWriter {
    file: Arc<File>,
    path: PathBuf,
}

impl PartWriter {
    /// Creates the part file at `path`, truncating any leftover from an
    /// earlier aborted transfer.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to create part file: {}", path.display()))?;
        Ok(PartWriter {
            file: Arc::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Appends `data` at the file's write cursor.
    pub fn append(&self, data: &[u8]) -> Result<()> {
        (&*self.file).write_all(data).context("part file write failed")
    }

    /// Sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all().context("part file sync failed")
    }

    /// Atomically renames the part file onto `final_path`, consuming the
    /// writer. Fails if `final_path` is on a different filesystem.
    pub fn finalize(self, final_path: &Path) -> Result<()> {
        // Drop our handle (file closed) before rename on some platforms.
        let path = self.path.clone();
        drop(self.file);

        std::fs::rename(&path, final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                path.display(),
                final_path.display()
            )
        })
    }

    /// Removes the part file after a failed transfer. Best effort.
    pub fn discard(self) {
        let path = self.path.clone();
        drop(self.file);
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::debug!("could not remove part file {}: {}", path.display(), e);
        }
    }
}
