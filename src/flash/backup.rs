//! Entry-file backup guard
//!
//! The demo project's entry file is returned to its pre-job state when the
//! guard drops, on every exit path.

use anyhow::{Context, Result};
use log::{debug, error};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of the sibling file holding the original entry file.
pub const BACKUP_EXTENSION: &str = "aea_backup";

#[derive(Debug)]
pub struct EntryFileGuard {
    entry: PathBuf,
    backup: Option<PathBuf>,
}

impl EntryFileGuard {
    /// Copies an existing entry file aside before anything touches it.
    pub fn acquire(entry: &Path) -> Result<Self> {
        let backup = if entry.exists() {
            let backup = entry.with_extension(BACKUP_EXTENSION);
            fs::copy(entry, &backup).with_context(|| {
                format!("Unable to back up {} to {}", entry.display(), backup.display())
            })?;
            debug!("Backed up {} to {}", entry.display(), backup.display());
            Some(backup)
        } else {
            None
        };

        Ok(Self {
            entry: entry.to_path_buf(),
            backup,
        })
    }

    /// Overwrites the entry file with `source`.
    pub fn install(&self, source: &Path) -> Result<()> {
        fs::copy(source, &self.entry).with_context(|| {
            format!("Unable to copy {} to {}", source.display(), self.entry.display())
        })?;
        Ok(())
    }

    fn restore(&mut self) -> Result<()> {
        match self.backup.take() {
            Some(backup) => {
                if backup.exists() {
                    fs::rename(&backup, &self.entry).with_context(|| {
                        format!("Unable to restore {} from {}", self.entry.display(), backup.display())
                    })?;
                    debug!("Restored {}", self.entry.display());
                }
            }
            None => {
                if self.entry.exists() {
                    fs::remove_file(&self.entry)
                        .with_context(|| format!("Unable to remove {}", self.entry.display()))?;
                    debug!("Removed {}", self.entry.display());
                }
            }
        }
        Ok(())
    }
}

impl Drop for EntryFileGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            error!("{e:#}");
        }
    }
}
