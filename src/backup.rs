//! Backup-on-first-load for edited files.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::LutError;

const BACKUP_SUFFIX: &str = ".backup";

/// `engine.lut` -> `engine.lut.backup`
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    Created(PathBuf),
    AlreadyExists(PathBuf),
    /// This path was already handled earlier in the run
    AlreadyHandled,
}

/// Paths whose backup has been taken care of during this run.
///
/// A backup is only ever created when none exists on disk, so an existing
/// backup is never overwritten.
#[derive(Debug, Default)]
pub struct BackupLedger {
    handled: HashSet<PathBuf>,
}

impl BackupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure(&mut self, path: &Path) -> Result<BackupOutcome, LutError> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if self.handled.contains(&key) {
            return Ok(BackupOutcome::AlreadyHandled);
        }

        let backup = backup_path_for(path);
        let outcome = if backup.exists() {
            info!("Backup already present: {}", backup.display());
            BackupOutcome::AlreadyExists(backup)
        } else {
            fs::copy(path, &backup).map_err(|source| LutError::Backup {
                path: backup.clone(),
                source,
            })?;
            info!("Backup created: {}", backup.display());
            BackupOutcome::Created(backup)
        };

        self.handled.insert(key);
        Ok(outcome)
    }
}
