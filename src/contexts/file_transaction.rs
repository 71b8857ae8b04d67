//! Backup-by-rename for a single file.
//!
//! Beginning a transaction moves the file into its `.bak` slot so the original
//! path is free to be rewritten. The transaction ends either by committing
//! (the new content stays, the backup is discarded) or by rolling back (the
//! backup is renamed over whatever is at the path). Dropping an unfinished
//! transaction rolls back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::data::backup_path;

#[derive(Debug, Error)]
pub enum TransactionError {
    /// A backup slot was already occupied. This is a protocol violation, not
    /// a user error.
    #[error("backup already exists for {}", path.display())]
    BackupConflict { path: PathBuf },
    #[error("{action} failed for {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TransactionError {
    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        TransactionError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Which slot currently holds the truth for the guarded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Owned,
    BackedUp,
}

#[derive(Debug)]
pub struct FileTransaction {
    path: PathBuf,
    backup: PathBuf,
    /// Whether there was anything to back up. An absent file is restored by
    /// removing whatever appeared at the path.
    had_original: bool,
    state: SlotState,
}

impl FileTransaction {
    pub fn begin(path: impl Into<PathBuf>) -> Result<Self, TransactionError> {
        let path = path.into();
        let backup = backup_path(&path);

        if backup.exists() {
            return Err(TransactionError::BackupConflict { path });
        }

        let had_original = path.exists();
        if had_original {
            fs::rename(&path, &backup).map_err(|e| TransactionError::io("backup", &path, e))?;
        }
        debug!(path = %path.display(), had_original, "backed up");

        Ok(Self {
            path,
            backup,
            had_original,
            state: SlotState::BackedUp,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    /// Keeps the current content at the path and discards the backup.
    pub fn commit(mut self) -> Result<(), TransactionError> {
        if self.had_original {
            fs::remove_file(&self.backup)
                .map_err(|e| TransactionError::io("discard backup", &self.backup, e))?;
        }
        self.state = SlotState::Owned;
        debug!(path = %self.path.display(), "committed");
        Ok(())
    }

    /// Puts the backed up content back at the path.
    pub fn rollback(mut self) -> Result<(), TransactionError> {
        self.restore()
    }

    fn restore(&mut self) -> Result<(), TransactionError> {
        if self.state == SlotState::Owned {
            return Ok(());
        }

        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(TransactionError::io("clear", &self.path, e)),
        }
        if self.had_original {
            fs::rename(&self.backup, &self.path)
                .map_err(|e| TransactionError::io("restore", &self.path, e))?;
        }
        self.state = SlotState::Owned;
        debug!(path = %self.path.display(), "rolled back");
        Ok(())
    }
}

impl Drop for FileTransaction {
    fn drop(&mut self) {
        if self.state == SlotState::BackedUp {
            if let Err(e) = self.restore() {
                warn!(path = %self.path.display(), error = %e, "restore on drop failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("program.cpp");
        (dir, path)
    }

    #[test]
    fn begin_moves_truth_into_backup_slot() {
        let (_dir, path) = scratch();
        fs::write(&path, "original").unwrap();

        let tx = FileTransaction::begin(&path).unwrap();
        assert_eq!(tx.state(), SlotState::BackedUp);
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), "original");

        tx.rollback().unwrap();
    }

    #[test]
    fn rollback_restores_original_over_new_content() {
        let (_dir, path) = scratch();
        fs::write(&path, "original").unwrap();

        let tx = FileTransaction::begin(&path).unwrap();
        fs::write(&path, "replacement").unwrap();
        tx.rollback().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn commit_keeps_new_content_and_discards_backup() {
        let (_dir, path) = scratch();
        fs::write(&path, "original").unwrap();

        let tx = FileTransaction::begin(&path).unwrap();
        fs::write(&path, "replacement").unwrap();
        tx.commit().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "replacement");
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn drop_without_resolution_rolls_back() {
        let (_dir, path) = scratch();
        fs::write(&path, "original").unwrap();

        {
            let _tx = FileTransaction::begin(&path).unwrap();
            fs::write(&path, "half written").unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn absent_original_rolls_back_to_absent() {
        let (_dir, path) = scratch();

        let tx = FileTransaction::begin(&path).unwrap();
        fs::write(&path, "produced").unwrap();
        tx.rollback().unwrap();

        assert!(!path.exists());
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn occupied_backup_slot_is_a_conflict() {
        let (_dir, path) = scratch();
        fs::write(&path, "original").unwrap();
        fs::write(backup_path(&path), "stale").unwrap();

        let err = FileTransaction::begin(&path).unwrap_err();
        assert!(matches!(err, TransactionError::BackupConflict { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn nested_begin_on_same_path_conflicts() {
        let (_dir, path) = scratch();
        fs::write(&path, "original").unwrap();

        let outer = FileTransaction::begin(&path).unwrap();
        fs::write(&path, "new").unwrap();
        assert!(matches!(
            FileTransaction::begin(&path),
            Err(TransactionError::BackupConflict { .. })
        ));
        outer.rollback().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }
}
