//! Exclusive advisory lock held for the duration of a run.
//!
//! The lock lives on `<ledger>.lock` rather than on the ledger itself: each
//! save renames a fresh file over the ledger, which would silently drop a
//! lock held on the old inode.
use std::ffi::OsString;
use std::fs::{File, TryLockError};
use std::path::{Path, PathBuf};

use crate::error::LedgerError;

/// Guard for the ledger lock; released on drop.
#[derive(Debug)]
pub struct LedgerLock {
    file: File,
    path: PathBuf,
}

impl LedgerLock {
    /// Lock file guarding `ledger`.
    #[must_use]
    pub fn path_for(ledger: &Path) -> PathBuf {
        let mut name = ledger
            .file_name()
            .map_or_else(|| OsString::from("ledger"), ToOwned::to_owned);
        name.push(".lock");
        ledger.with_file_name(name)
    }

    /// Take the lock without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ConcurrentRun`] if another process (or another
    /// guard in this process) holds it, and [`LedgerError::Io`] if the lock
    /// file cannot be created.
    pub fn acquire(ledger: &Path) -> Result<Self, LedgerError> {
        let path = Self::path_for(ledger);
        let io_err = |source: std::io::Error| LedgerError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = File::options()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(io_err)?;

        match file.try_lock() {
            Ok(()) => {
                tracing::debug!("acquired {}", path.display());
                Ok(Self { file, path })
            }
            Err(TryLockError::WouldBlock) => Err(LedgerError::ConcurrentRun { path }),
            Err(TryLockError::Error(source)) => Err(LedgerError::Io { path, source }),
        }
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if self.file.unlock().is_ok() {
            tracing::debug!("released {}", self.path.display());
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lock_path_is_sibling_of_ledger() {
        assert_eq!(
            LedgerLock::path_for(Path::new("/var/lib/usysconf/ledger.json")),
            PathBuf::from("/var/lib/usysconf/ledger.json.lock")
        );
    }

    #[test]
    fn second_acquire_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.json");

        let held = LedgerLock::acquire(&ledger).unwrap();
        let err = LedgerLock::acquire(&ledger).unwrap_err();
        assert!(matches!(err, LedgerError::ConcurrentRun { .. }));
        drop(held);
    }

    #[test]
    fn lock_is_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("nested/ledger.json");

        drop(LedgerLock::acquire(&ledger).unwrap());
        let again = LedgerLock::acquire(&ledger).unwrap();
        assert!(again.path().exists());
    }
}
