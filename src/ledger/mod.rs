//! Persisted record of which triggers ran, against what input, and how it
//! went.
//!
//! The ledger is read once when a run starts and written once when it ends.
//! Writes go to a temporary sibling that is renamed over the previous file,
//! so an interrupted save leaves either the old or the new ledger behind.
pub mod fingerprint;
pub mod lock;

use std::collections::BTreeMap;
use std::io::{self, Write as _};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

pub use fingerprint::fingerprint;
pub use lock::LedgerLock;

/// On-disk format version.
const LEDGER_VERSION: u32 = 1;

/// State recorded after a trigger executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Fingerprint of the watched paths after the run; `None` when the
    /// trigger watches nothing.
    pub fingerprint: Option<String>,
    /// When the trigger last ran.
    pub timestamp: DateTime<Utc>,
    /// Whether that run succeeded.
    pub succeeded: bool,
}

/// All recorded entries, keyed by trigger name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    version: u32,
    triggers: BTreeMap<String, LedgerEntry>,
}

impl Ledger {
    /// An empty ledger, as seen on the very first run.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            version: LEDGER_VERSION,
            triggers: BTreeMap::new(),
        }
    }

    /// Read the ledger at `path`. A missing file is an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] if the file cannot be read and
    /// [`LedgerError::Corrupt`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("no ledger at {}, starting fresh", path.display());
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(LedgerError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let corrupt = |reason: String| LedgerError::Corrupt {
            path: path.to_path_buf(),
            reason,
        };
        let ledger: Self = serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;
        if ledger.version != LEDGER_VERSION {
            return Err(corrupt(format!("unsupported version {}", ledger.version)));
        }
        tracing::debug!("loaded {} ledger entries from {}", ledger.len(), path.display());
        Ok(ledger)
    }

    /// Atomically replace the ledger at `path` with this one.
    ///
    /// The parent directory is created when missing.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] if the temporary file cannot be written,
    /// synced or renamed into place. The previous ledger is left untouched.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let io_err = |source: io::Error| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        };

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(io_err)?;

        let json = serde_json::to_string_pretty(self).map_err(|e| io_err(e.into()))?;

        // Same directory so the rename never crosses a filesystem boundary.
        let mut tmp = tempfile::Builder::new()
            .prefix(".ledger")
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.write_all(b"\n").map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        tracing::debug!("saved {} ledger entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Entry for `name`, if the trigger ever ran.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LedgerEntry> {
        self.triggers.get(name)
    }

    /// Record the outcome of a run of `name`.
    pub fn record(&mut self, name: &str, fingerprint: Option<String>, succeeded: bool) {
        self.triggers.insert(
            name.to_string(),
            LedgerEntry {
                fingerprint,
                timestamp: Utc::now(),
                succeeded,
            },
        );
    }

    /// Number of recorded triggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Whether no trigger has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Iterate over `(name, entry)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.triggers.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
