//! Domain-specific error types for the trigger engine.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`LedgerError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! Error
//! ├── Config(ConfigError)   : definition loading; fatal to the run
//! └── Ledger(LedgerError)   : ledger I/O and locking; fatal to the run
//!
//! TriggerError              : per-trigger; recorded in the summary only
//! NameNotFound              : unknown `--names` entry; a warning only
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that abort a run before any trigger executes.
#[derive(Error, Debug)]
pub enum Error {
    /// Trigger definitions could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The ledger could not be read, written or locked.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors that arise while loading trigger definitions.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A definition file is malformed. One bad file fails the whole load.
    #[error("Invalid trigger definition {}: {reason}", .file.display())]
    Parse {
        /// Path of the offending file.
        file: PathBuf,
        /// Human-readable reason.
        reason: String,
    },

    /// A definition directory or file could not be read.
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from the persisted ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Reading, writing or locking the ledger failed.
    #[error("IO error on ledger {}: {source}", .path.display())]
    Io {
        /// Ledger (or lock file) path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The ledger exists but cannot be parsed.
    #[error("Ledger {} is corrupt: {reason}", .path.display())]
    Corrupt {
        /// Ledger path.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Another invocation holds the ledger lock.
    #[error("Another usysconf run holds the lock {}", .path.display())]
    ConcurrentRun {
        /// Lock file path.
        path: PathBuf,
    },
}

/// Per-trigger errors. They never abort sibling triggers.
#[derive(Error, Debug)]
pub enum TriggerError {
    /// The binary could not be found or started.
    #[error("cannot launch '{binary}': {source}")]
    Launch {
        /// Binary as declared in the definition.
        binary: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The binary ran and exited with a non-zero code.
    #[error("'{binary}' exited with code {code}")]
    Failed {
        /// Binary as declared in the definition.
        binary: String,
        /// Exit code.
        code: i32,
    },

    /// The binary was terminated by a signal before exiting.
    #[error("'{binary}' was terminated by a signal")]
    Killed {
        /// Binary as declared in the definition.
        binary: String,
    },

    /// A stale path listed under `remove` could not be deleted.
    #[error("cannot remove {}: {source}", .path.display())]
    Remove {
        /// Path that could not be removed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// A name requested with `--names` matches no definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no trigger named '{0}'")]
pub struct NameNotFound(pub String);
