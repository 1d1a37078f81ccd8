//! Trigger definitions and the directory layout they are loaded from.
pub mod definition;
pub mod store;

use std::path::PathBuf;

pub use definition::{Layer, TriggerDefinition};
pub use store::Definitions;

/// Vendor-default definitions shipped by packages.
pub const DEFAULT_USR_DIR: &str = "/usr/share/defaults/usysconf.d";
/// Administrator overrides.
pub const DEFAULT_SYS_DIR: &str = "/etc/usysconf.d";
/// Persisted run ledger.
pub const DEFAULT_LEDGER: &str = "/var/lib/usysconf/ledger.json";
/// Per-command log files.
pub const DEFAULT_LOG_DIR: &str = "/var/log/usysconf";

/// Filesystem locations consumed and produced by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Vendor-default definition directory (read-only layer).
    pub usr_dir: PathBuf,
    /// Administrator override directory.
    pub sys_dir: PathBuf,
    /// Ledger file.
    pub ledger: PathBuf,
    /// Directory receiving `<command>.log`.
    pub log_dir: PathBuf,
}

/// Explicit per-directory overrides, typically taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    /// `--usr-dir`
    pub usr_dir: Option<PathBuf>,
    /// `--sys-dir`
    pub sys_dir: Option<PathBuf>,
    /// `--ledger`
    pub ledger: Option<PathBuf>,
    /// `--log-dir`
    pub log_dir: Option<PathBuf>,
}

impl Paths {
    /// Resolve every location from, in order of precedence: the explicit
    /// override, the runtime environment variable, the value baked in at
    /// build time, and the built-in default.
    #[must_use]
    pub fn resolve(overrides: &PathOverrides) -> Self {
        Self::resolve_with(overrides, |var| std::env::var(var).ok())
    }

    /// Like [`Paths::resolve`], reading environment variables through `env`.
    #[must_use]
    pub fn resolve_with(overrides: &PathOverrides, env: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |explicit: &Option<PathBuf>, var: &str, built: Option<&str>, default: &str| {
            explicit
                .clone()
                .or_else(|| env(var).filter(|v| !v.is_empty()).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(built.unwrap_or(default)))
        };

        Self {
            usr_dir: pick(
                &overrides.usr_dir,
                "USYSCONF_USR_DIR",
                option_env!("USYSCONF_USR_DIR"),
                DEFAULT_USR_DIR,
            ),
            sys_dir: pick(
                &overrides.sys_dir,
                "USYSCONF_SYS_DIR",
                option_env!("USYSCONF_SYS_DIR"),
                DEFAULT_SYS_DIR,
            ),
            ledger: pick(
                &overrides.ledger,
                "USYSCONF_LEDGER",
                option_env!("USYSCONF_LEDGER"),
                DEFAULT_LEDGER,
            ),
            log_dir: pick(
                &overrides.log_dir,
                "USYSCONF_LOG_DIR",
                option_env!("USYSCONF_LOG_DIR"),
                DEFAULT_LOG_DIR,
            ),
        }
    }
}
