//! Structured logger facade and run summary rendering.
use std::path::{Path, PathBuf};

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::Log;
use crate::triggers::{Outcome, RunSummary};

/// Implement the methods of [`Log`] by delegating to inherent methods of the
/// same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger emitting through [`tracing`].
///
/// Where messages end up is decided by
/// [`init_subscriber`](super::subscriber::init_subscriber); the logger only
/// remembers the log file so the summary can point at it.
#[derive(Debug, Default)]
pub struct Logger {
    log_file: Option<PathBuf>,
}

#[allow(clippy::unused_self)]
impl Logger {
    /// Create a new logger. `log_file` is the file the subscriber writes to,
    /// if any.
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>) -> Self {
        Self { log_file }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless `--debug`; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Print one line per trigger followed by the totals.
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self, summary: &RunSummary) {
        for warning in &summary.warnings {
            self.warn(&warning.to_string());
        }
        if summary.results.is_empty() {
            self.info("no triggers selected");
            return;
        }

        println!();
        self.stage("Summary");

        for result in &summary.results {
            let (icon, color) = match result.outcome {
                Outcome::Succeeded => ("✓", "\x1b[32m"),
                Outcome::Skipped => ("○", "\x1b[2m"),
                Outcome::DryRun => ("~", "\x1b[37m"),
                Outcome::Failed => ("✗", "\x1b[31m"),
            };
            let suffix = result
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", result.name));
        }

        println!();
        self.info(&summary.totals());

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);
}
