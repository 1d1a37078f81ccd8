//! Deciding which triggers run and running them.
pub mod execute;
pub mod resolve;

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::error::{NameNotFound, TriggerError};

pub use execute::execute;
pub use resolve::{Resolution, resolve};

/// Options for one invocation, built once by the command layer.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    /// Run every selected trigger, including disabled and unchanged ones.
    pub forced: bool,
    /// Invoked from inside a chroot.
    pub chroot: bool,
    /// Invoked from a live medium.
    pub live: bool,
    /// Resolve and report without executing or persisting anything.
    pub dry_run: bool,
    /// Restrict the run to these names; empty selects all.
    pub names: BTreeSet<String>,
}

/// Why a trigger did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `skip = true` in the definition.
    Disabled,
    /// Watched paths match the last successful run.
    Unchanged,
    /// `skip_chroot` while running in a chroot.
    Chroot,
    /// `skip_live` while running from a live medium.
    Live,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disabled => "disabled",
            Self::Unchanged => "unchanged",
            Self::Chroot => "not run in a chroot",
            Self::Live => "not run from a live medium",
        })
    }
}

/// Final state of one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The binary exited with status 0.
    Succeeded,
    /// The binary could not be launched or exited unsuccessfully.
    Failed,
    /// The trigger was not attempted.
    Skipped,
    /// Dry run: the binary resolved but was not executed.
    DryRun,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
        })
    }
}

/// What happened to one trigger.
#[derive(Debug)]
pub struct ExecutionResult {
    /// Trigger name.
    pub name: String,
    /// Final state.
    pub outcome: Outcome,
    /// Exit code of the binary, when it ran to completion.
    pub exit_code: Option<i32>,
    /// Wall-clock time spent on the trigger.
    pub duration: Duration,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Cause of a [`Outcome::Failed`] result.
    pub error: Option<TriggerError>,
    /// Short detail for the summary (skip reason, dry-run command line).
    pub message: Option<String>,
}

impl ExecutionResult {
    fn new(name: &str, outcome: Outcome) -> Self {
        Self {
            name: name.to_string(),
            outcome,
            exit_code: None,
            duration: Duration::ZERO,
            stdout: String::new(),
            stderr: String::new(),
            error: None,
            message: None,
        }
    }

    /// A trigger that was not attempted.
    #[must_use]
    pub fn skipped(name: &str, reason: SkipReason) -> Self {
        Self {
            message: Some(reason.to_string()),
            ..Self::new(name, Outcome::Skipped)
        }
    }

    /// A trigger that failed with `error`.
    #[must_use]
    pub fn failed(name: &str, error: TriggerError, duration: Duration) -> Self {
        Self {
            message: Some(error.to_string()),
            error: Some(error),
            duration,
            ..Self::new(name, Outcome::Failed)
        }
    }

    /// Whether the binary actually ran (or was attempted) and the ledger
    /// should remember the attempt.
    #[must_use]
    pub const fn was_attempted(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded | Outcome::Failed)
    }
}

/// Everything one run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Results in execution order; resolver skips come first.
    pub results: Vec<ExecutionResult>,
    /// Requested names that match no definition.
    pub warnings: Vec<NameNotFound>,
}

impl RunSummary {
    /// Number of results with `outcome`.
    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Whether any trigger failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.count(Outcome::Failed) > 0
    }

    /// One-line totals, e.g. `3 triggers: 1 succeeded, 1 failed, 1 skipped, 0 dry-run`.
    #[must_use]
    pub fn totals(&self) -> String {
        format!(
            "{} triggers: {} succeeded, {} failed, {} skipped, {} dry-run",
            self.results.len(),
            self.count(Outcome::Succeeded),
            self.count(Outcome::Failed),
            self.count(Outcome::Skipped),
            self.count(Outcome::DryRun),
        )
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn skipped_result_carries_reason() {
        let r = ExecutionResult::skipped("fonts", SkipReason::Unchanged);
        assert_eq!(r.outcome, Outcome::Skipped);
        assert_eq!(r.message.as_deref(), Some("unchanged"));
        assert!(!r.was_attempted());
    }

    #[test]
    fn failed_result_is_attempted() {
        let r = ExecutionResult::failed(
            "fonts",
            TriggerError::Failed {
                binary: "fc-cache".to_string(),
                code: 1,
            },
            Duration::from_millis(5),
        );
        assert!(r.was_attempted());
        assert!(r.error.is_some());
    }

    #[test]
    fn summary_totals() {
        let mut summary = RunSummary::default();
        summary.results.push(ExecutionResult::new("a", Outcome::Succeeded));
        summary.results.push(ExecutionResult::skipped("b", SkipReason::Disabled));
        summary.results.push(ExecutionResult::new("c", Outcome::Failed));
        assert!(summary.has_failures());
        insta::assert_snapshot!(
            summary.totals(),
            @"3 triggers: 1 succeeded, 1 failed, 1 skipped, 0 dry-run"
        );
    }

    #[test]
    fn empty_summary_is_not_a_failure() {
        let summary = RunSummary::default();
        assert!(!summary.has_failures());
        assert_eq!(summary.count(Outcome::Skipped), 0);
    }
}
