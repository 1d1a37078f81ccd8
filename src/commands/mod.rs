//! Subcommand handlers.
pub mod run;
pub mod version;

use anyhow::Result;

use crate::logging::Logger;
use crate::triggers::{Outcome, RunSummary};

/// Print the summary and bail if any trigger failed.
///
/// # Errors
///
/// Returns an error if one or more triggers recorded a failure.
pub fn report(summary: &RunSummary, log: &Logger) -> Result<()> {
    log.print_summary(summary);

    if summary.has_failures() {
        anyhow::bail!("{} trigger(s) failed", summary.count(Outcome::Failed));
    }
    Ok(())
}
