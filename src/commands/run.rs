//! Command: run pending triggers.
use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Paths;
use crate::engine::Engine;
use crate::logging::Logger;

/// Run the `run` command against `paths`.
///
/// # Errors
///
/// Returns an error if definitions cannot be loaded, the ledger is locked,
/// unreadable or unwritable, or any trigger failed.
pub fn run(global: &GlobalOpts, paths: &Paths, log: &Logger) -> Result<()> {
    log.debug(&format!("usysconf {}", crate::VERSION));
    log.debug(&format!("vendor definitions: {}", paths.usr_dir.display()));
    log.debug(&format!("admin definitions: {}", paths.sys_dir.display()));
    log.debug(&format!("ledger: {}", paths.ledger.display()));

    let ctx = global.run_context();
    if ctx.dry_run {
        log.dry_run("no trigger will be executed and the ledger will not be written");
    }

    let engine = Engine::new(paths.clone());
    let summary = engine.run(&ctx, log).context("trigger run aborted")?;
    super::report(&summary, log)
}
