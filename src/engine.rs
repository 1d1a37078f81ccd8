//! One invocation, end to end: load, lock, resolve, execute, record.
use std::fmt;
use std::sync::Arc;

use crate::config::{self, Paths, TriggerDefinition};
use crate::error::Error;
use crate::exec::{CommandRunner, SystemRunner};
use crate::ledger::{self, Ledger, LedgerLock};
use crate::logging::Log;
use crate::triggers::{self, ExecutionResult, Outcome, RunContext, RunSummary};

/// Wires the definition store, ledger, resolver and executor together.
pub struct Engine {
    paths: Paths,
    runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Engine spawning real processes.
    #[must_use]
    pub fn new(paths: Paths) -> Self {
        Self::with_runner(paths, Arc::new(SystemRunner))
    }

    /// Engine spawning through `runner`.
    #[must_use]
    pub const fn with_runner(paths: Paths, runner: Arc<dyn CommandRunner>) -> Self {
        Self { paths, runner }
    }

    /// Run every trigger that needs running under `ctx`.
    ///
    /// Trigger failures are reported in the returned summary and never stop
    /// the run. The ledger is locked for the whole run and saved once at the
    /// end, unless `ctx.dry_run` is set, in which case it is neither locked
    /// nor written.
    ///
    /// # Errors
    ///
    /// Returns an error before any trigger runs if a definition cannot be
    /// loaded, the ledger is locked by another run, or the ledger cannot be
    /// read. Returns an error after the run if the ledger cannot be saved.
    pub fn run(&self, ctx: &RunContext, log: &dyn Log) -> Result<RunSummary, Error> {
        log.stage("Loading trigger definitions");
        let definitions = config::store::load(&self.paths.usr_dir, &self.paths.sys_dir)?;
        log.info(&format!("{} trigger definition(s)", definitions.len()));

        let _lock = (!ctx.dry_run)
            .then(|| LedgerLock::acquire(&self.paths.ledger))
            .transpose()?;
        let mut ledger = Ledger::load(&self.paths.ledger)?;

        let resolution = triggers::resolve(&definitions, &ledger, ctx);
        for warning in &resolution.warnings {
            log.debug(&format!("ignoring --names entry: {warning}"));
        }

        let mut summary = RunSummary {
            results: Vec::with_capacity(definitions.len()),
            warnings: resolution.warnings,
        };
        for (def, reason) in &resolution.skipped {
            log.debug(&format!("{}: skipped ({reason})", def.name));
            summary
                .results
                .push(ExecutionResult::skipped(&def.name, *reason));
        }

        if resolution.triggers.is_empty() {
            log.info("nothing to do");
        } else {
            log.stage("Running triggers");
        }
        for def in &resolution.triggers {
            let result = self.run_one(def, ctx, log);
            if !ctx.dry_run && result.was_attempted() {
                ledger.record(
                    &def.name,
                    ledger::fingerprint(&def.paths),
                    result.outcome == Outcome::Succeeded,
                );
            }
            summary.results.push(result);
        }

        if !ctx.dry_run {
            ledger.save(&self.paths.ledger)?;
        }
        Ok(summary)
    }

    fn run_one(
        &self,
        def: &TriggerDefinition,
        ctx: &RunContext,
        log: &dyn Log,
    ) -> ExecutionResult {
        if !ctx.dry_run {
            if def.description.is_empty() {
                log.info(&def.name);
            } else {
                log.info(&format!("{}: {}", def.name, def.description));
            }
        }

        let result = triggers::execute(def, ctx, self.runner.as_ref());

        for line in result.stdout.lines() {
            log.debug(&format!("{}: {line}", def.name));
        }
        let failed = result.outcome == Outcome::Failed;
        for line in result.stderr.lines() {
            if failed {
                log.warn(&format!("{}: {line}", def.name));
            } else {
                log.debug(&format!("{}: {line}", def.name));
            }
        }

        let detail = result.message.as_deref().unwrap_or_default();
        match result.outcome {
            Outcome::Succeeded => {
                log.debug(&format!("{}: done in {:.2?}", def.name, result.duration));
            }
            Outcome::Failed => log.error(&format!("{}: {detail}", def.name)),
            Outcome::Skipped => log.info(&format!("{}: skipped ({detail})", def.name)),
            Outcome::DryRun => log.dry_run(&format!("would run {}: {detail}", def.name)),
        }
        result
    }
}
