//! Running a single trigger.
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::TriggerDefinition;
use crate::error::TriggerError;
use crate::exec::{CommandRunner, CommandSpec};
use crate::glob;

use super::{ExecutionResult, Outcome, RunContext, SkipReason};

/// Run `def` through `runner`.
///
/// Never returns an error: launch problems and non-zero exits become an
/// [`Outcome::Failed`] result so the remaining triggers still run.
#[must_use]
pub fn execute(
    def: &TriggerDefinition,
    ctx: &RunContext,
    runner: &dyn CommandRunner,
) -> ExecutionResult {
    if def.skip_chroot && ctx.chroot {
        return ExecutionResult::skipped(&def.name, SkipReason::Chroot);
    }
    if def.skip_live && ctx.live {
        return ExecutionResult::skipped(&def.name, SkipReason::Live);
    }

    let start = Instant::now();
    let launch_err = |source: io::Error| TriggerError::Launch {
        binary: def.binary.clone(),
        source,
    };

    let program = match runner.resolve(&def.binary) {
        Ok(program) => program,
        Err(e) => return ExecutionResult::failed(&def.name, launch_err(e), start.elapsed()),
    };

    if ctx.dry_run {
        return ExecutionResult {
            message: Some(command_line(&program, &def.arguments)),
            duration: start.elapsed(),
            ..ExecutionResult::new(&def.name, Outcome::DryRun)
        };
    }

    if let Err(e) = remove_stale(def) {
        return ExecutionResult::failed(&def.name, e, start.elapsed());
    }

    let spec = CommandSpec {
        program,
        args: def.arguments.clone(),
        env: environment(def, ctx),
    };
    tracing::debug!("{}: running {}", def.name, command_line(&spec.program, &spec.args));

    let output = match runner.run(&spec) {
        Ok(output) => output,
        Err(e) => return ExecutionResult::failed(&def.name, launch_err(e), start.elapsed()),
    };
    let duration = start.elapsed();

    let mut result = if output.success {
        ExecutionResult {
            duration,
            ..ExecutionResult::new(&def.name, Outcome::Succeeded)
        }
    } else {
        let error = match output.code {
            Some(code) => TriggerError::Failed {
                binary: def.binary.clone(),
                code,
            },
            None => TriggerError::Killed {
                binary: def.binary.clone(),
            },
        };
        ExecutionResult::failed(&def.name, error, duration)
    };
    result.exit_code = output.code;
    result.stdout = output.stdout;
    result.stderr = output.stderr;
    result
}

/// Variables added to the child's inherited environment.
fn environment(def: &TriggerDefinition, ctx: &RunContext) -> Vec<(String, String)> {
    let flag = |b: bool| if b { "1" } else { "0" }.to_string();
    let mut env = vec![
        ("USYSCONF_TRIGGER".to_string(), def.name.clone()),
        ("USYSCONF_CHROOT".to_string(), flag(ctx.chroot)),
        ("USYSCONF_LIVE".to_string(), flag(ctx.live)),
    ];
    env.extend(def.env.iter().map(|(k, v)| (k.clone(), v.clone())));
    env
}

/// Delete paths matched by `remove` and not by `remove_exclude`.
fn remove_stale(def: &TriggerDefinition) -> Result<(), TriggerError> {
    let keep = glob::expand(&def.remove_exclude);
    for path in glob::expand_excluding(&def.remove, &def.remove_exclude) {
        remove_path(&def.name, &path, &keep)?;
    }
    Ok(())
}

/// Remove `path`. A directory holding a kept path is emptied around it
/// instead of being deleted whole.
fn remove_path(name: &str, path: &Path, keep: &BTreeSet<PathBuf>) -> Result<(), TriggerError> {
    let remove_err = |source: io::Error| TriggerError::Remove {
        path: path.to_path_buf(),
        source,
    };
    if keep.contains(path) {
        return Ok(());
    }
    let meta = match path.symlink_metadata() {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(remove_err(e)),
    };

    if meta.is_dir() && keep.iter().any(|k| k.starts_with(path)) {
        for entry in std::fs::read_dir(path).map_err(remove_err)? {
            let entry = entry.map_err(remove_err)?;
            remove_path(name, &entry.path(), keep)?;
        }
        tracing::debug!("{name}: kept {} for excluded entries", path.display());
        return Ok(());
    }

    let removed = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match removed {
        Ok(()) => tracing::debug!("{name}: removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(remove_err(e)),
    }
    Ok(())
}

fn command_line(program: &Path, args: &[String]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
