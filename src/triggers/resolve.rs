//! Selection and ordering of the triggers that must run.
use crate::config::{Definitions, TriggerDefinition};
use crate::error::NameNotFound;
use crate::ledger::{self, Ledger};

use super::{RunContext, SkipReason};

/// Work list produced by [`resolve`].
#[derive(Debug, Default)]
pub struct Resolution<'a> {
    /// Triggers to execute, sorted by `(priority, name)`.
    pub triggers: Vec<&'a TriggerDefinition>,
    /// Selected triggers that will not run, in name order.
    pub skipped: Vec<(&'a TriggerDefinition, SkipReason)>,
    /// Requested names with no definition.
    pub warnings: Vec<NameNotFound>,
}

/// Compute the ordered set of triggers that must run for `ctx`.
///
/// Identical definitions and ledger always yield the same order.
#[must_use]
pub fn resolve<'a>(
    definitions: &'a Definitions,
    ledger: &Ledger,
    ctx: &RunContext,
) -> Resolution<'a> {
    let mut resolution = Resolution {
        warnings: ctx
            .names
            .iter()
            .filter(|name| !definitions.contains_key(name.as_str()))
            .map(|name| NameNotFound(name.clone()))
            .collect(),
        ..Resolution::default()
    };

    for def in definitions.values() {
        if !ctx.names.is_empty() && !ctx.names.contains(&def.name) {
            continue;
        }
        if def.skip && !ctx.forced {
            tracing::debug!("{}: disabled", def.name);
            resolution.skipped.push((def, SkipReason::Disabled));
            continue;
        }
        if ctx.forced || is_dirty(def, ledger) {
            resolution.triggers.push(def);
        } else {
            tracing::debug!("{}: unchanged since last run", def.name);
            resolution.skipped.push((def, SkipReason::Unchanged));
        }
    }

    resolution
        .triggers
        .sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));
    resolution
}

/// Whether `def` needs to run according to the ledger.
fn is_dirty(def: &TriggerDefinition, ledger: &Ledger) -> bool {
    let Some(entry) = ledger.get(&def.name) else {
        tracing::debug!("{}: never run", def.name);
        return true;
    };
    if !entry.succeeded {
        tracing::debug!("{}: last run failed", def.name);
        return true;
    }
    if def.always_dirty() {
        return true;
    }
    let current = ledger::fingerprint(&def.paths);
    let changed = entry.fingerprint != current;
    if changed {
        tracing::debug!("{}: watched paths changed", def.name);
    }
    changed
}
