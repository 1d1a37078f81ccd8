//! Post-transaction trigger runner.
//!
//! After packages are installed or removed, `usysconf` runs the vendor- and
//! administrator-defined triggers (font caches, icon indexes, linker cache,
//! ...) whose watched paths changed since their last successful run.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: load and merge TOML trigger definitions from the vendor
//!   and admin directories
//! - **[`ledger`]**: the persisted record of past runs, its fingerprints and
//!   its lock
//! - **[`triggers`]**: decide what runs, then run it one trigger at a time
//! - **[`engine`]**: one invocation from loading to saving the ledger
//! - **[`commands`]**: top-level subcommand handlers (`run`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod glob;
pub mod ledger;
pub mod logging;
pub mod triggers;

/// Version string, embedded at build time when available.
pub const VERSION: &str = match option_env!("USYSCONF_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
