//! Command-line interface.
use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::PathOverrides;
use crate::triggers::RunContext;

/// Top-level CLI entry point for the trigger runner.
#[derive(Parser, Debug)]
#[command(
    name = "usysconf",
    about = "Run the system configuration triggers left pending by package operations",
    version = crate::VERSION
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Print debug messages
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Run triggers even if they are unchanged or disabled
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Running inside a chroot
    #[arg(short, long, global = true)]
    pub chroot: bool,

    /// Running from a live medium
    #[arg(short, long, global = true)]
    pub live: bool,

    /// Show what would run without running it
    #[arg(long, global = true)]
    pub norun: bool,

    /// Only consider these triggers (comma separated)
    #[arg(short, long, global = true, value_delimiter = ',')]
    pub names: Vec<String>,

    /// Override the vendor definition directory
    #[arg(long, global = true, value_name = "DIR")]
    pub usr_dir: Option<PathBuf>,

    /// Override the administrator definition directory
    #[arg(long, global = true, value_name = "DIR")]
    pub sys_dir: Option<PathBuf>,

    /// Override the ledger file
    #[arg(long, global = true, value_name = "FILE")]
    pub ledger: Option<PathBuf>,

    /// Override the log directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl GlobalOpts {
    /// The per-invocation options handed to the engine.
    #[must_use]
    pub fn run_context(&self) -> RunContext {
        let names: BTreeSet<String> = self
            .names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(ToString::to_string)
            .collect();
        RunContext {
            forced: self.force,
            chroot: self.chroot,
            live: self.live,
            dry_run: self.norun,
            names,
        }
    }

    /// Directory overrides given on the command line.
    #[must_use]
    pub fn path_overrides(&self) -> PathOverrides {
        PathOverrides {
            usr_dir: self.usr_dir.clone(),
            sys_dir: self.sys_dir.clone(),
            ledger: self.ledger.clone(),
            log_dir: self.log_dir.clone(),
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run every trigger whose inputs changed since its last run
    Run,
    /// Print version information
    Version,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run() {
        let cli = Cli::parse_from(["usysconf", "run"]);
        assert_eq!(cli.command, Command::Run);
        assert_eq!(cli.global.run_context(), RunContext::default());
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["usysconf", "version"]);
        assert_eq!(cli.command, Command::Version);
    }

    #[test]
    fn parse_debug_short() {
        let cli = Cli::parse_from(["usysconf", "-d", "run"]);
        assert!(cli.debug);
    }

    #[test]
    fn flags_after_subcommand() {
        let cli = Cli::parse_from(["usysconf", "run", "-f", "-c", "-l", "--norun"]);
        let ctx = cli.global.run_context();
        assert!(ctx.forced);
        assert!(ctx.chroot);
        assert!(ctx.live);
        assert!(ctx.dry_run);
    }

    #[test]
    fn names_are_comma_separated_and_deduplicated() {
        let cli = Cli::parse_from(["usysconf", "-n", "fonts,ldconfig,,fonts", "run"]);
        let ctx = cli.global.run_context();
        assert_eq!(
            ctx.names.into_iter().collect::<Vec<_>>(),
            vec!["fonts", "ldconfig"]
        );
    }

    #[test]
    fn names_long_form_repeated() {
        let cli = Cli::parse_from(["usysconf", "run", "--names", "a", "--names", "b"]);
        assert_eq!(cli.global.names, vec!["a", "b"]);
    }

    #[test]
    fn directory_overrides() {
        let cli = Cli::parse_from([
            "usysconf",
            "--usr-dir",
            "/tmp/usr",
            "--sys-dir",
            "/tmp/etc",
            "--ledger",
            "/tmp/ledger.json",
            "--log-dir",
            "/tmp/log",
            "run",
        ]);
        let overrides = cli.global.path_overrides();
        assert_eq!(overrides.usr_dir, Some(PathBuf::from("/tmp/usr")));
        assert_eq!(overrides.sys_dir, Some(PathBuf::from("/tmp/etc")));
        assert_eq!(overrides.ledger, Some(PathBuf::from("/tmp/ledger.json")));
        assert_eq!(overrides.log_dir, Some(PathBuf::from("/tmp/log")));
    }

    #[test]
    fn help_subcommand_is_available() {
        let err = Cli::try_parse_from(["usysconf", "help", "run"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["usysconf"]).is_err());
    }
}
