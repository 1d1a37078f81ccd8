//! `usysconf` command-line entry point.
use anyhow::Result;
use clap::Parser;

use usysconf::config::Paths;
use usysconf::{cli, commands, logging};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    match args.command {
        cli::Command::Run => {
            let paths = Paths::resolve(&args.global.path_overrides());
            let log_file = logging::log_file_path(&paths.log_dir, "run");
            let log = logging::Logger::new(logging::init_subscriber(
                args.debug,
                Some(log_file.as_path()),
            ));
            commands::run::run(&args.global, &paths, &log)
        }
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
