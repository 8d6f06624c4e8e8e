//! Command-line entry point for `dotlayers`.
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use dotlayers::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if matches!(args.command, cli::Command::Version) {
        commands::version::run();
        return Ok(());
    }

    logging::init_subscriber(args.verbose, args.command.name());
    let log = Arc::new(logging::Logger::new(args.command.name()));

    match &args.command {
        cli::Command::Status => commands::status::run(&args.global, &log),
        cli::Command::Doctor(opts) => commands::doctor::run(&args.global, opts, &log),
        cli::Command::Merge(opts) => commands::layer::run_merge(&args.global, opts, &log),
        cli::Command::Unmerge(opts) => commands::layer::run_unmerge(&args.global, opts, &log),
        cli::Command::ForceOut(opts) => {
            commands::force::run(&args.global, opts, commands::force::Direction::Out, &log)
        }
        cli::Command::ForceIn(opts) => {
            commands::force::run(&args.global, opts, commands::force::Direction::In, &log)
        }
        cli::Command::Version => Ok(()),
    }
}
