//! `dotpkg` command-line entry point.
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;

use dotpkg_cli::cli::Cli;
use dotpkg_cli::commands;
use dotpkg_cli::logging::{self, Log, Logger, RunInfo};
use dotpkg_cli::reconcile::Mode;

fn main() -> Result<ExitCode> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let (mode, config) = args.mode().context("one of --deploy or --check is required")?;

    let command = mode.to_string();
    logging::init_subscriber(
        args.verbose,
        &RunInfo {
            command: &command,
            config,
            dry_run: args.dry_run,
        },
    );
    let log = Arc::new(Logger::new(&command));
    let shared: Arc<dyn Log> = log.clone();

    let result = match mode {
        Mode::Deploy => commands::deploy::run(config, args.dry_run, &shared),
        Mode::Check => commands::check::run(config, &shared),
    };

    log.print_summary();

    match result {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => {
            log.error(&format!("{} package(s) failed", log.failure_count()));
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            log.error(&format!("{e:#}"));
            Ok(ExitCode::FAILURE)
        }
    }
}
