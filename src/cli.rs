//! Command-line interface definition.
use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::reconcile::Mode;

/// Top-level CLI entry point for the package deployer.
#[derive(Parser, Debug)]
#[command(
    name = "dotpkg",
    about = "Deploy and verify declarative file packages",
    version
)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["deploy", "check"])
))]
pub struct Cli {
    /// Deploy every package described by this config file
    #[arg(short, long, value_name = "CONFIG")]
    pub deploy: Option<PathBuf>,

    /// Verify every package described by this config file
    #[arg(short, long, value_name = "CONFIG")]
    pub check: Option<PathBuf>,

    /// Preview changes without applying (deploy only)
    #[arg(short = 'n', long, requires = "deploy")]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The selected mode and its config file.
    ///
    /// The argument group guarantees exactly one is present after parsing.
    #[must_use]
    pub fn mode(&self) -> Option<(Mode, &PathBuf)> {
        self.deploy
            .as_ref()
            .map(|path| (Mode::Deploy, path))
            .or_else(|| self.check.as_ref().map(|path| (Mode::Check, path)))
    }
}
