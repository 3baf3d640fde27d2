//! `--deploy` command implementation.
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::logging::Log;
use crate::reconcile::Mode;

/// Deploy every package described by the config at `config_path`.
///
/// Returns `true` if every package deployed cleanly.
///
/// # Errors
///
/// Returns an error if the configuration or a package is unusable.
pub fn run(config_path: &Path, dry_run: bool, log: &Arc<dyn Log>) -> Result<bool> {
    let setup = super::CommandSetup::init(config_path, log.as_ref())?;
    if dry_run {
        log.dry_run("no changes will be written");
    }
    super::run_packages(Mode::Deploy, &setup, log, dry_run)
}
