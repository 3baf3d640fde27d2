//! `--check` command implementation.
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::logging::Log;
use crate::reconcile::Mode;

/// Verify every package described by the config at `config_path`.
///
/// Returns `true` if every eligible package matches the filesystem.
///
/// # Errors
///
/// Returns an error if the configuration or a package is unusable.
pub fn run(config_path: &Path, log: &Arc<dyn Log>) -> Result<bool> {
    let setup = super::CommandSetup::init(config_path, log.as_ref())?;
    super::run_packages(Mode::Check, &setup, log, false)
}
