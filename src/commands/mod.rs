//! Top-level command orchestration shared by `--deploy` and `--check`.
pub mod check;
pub mod deploy;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::environment::EnvOverrides;
use crate::logging::{Log, PackageStatus};
use crate::platform::Platform;
use crate::reconcile::{Mode, Outcome, Reconciler, package_name};

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected platform.
    pub platform: Platform,
    /// Loaded top-level configuration.
    pub config: Config,
    /// Environment overlay built from `additional_envs`.
    pub env: EnvOverrides,
}

impl CommandSetup {
    /// Detect the platform, load the configuration and build the overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read or parsed.
    pub fn init(config_path: &Path, log: &dyn Log) -> Result<Self> {
        let platform = Platform::detect();
        let version = option_env!("DOTPKG_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        log.debug(&format!("dotpkg {version} on {platform}"));

        log.stage("Loading configuration");
        let config = Config::load(config_path)?;
        log.debug(&format!("config: {}", config.path.display()));
        log.debug(&format!("hooks: {}", config.hooks_dir.display()));
        log.debug(&format!("packages: {}", config.pkgs_dir.display()));

        let env = EnvOverrides::from_config(&config.additional_envs);
        for (name, value) in env.overrides() {
            log.debug(&format!("env {name}={value}"));
        }

        Ok(Self {
            platform,
            config,
            env,
        })
    }
}

/// Immediate subdirectories of `pkgs_dir`, sorted by name.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn discover_packages(pkgs_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut packages: Vec<PathBuf> = std::fs::read_dir(pkgs_dir)
        .with_context(|| format!("reading packages directory {}", pkgs_dir.display()))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    packages.sort();
    Ok(packages)
}

/// Reconcile every package in order and record each result.
///
/// Returns `true` if every package succeeded.
///
/// # Errors
///
/// Returns an error, aborting the run, if a package has an unusable manifest
/// or declares a missing source.
pub fn run_packages(
    mode: Mode,
    setup: &CommandSetup,
    log: &Arc<dyn Log>,
    dry_run: bool,
) -> Result<bool> {
    let packages = discover_packages(&setup.config.pkgs_dir)?;
    log.stage(&format!("{} {} package(s)", stage_verb(mode), packages.len()));

    let reconciler = Reconciler::new(
        setup.env.clone(),
        Arc::clone(log),
        setup.platform,
        dry_run,
    );
    let mut all_ok = true;

    for package_dir in &packages {
        let name = package_name(package_dir);
        let outcome = match reconciler.reconcile(mode, package_dir) {
            Ok(outcome) => outcome,
            Err(e) => {
                log.record_package(&name, PackageStatus::Failed, Some(&e.to_string()));
                return Err(e).with_context(|| format!("package '{name}'"));
            }
        };

        if mode == Mode::Check {
            log.check(&name, outcome.succeeded());
        }
        all_ok &= outcome.succeeded();

        let (status, message) = match outcome {
            Outcome::Success if dry_run => (PackageStatus::DryRun, None),
            Outcome::Success => (PackageStatus::Ok, None),
            Outcome::Mismatch { failed } => (
                PackageStatus::Failed,
                Some(format!("{failed} target(s) {}", failure_noun(mode))),
            ),
            Outcome::Ineligible(policy) => {
                (PackageStatus::NotApplicable, Some(policy.to_string()))
            }
        };
        log.record_package(&name, status, message.as_deref());
    }

    Ok(all_ok)
}

const fn stage_verb(mode: Mode) -> &'static str {
    match mode {
        Mode::Deploy => "Deploying",
        Mode::Check => "Checking",
    }
}

const fn failure_noun(mode: Mode) -> &'static str {
    match mode {
        Mode::Deploy => "failed",
        Mode::Check => "differ",
    }
}
