//! Per-package reconciliation: deploy or verify one package directory.
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::manifest::{self, PackageManifest, RootPolicy};
use crate::environment::EnvOverrides;
use crate::error::{DotpkgError, ReconcileError};
use crate::logging::Log;
use crate::platform::Platform;
use crate::resources::archive::Archived;
use crate::resources::copy::CopyResource;
use crate::resources::path::{expand_vars, resolve, resolve_path};
use crate::resources::symlink::LinkResource;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// What to do with each package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Bring destinations in line with the package.
    Deploy,
    /// Report whether destinations match the package, writing nothing.
    Check,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deploy => write!(f, "deploy"),
            Self::Check => write!(f, "check"),
        }
    }
}

/// One source → destination pair, both absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Existing file or directory inside the package.
    pub source: PathBuf,
    /// Where it should appear.
    pub destination: PathBuf,
}

/// Result of reconciling one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every target deployed or matched.
    Success,
    /// Some targets failed to deploy or did not match.
    Mismatch {
        /// Number of failed targets.
        failed: usize,
    },
    /// The root policy excludes the current user; nothing was touched.
    Ineligible(RootPolicy),
}

impl Outcome {
    /// `false` only for [`Outcome::Mismatch`]; ineligible packages succeed vacuously.
    #[must_use]
    pub const fn succeeded(self) -> bool {
        !matches!(self, Self::Mismatch { .. })
    }
}

/// Shared state for reconciling packages.
pub struct Reconciler {
    /// Variable overlay used to expand paths.
    pub env: EnvOverrides,
    /// Logger for output.
    pub log: Arc<dyn Log>,
    /// Host facts (effective root).
    pub platform: Platform,
    /// Log intended writes instead of performing them.
    pub dry_run: bool,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("env", &self.env)
            .field("log", &"<dyn Log>")
            .field("platform", &self.platform)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Reconciler {
    /// Create a reconciler.
    #[must_use]
    pub fn new(env: EnvOverrides, log: Arc<dyn Log>, platform: Platform, dry_run: bool) -> Self {
        Self {
            env,
            log,
            platform,
            dry_run,
        }
    }

    /// Reconcile the package at `package_dir`.
    ///
    /// Every target is attempted even after one fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or invalid, or if a
    /// declared source does not exist.  Both abort the whole run.
    pub fn reconcile(&self, mode: Mode, package_dir: &Path) -> Result<Outcome, DotpkgError> {
        let name = package_name(package_dir);
        let manifest = manifest::load(package_dir)?;

        if !manifest.root.permits(self.platform.is_root) {
            self.log
                .debug(&format!("skip {name}: {} package", manifest.root));
            return Ok(Outcome::Ineligible(manifest.root));
        }

        let targets = self.targets(&name, package_dir, &manifest)?;
        self.log.debug(&format!(
            "{mode} {name}: {} target(s), {}",
            targets.len(),
            if manifest.link { "link" } else { "copy" }
        ));

        let failed = targets
            .iter()
            .map(|target| self.reconcile_target(mode, manifest.link, target))
            .filter(|ok| !ok)
            .count();

        Ok(if failed == 0 {
            Outcome::Success
        } else {
            Outcome::Mismatch { failed }
        })
    }

    /// Resolve the patch entries (sorted) and the fallback into targets.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::SourceMissing`] for the first patch source
    /// that does not exist.
    pub fn targets(
        &self,
        name: &str,
        package_dir: &Path,
        manifest: &PackageManifest,
    ) -> Result<Vec<Target>, ReconcileError> {
        let mut targets = Vec::with_capacity(manifest.patch.len() + 1);

        for (relative, destination) in &manifest.patch {
            let source = resolve_path(&package_dir.join(expand_vars(relative, &self.env)));
            if source.symlink_metadata().is_err() {
                return Err(ReconcileError::SourceMissing {
                    package: name.to_string(),
                    source_path: source,
                });
            }
            targets.push(Target {
                source,
                destination: resolve(destination, &self.env),
            });
        }

        if let Some(fallback) = &manifest.fallback {
            targets.push(Target {
                source: resolve_path(package_dir),
                destination: resolve(fallback, &self.env),
            });
        }

        Ok(targets)
    }

    fn reconcile_target(&self, mode: Mode, link: bool, target: &Target) -> bool {
        let (source, destination) = (target.source.clone(), target.destination.clone());
        match (mode, link) {
            (Mode::Check, true) => self.check_link(&LinkResource::new(source, destination)),
            (Mode::Check, false) => CopyResource::new(source, destination).verify(&*self.log),
            (Mode::Deploy, true) => {
                self.deploy(&LinkResource::new(source, destination), target, true)
            }
            // Single files are always rewritten; only trees skip when identical.
            (Mode::Deploy, false) => {
                let skips_when_correct = target.source.is_dir();
                self.deploy(
                    &CopyResource::new(source, destination),
                    target,
                    skips_when_correct,
                )
            }
        }
    }

    fn check_link(&self, resource: &LinkResource) -> bool {
        match resource.current_state() {
            Ok(ResourceState::Correct) => true,
            Ok(ResourceState::Missing) => {
                self.log
                    .warn(&format!("missing: {}", resource.destination.display()));
                false
            }
            Ok(ResourceState::Incorrect { current }) => {
                self.log.warn(&format!(
                    "{} is {current}, expected link to {}",
                    resource.destination.display(),
                    resource.source.display()
                ));
                false
            }
            Err(e) => {
                self.log.warn(&format!("{e:#}"));
                false
            }
        }
    }

    /// Apply `resource`, or in dry-run mode log what applying would do.
    ///
    /// `skips_when_correct` tells the dry-run preview whether `apply` leaves a
    /// correct destination alone.
    fn deploy<R: Resource>(&self, resource: &R, target: &Target, skips_when_correct: bool) -> bool {
        if self.dry_run {
            return self.preview(resource, target, skips_when_correct);
        }

        match resource.apply() {
            Ok(ResourceChange::AlreadyCorrect) => {
                self.log.debug(&format!("ok: {}", resource.description()));
                true
            }
            Ok(ResourceChange::Applied { archived }) => {
                match archived {
                    Archived::Moved(slot) => {
                        self.log.info(&format!("archived to {}", slot.display()));
                    }
                    Archived::RemovedLink => self.log.debug("removed previous link"),
                    Archived::Nothing => {}
                }
                self.log.info(&resource.description());
                true
            }
            Err(e) => {
                self.log.error(&format!("{}: {e:#}", resource.description()));
                false
            }
        }
    }

    fn preview<R: Resource>(&self, resource: &R, target: &Target, skips_when_correct: bool) -> bool {
        let state = match resource.current_state() {
            Ok(state) => state,
            Err(e) => {
                self.log.warn(&format!("{e:#}"));
                return false;
            }
        };

        if skips_when_correct && state == ResourceState::Correct {
            self.log.debug(&format!("ok: {}", resource.description()));
            return true;
        }
        if state != ResourceState::Missing {
            let is_link = target
                .destination
                .symlink_metadata()
                .is_ok_and(|meta| meta.is_symlink());
            if is_link {
                self.log.dry_run(&format!(
                    "would remove link {}",
                    target.destination.display()
                ));
            } else {
                self.log.dry_run(&format!(
                    "would archive existing content for {}",
                    resource.description()
                ));
            }
        }
        self.log.dry_run(&format!("would {}", resource.description()));
        true
    }
}

/// Directory name of a package, used in logs and errors.
#[must_use]
pub fn package_name(package_dir: &Path) -> String {
    package_dir.file_name().map_or_else(
        || package_dir.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}
