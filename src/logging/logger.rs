//! Console logger with summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{CHECK, DRY_RUN, STAGE, SUMMARY};
use super::types::{Log, PackageEntry, PackageStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
///
/// `check` and `record_package` are not included: their signatures differ
/// from the `fn(&self, &str)` shape shared by the display methods.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger that emits through [`tracing`] and remembers per-package results.
///
/// Every message also lands in `$XDG_CACHE_HOME/dotpkg/<command>.log`
/// (default `~/.cache/dotpkg/<command>.log`) through the file layer installed
/// by [`init_subscriber`](super::subscriber::init_subscriber).
#[derive(Debug)]
pub struct Logger {
    packages: Mutex<Vec<PackageEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command` (`deploy` or `check`).
    ///
    /// Only remembers the log file path for the summary; the file itself is
    /// opened by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            packages: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded package entries.
    #[must_use]
    pub fn package_entries(&self) -> Vec<PackageEntry> {
        self.packages.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (console only when verbose; always in the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log an action that was skipped because of `--dry-run`.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN, "{msg}");
    }

    /// Report the check verdict of one package.
    pub fn check(&self, package: &str, ok: bool) {
        tracing::info!(target: CHECK, ok, "{package}");
    }

    /// Record a package result for the summary.
    pub fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.packages.lock() {
            guard.push(PackageEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed packages.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.packages.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|p| p.status == PackageStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded packages.
    pub fn print_summary(&self) {
        let packages = self.package_entries();
        if packages.is_empty() {
            return;
        }

        self.stage("Summary");

        for entry in &packages {
            tracing::info!(
                target: SUMMARY,
                status = entry.status.label(),
                "{}",
                summary_line(entry)
            );
        }
        tracing::info!(target: SUMMARY, "{}", totals_line(&packages));

        if let Some(path) = &self.log_file {
            self.debug(&format!("log: {}", path.display()));
        }
    }
}

/// One summary row for `entry`.
fn summary_line(entry: &PackageEntry) -> String {
    let suffix = entry
        .message
        .as_ref()
        .map_or_else(String::new, |msg| format!(" ({msg})"));
    format!("{} {}{suffix}", entry.status.icon(), entry.name)
}

/// Count of packages per status, in a fixed order.
fn totals_line(packages: &[PackageEntry]) -> String {
    let counts: Vec<String> = [
        PackageStatus::Ok,
        PackageStatus::NotApplicable,
        PackageStatus::DryRun,
        PackageStatus::Failed,
    ]
    .into_iter()
    .map(|status| {
        let n = packages.iter().filter(|p| p.status == status).count();
        format!("{n} {}", status.label())
    })
    .collect();
    format!("{} packages: {}", packages.len(), counts.join(", "))
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn check(&self, package: &str, ok: bool) {
        self.check(package, ok);
    }

    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        self.record_package(name, status, message);
    }
}
