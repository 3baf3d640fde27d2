//! Core logging types: package entries, status, and the [`Log`] trait.

/// Per-package result for summary reporting.
#[derive(Debug, Clone)]
pub struct PackageEntry {
    /// Package directory name.
    pub name: String,
    /// Final status of the package.
    pub status: PackageStatus,
    /// Optional detail (skip reason or failure description).
    pub message: Option<String>,
}

/// Status of a reconciled package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    /// Every target reconciled (deploy) or matched (check).
    Ok,
    /// The package's root policy excludes the current user.
    NotApplicable,
    /// Reconciled in dry-run mode; nothing was written.
    DryRun,
    /// At least one target failed.
    Failed,
}

impl PackageStatus {
    /// Short word used in summaries and the log file.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotApplicable => "n/a",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }

    /// Summary row marker.
    #[must_use]
    pub const fn icon(self) -> char {
        match self {
            Self::Ok => '✓',
            Self::NotApplicable => '·',
            Self::DryRun => '~',
            Self::Failed => '✗',
        }
    }
}

/// Marker of a check status line.
#[must_use]
pub const fn check_mark(ok: bool) -> char {
    if ok { '✔' } else { '✘' }
}

/// Abstraction over logging backends.
///
/// Engine code logs through this trait so tests can substitute a capturing
/// implementation for the console [`Logger`](super::logger::Logger).
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log an action that dry-run mode skipped.
    fn dry_run(&self, msg: &str);
    /// Report whether `package` passed its check.
    fn check(&self, package: &str, ok: bool);
    /// Record a package result for the summary.
    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>);
}
