//! Logging infrastructure for structured console and file output.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::{RunInfo, init_subscriber};
pub use types::{Log, PackageEntry, PackageStatus, check_mark};

/// Serializes `XDG_CACHE_HOME` manipulation across parallel test threads.
#[cfg(test)]
pub(crate) static TEST_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Create a Logger backed by an isolated per-thread tracing subscriber
/// with a file layer, so that tracing events emitted by logger methods
/// reach the log file during tests.
///
/// The returned guard must outlive the test body; dropping it restores the
/// previous thread-local dispatcher.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let env_lock = TEST_ENV_MUTEX
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    // SAFETY: Protected by TEST_ENV_MUTEX; restored before lock is released.
    #[allow(unsafe_code)]
    unsafe {
        std::env::set_var("XDG_CACHE_HOME", tmp.path());
    }
    let info = RunInfo {
        command: "test",
        config: std::path::Path::new("dotpkg.json"),
        dry_run: false,
    };
    let file_layer = subscriber::FileLayer::new(&info).expect("failed to create file layer");
    let log = Logger::new("test");
    #[allow(unsafe_code)]
    unsafe {
        std::env::remove_var("XDG_CACHE_HOME");
    }
    drop(env_lock);
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}

/// In-memory [`Log`] for unit tests: every message is kept as `"<level>: <msg>"`.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct CaptureLog {
    lines: std::sync::Mutex<Vec<String>>,
    packages: std::sync::Mutex<Vec<PackageEntry>>,
}

#[cfg(test)]
impl CaptureLog {
    fn push(&self, level: &str, msg: &str) {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(format!("{level}: {msg}"));
    }

    /// Messages logged at `level`, without the prefix.
    pub(crate) fn at(&self, level: &str) -> Vec<String> {
        let prefix = format!("{level}: ");
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .filter_map(|l| l.strip_prefix(&prefix).map(String::from))
            .collect()
    }

    /// Recorded package entries.
    pub(crate) fn packages(&self) -> Vec<PackageEntry> {
        self.packages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
impl Log for CaptureLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn check(&self, package: &str, ok: bool) {
        self.push("check", &format!("{} pkg {package}", check_mark(ok)));
    }
    fn record_package(&self, name: &str, status: PackageStatus, message: Option<&str>) {
        self.packages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(PackageEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
    }
}
