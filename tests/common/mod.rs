// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed workspace holding a top-level config,
// a packages directory and a target directory standing in for `$HOME`, plus a
// fluent builder and an in-memory logger.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dotpkg_cli::logging::{Log, PackageEntry, PackageStatus, check_mark};

/// Variable pointing at the fixture's target directory, usable in manifests
/// as `$TARGET/...`.
pub const TARGET_VAR: &str = "DOTPKG_IT_TARGET";

/// An isolated workspace backed by a [`tempfile::TempDir`].
#[derive(Debug)]
pub struct Fixture {
    _tmp: tempfile::TempDir,
    /// Canonical workspace root.
    pub root: PathBuf,
    /// Directory destinations are deployed into.
    pub target: PathBuf,
}

impl Fixture {
    /// Path of the top-level config file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("dotpkg.json")
    }

    /// Directory of package `name`.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.root.join("pkgs").join(name)
    }

    /// Path under the target directory.
    pub fn dest(&self, relative: &str) -> PathBuf {
        self.target.join(relative)
    }

    /// Number of entries directly inside the target directory.
    pub fn target_entries(&self) -> usize {
        std::fs::read_dir(&self.target).expect("read target").count()
    }
}

/// Fluent builder for [`Fixture`].
#[derive(Debug)]
pub struct FixtureBuilder {
    fixture: Fixture,
}

impl FixtureBuilder {
    /// Begin building: creates `pkgs/`, `hooks/`, `target/` and a JSON config
    /// exporting [`TARGET_VAR`].
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = dunce::canonicalize(tmp.path()).expect("canonical temp dir");
        for dir in ["pkgs", "hooks", "target"] {
            std::fs::create_dir_all(root.join(dir)).expect("create fixture dir");
        }
        let target = root.join("target");

        let config = serde_json::json!({
            "hooks": "hooks",
            "pkgs": "pkgs",
            "additional_envs": {
                TARGET_VAR: { "value": target.to_string_lossy(), "overwrite": true }
            }
        });
        std::fs::write(root.join("dotpkg.json"), config.to_string()).expect("write config");

        Self {
            fixture: Fixture {
                _tmp: tmp,
                root,
                target,
            },
        }
    }

    /// Add a package with a JSON manifest.
    pub fn package(self, name: &str, manifest: &serde_json::Value) -> Self {
        let dir = self.fixture.package_dir(name);
        std::fs::create_dir_all(&dir).expect("create package dir");
        std::fs::write(dir.join("pkg.json"), manifest.to_string()).expect("write manifest");
        self
    }

    /// Add a package with a TOML manifest.
    pub fn toml_package(self, name: &str, manifest: &str) -> Self {
        let dir = self.fixture.package_dir(name);
        std::fs::create_dir_all(&dir).expect("create package dir");
        std::fs::write(dir.join("pkg.toml"), manifest).expect("write manifest");
        self
    }

    /// Write a source file inside package `name`.
    pub fn file(self, package: &str, relative: &str, content: &str) -> Self {
        write_file(&self.fixture.package_dir(package).join(relative), content);
        self
    }

    /// Write a pre-existing file into the target directory.
    pub fn existing(self, relative: &str, content: &str) -> Self {
        write_file(&self.fixture.dest(relative), content);
        self
    }

    /// Finish building and return the fixture.
    pub fn build(self) -> Fixture {
        self.fixture
    }
}

/// Write `content` to `path`, creating parents.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, content).expect("write file");
}

/// In-memory [`Log`] keeping every message as `"<level>: <msg>"`.
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<String>>,
    packages: Mutex<Vec<PackageEntry>>,
}

impl RecordingLog {
    /// A fresh log, as both the concrete type and the trait object.
    pub fn shared() -> (Arc<Self>, Arc<dyn Log>) {
        let log = Arc::new(Self::default());
        let shared: Arc<dyn Log> = log.clone();
        (log, shared)
    }

    fn push(&self, level: &str, msg: &str) {
        self.lines.lock().unwrap().push(format!("{level}: {msg}"));
    }

    /// Messages logged at `level`, without the prefix.
    pub fn at(&self, level: &str) -> Vec<String> {
        let prefix = format!("{level}: ");
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter_map(|l| l.strip_prefix(&prefix).map(String::from))
            .collect()
    }

    /// `(name, status)` for every recorded package.
    pub fn statuses(&self) -> Vec<(String, PackageStatus)> {
        self.packages
            .lock()
            .unwrap()
            .iter()
            .map(|p| (p.name.clone(), p.status))
            .collect()
    }
}

impl Log for RecordingLog {
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
        self.packages.lock().unwrap().push(PackageEntry {
            name: name.to_string(),
            status,
            message: message.map(String::from),
        });
    }
}

/// Backup slots next to `path`, in index order.
pub fn backups(path: &Path) -> Vec<PathBuf> {
    dotpkg_cli::resources::archive::existing_backups(path)
}

/// A root policy that excludes whoever runs the tests.
pub fn excluding_root_policy() -> &'static str {
    if dotpkg_cli::platform::Platform::detect().is_root {
        "none"
    } else {
        "only"
    }
}
