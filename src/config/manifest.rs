//! Per-package manifest (`pkg.json` / `pkg.toml`) loading.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::loader;
use crate::error::ConfigError;

/// Manifest file names looked up inside a package directory, in priority order.
pub const MANIFEST_NAMES: &[&str] = &["pkg.json", "pkg.toml"];

/// Which effective users a package applies to.
///
/// # Examples
///
/// ```
/// use dotpkg_cli::config::manifest::RootPolicy;
///
/// assert!(RootPolicy::Unset.permits(true));
/// assert!(RootPolicy::RootOnly.permits(true));
/// assert!(!RootPolicy::RootOnly.permits(false));
/// assert!(!RootPolicy::NonRootOnly.permits(true));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootPolicy {
    /// No restriction: the package always applies.
    #[default]
    Unset,
    /// Only applies when running as root (`"only"`, or legacy `true`).
    RootOnly,
    /// Only applies when not running as root (`"none"`).
    NonRootOnly,
}

impl RootPolicy {
    /// Whether a package with this policy applies for the given effective user.
    #[must_use]
    pub const fn permits(self, is_root: bool) -> bool {
        match self {
            Self::Unset => true,
            Self::RootOnly => is_root,
            Self::NonRootOnly => !is_root,
        }
    }
}

impl fmt::Display for RootPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "any user"),
            Self::RootOnly => write!(f, "root only"),
            Self::NonRootOnly => write!(f, "non-root only"),
        }
    }
}

/// `root` as written in the manifest: a string tag or the legacy boolean.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRoot {
    Flag(bool),
    Tag(String),
}

/// Manifest document as it appears on disk.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    root: Option<RawRoot>,
    #[serde(default)]
    link: bool,
    #[serde(default)]
    patch: BTreeMap<String, String>,
    #[serde(default)]
    fallback: Option<String>,
}

/// A parsed package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    /// Effective-user gate.
    pub root: RootPolicy,
    /// `true` to symlink destinations to sources, `false` to copy.
    pub link: bool,
    /// Relative source path (inside the package) → destination path string.
    pub patch: BTreeMap<String, String>,
    /// Destination for the whole package directory, if any.
    pub fallback: Option<String>,
}

/// Locate the manifest file inside `package_dir`.
///
/// # Errors
///
/// Returns [`ConfigError::MissingManifest`] if none of [`MANIFEST_NAMES`] exists.
pub fn find(package_dir: &Path) -> Result<PathBuf, ConfigError> {
    MANIFEST_NAMES
        .iter()
        .map(|name| package_dir.join(name))
        .find(|p| p.is_file())
        .ok_or_else(|| ConfigError::MissingManifest(package_dir.to_path_buf()))
}

/// Locate and load the manifest of `package_dir`.
///
/// # Errors
///
/// Returns an error if the manifest is missing, unreadable, malformed, or
/// declares an unknown root policy.
pub fn load(package_dir: &Path) -> Result<PackageManifest, ConfigError> {
    let path = find(package_dir)?;
    let raw: RawManifest = loader::load_document(&path)?;
    from_raw(raw, &path)
}

fn from_raw(raw: RawManifest, path: &Path) -> Result<PackageManifest, ConfigError> {
    let root = match raw.root {
        None | Some(RawRoot::Flag(false)) => RootPolicy::Unset,
        Some(RawRoot::Flag(true)) => RootPolicy::RootOnly,
        Some(RawRoot::Tag(tag)) => match tag.as_str() {
            "only" => RootPolicy::RootOnly,
            "none" => RootPolicy::NonRootOnly,
            _ => {
                return Err(ConfigError::InvalidRootPolicy {
                    path: path.to_path_buf(),
                    value: format!("{tag:?}"),
                });
            }
        },
    };

    Ok(PackageManifest {
        root,
        link: raw.link,
        patch: raw.patch,
        fallback: raw.fallback,
    })
}
