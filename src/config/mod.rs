//! Top-level configuration and package manifests.
pub mod loader;
pub mod manifest;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// One entry of `additional_envs`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvEntry {
    /// Value to expose.
    pub value: String,
    /// Whether the value replaces a variable already present in the process environment.
    #[serde(default)]
    pub overwrite: bool,
}

/// Top-level config document as it appears on disk.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    hooks: PathBuf,
    pkgs: PathBuf,
    #[serde(default)]
    additional_envs: BTreeMap<String, EnvEntry>,
}

/// Loaded top-level configuration, immutable for the rest of the run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the config file itself.
    pub path: PathBuf,
    /// Hooks directory (resolved against the config file's directory).
    pub hooks_dir: PathBuf,
    /// Packages directory (resolved against the config file's directory).
    pub pkgs_dir: PathBuf,
    /// Environment variables layered over the process environment.
    pub additional_envs: BTreeMap<String, EnvEntry>,
}

impl Config {
    /// Load the configuration file at `path`.
    ///
    /// Relative `hooks` and `pkgs` entries are resolved against the directory
    /// containing the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = std::path::absolute(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = loader::load_document(&path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("/"));

        Ok(Self {
            hooks_dir: base.join(raw.hooks),
            pkgs_dir: base.join(raw.pkgs),
            additional_envs: raw.additional_envs,
            path,
        })
    }
}
