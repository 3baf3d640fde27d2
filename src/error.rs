//! Domain-specific error types for the deployment engine.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`ReconcileError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DotpkgError
//! ├── Config(ConfigError)       : top-level config and package manifests
//! └── Reconcile(ReconcileError) : corrupted package content
//! ```
//!
//! Per-target mismatches (differing content, unwritable destinations) are not
//! errors: they are reported as a `false` package result and never escape the
//! package boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the deployment engine.
#[derive(Error, Debug)]
pub enum DotpkgError {
    /// The top-level configuration or a package manifest is unusable.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A package declares content that does not exist.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),
}

/// Errors that arise from loading the top-level config or a package manifest.
///
/// All variants are fatal: the run is aborted immediately.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document could not be parsed or does not match the expected shape.
    #[error("Invalid syntax in {path}: {message}")]
    Parse {
        /// Path to the malformed file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The file extension does not name a supported document format.
    #[error("Unsupported config format for {0} (expected .json or .toml)")]
    UnsupportedFormat(PathBuf),

    /// A package directory contains no manifest.
    #[error("Missing package manifest in {0}")]
    MissingManifest(PathBuf),

    /// The `root` field of a manifest holds a value outside the known forms.
    #[error("Invalid root policy '{value}' in {path}: expected \"only\", \"none\" or a boolean")]
    InvalidRootPolicy {
        /// Path to the manifest.
        path: PathBuf,
        /// The rejected value, rendered as text.
        value: String,
    },
}

/// Errors that abort the reconciliation of a package.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A declared source path does not exist inside the package.
    #[error("Source missing in package '{package}': {source_path}")]
    SourceMissing {
        /// Package name (directory name).
        package: String,
        /// Absolute path of the missing source.
        source_path: PathBuf,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    // -----------------------------------------------------------------------
    // ConfigError
    // -----------------------------------------------------------------------

    #[test]
    fn config_error_io_display() {
        let e = ConfigError::Io {
            path: PathBuf::from("/conf/dotpkg.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(e.to_string().contains("/conf/dotpkg.json"));
        assert!(e.to_string().contains("IO error reading config file"));
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: PathBuf::from("/conf/dotpkg.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn config_error_parse_display() {
        let e = ConfigError::Parse {
            path: PathBuf::from("pkg.json"),
            message: "expected value at line 1".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Invalid syntax in pkg.json: expected value at line 1"
        );
    }

    #[test]
    fn config_error_missing_manifest_display() {
        let e = ConfigError::MissingManifest(PathBuf::from("/pkgs/vim"));
        assert_eq!(e.to_string(), "Missing package manifest in /pkgs/vim");
    }

    #[test]
    fn config_error_invalid_root_policy_display() {
        let e = ConfigError::InvalidRootPolicy {
            path: PathBuf::from("pkg.json"),
            value: "\"sometimes\"".to_string(),
        };
        assert!(e.to_string().contains("sometimes"));
        assert!(e.to_string().contains("pkg.json"));
    }

    // -----------------------------------------------------------------------
    // ReconcileError
    // -----------------------------------------------------------------------

    #[test]
    fn reconcile_error_source_missing_display() {
        let e = ReconcileError::SourceMissing {
            package: "vim".to_string(),
            source_path: PathBuf::from("/pkgs/vim/vimrc"),
        };
        assert_eq!(
            e.to_string(),
            "Source missing in package 'vim': /pkgs/vim/vimrc"
        );
    }

    // -----------------------------------------------------------------------
    // DotpkgError conversions
    // -----------------------------------------------------------------------

    #[test]
    fn dotpkg_error_from_config_error() {
        let e: DotpkgError = ConfigError::MissingManifest(PathBuf::from("/pkgs/a")).into();
        assert!(e.to_string().contains("Configuration error"));
    }

    #[test]
    fn dotpkg_error_from_reconcile_error() {
        let e: DotpkgError = ReconcileError::SourceMissing {
            package: "a".to_string(),
            source_path: PathBuf::from("/pkgs/a/x"),
        }
        .into();
        assert!(e.to_string().contains("Reconciliation error"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<DotpkgError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<ReconcileError>();
    }

    #[test]
    fn errors_convert_to_anyhow_and_downcast() {
        let e: anyhow::Error = ReconcileError::SourceMissing {
            package: "a".to_string(),
            source_path: PathBuf::from("/x"),
        }
        .into();
        assert!(e.downcast_ref::<ReconcileError>().is_some());
    }
}
