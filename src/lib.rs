//! Declarative package-based file deployment.
//!
//! A package is a directory holding files plus a manifest (`pkg.json` or
//! `pkg.toml`) that maps those files to destinations on the machine.  The
//! engine either deploys packages, by symlinking or copying after archiving
//! whatever was in the way, or checks that the filesystem still matches.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: top-level config and package manifests
//! - **[`resources`]**: path resolution, archiving, comparison, link and copy primitives
//! - **[`reconcile`]**: applies or verifies one package
//! - **[`commands`]**: `--deploy` / `--check` orchestration over all packages
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod environment;
pub mod error;
pub mod logging;
pub mod platform;
pub mod reconcile;
pub mod resources;
