//! Copy resource: materialize a package source as an independent file or tree.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::archive::archive;
use super::compare::{compare_all, compare_all_verbose};
use super::helpers::fs::{copy_dir_recursive, ensure_parent_dir};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::logging::Log;

/// A destination that should hold a byte-identical copy of a package source.
#[derive(Debug, Clone)]
pub struct CopyResource {
    /// File or directory to copy from.
    pub source: PathBuf,
    /// Where the copy lives.
    pub destination: PathBuf,
}

impl CopyResource {
    /// Create a new copy resource.
    #[must_use]
    pub const fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Compare source and destination, logging every differing file.
    ///
    /// A destination that is a symlink is never an independent copy and fails
    /// without comparing content.
    #[must_use]
    pub fn verify(&self, log: &dyn Log) -> bool {
        if self.destination_is_link() {
            log.warn(&format!(
                "{} is a link, expected a copy of {}",
                self.destination.display(),
                self.source.display()
            ));
            return false;
        }
        compare_all_verbose(&self.source, &self.destination, log)
    }

    fn destination_is_link(&self) -> bool {
        self.destination
            .symlink_metadata()
            .is_ok_and(|meta| meta.is_symlink())
    }
}

impl Applicable for CopyResource {
    fn description(&self) -> String {
        format!(
            "copy {} -> {}",
            self.source.display(),
            self.destination.display()
        )
    }

    /// Directories already identical are left alone.  Single files are
    /// always archived and copied again.
    fn apply(&self) -> Result<ResourceChange> {
        let is_dir = self.source.is_dir();
        if is_dir && self.current_state()? == ResourceState::Correct {
            return Ok(ResourceChange::AlreadyCorrect);
        }

        ensure_parent_dir(&self.destination)?;
        let archived = archive(&self.destination)?;
        if is_dir {
            copy_dir_recursive(&self.source, &self.destination)?;
        } else {
            std::fs::copy(&self.source, &self.destination).with_context(|| {
                format!(
                    "copying {} to {}",
                    self.source.display(),
                    self.destination.display()
                )
            })?;
        }

        Ok(ResourceChange::Applied { archived })
    }
}

impl Resource for CopyResource {
    fn current_state(&self) -> Result<ResourceState> {
        let Ok(meta) = self.destination.symlink_metadata() else {
            return Ok(ResourceState::Missing);
        };
        if meta.is_symlink() {
            let current = std::fs::read_link(&self.destination).map_or_else(
                |_| "an unreadable link".to_string(),
                |target| format!("a link to {}", target.display()),
            );
            return Ok(ResourceState::Incorrect { current });
        }
        if compare_all(&self.source, &self.destination) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }
}
