//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::archive::archive;
use super::helpers::fs::{create_symlink, ensure_parent_dir};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A destination that should be a symlink to a package source.
#[derive(Debug, Clone)]
pub struct LinkResource {
    /// What the link points to.
    pub source: PathBuf,
    /// Where the link lives.
    pub destination: PathBuf,
}

impl LinkResource {
    /// Create a new link resource.
    #[must_use]
    pub const fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl Applicable for LinkResource {
    fn description(&self) -> String {
        format!(
            "link {} -> {}",
            self.destination.display(),
            self.source.display()
        )
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.current_state()? == ResourceState::Correct {
            return Ok(ResourceChange::AlreadyCorrect);
        }

        ensure_parent_dir(&self.destination)?;
        let archived = archive(&self.destination)?;
        create_symlink(&self.source, &self.destination)
            .with_context(|| format!("create link: {}", self.destination.display()))?;

        Ok(ResourceChange::Applied { archived })
    }
}

impl Resource for LinkResource {
    /// Correct when the destination canonicalizes to the same path as the source.
    fn current_state(&self) -> Result<ResourceState> {
        let Ok(meta) = self.destination.symlink_metadata() else {
            return Ok(ResourceState::Missing);
        };

        let source = dunce::canonicalize(&self.source)
            .with_context(|| format!("resolve source: {}", self.source.display()))?;
        if dunce::canonicalize(&self.destination).is_ok_and(|dest| dest == source) {
            return Ok(ResourceState::Correct);
        }

        let current = if meta.is_symlink() {
            std::fs::read_link(&self.destination).map_or_else(
                |_| "unreadable link".to_string(),
                |target| format!("points to {}", target.display()),
            )
        } else if meta.is_dir() {
            "a directory".to_string()
        } else {
            "a regular file".to_string()
        };
        Ok(ResourceState::Incorrect { current })
    }
}
