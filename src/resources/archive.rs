//! Archiving ("evacuating") existing destination content into backup slots.
//!
//! Before anything is written to a destination, whatever lives there is moved
//! to `<dest>.pkg_save_<N>` next to it, where `N` is the lowest index not yet
//! taken.  Backups are never renumbered, reused, or cleaned up.  A symlink at
//! the destination is simply removed: it carries no content of its own.
use anyhow::{Context as _, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::helpers::fs::remove_symlink;

/// Infix between the destination name and the slot index.
pub const BACKUP_INFIX: &str = ".pkg_save_";

/// What [`archive`] did with the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Archived {
    /// Nothing existed at the destination.
    Nothing,
    /// A symlink was removed; its target was left alone.
    RemovedLink,
    /// Existing content was renamed into the given backup slot.
    Moved(PathBuf),
}

/// Path of backup slot `index` for `path`.
#[must_use]
pub fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(OsString::new, std::ffi::OsStr::to_os_string);
    name.push(format!("{BACKUP_INFIX}{index}"));
    path.with_file_name(name)
}

/// First backup slot for `path` with nothing (not even a dangling link) in it.
#[must_use]
pub fn next_backup_slot(path: &Path) -> PathBuf {
    (0..)
        .map(|index| backup_path(path, index))
        .find(|slot| slot.symlink_metadata().is_err())
        .unwrap_or_else(|| backup_path(path, usize::MAX))
}

/// Move whatever exists at `path` out of the way.
///
/// # Errors
///
/// Returns an error if the symlink cannot be removed or the rename fails.
pub fn archive(path: &Path) -> Result<Archived> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(Archived::Nothing);
    };

    if meta.is_symlink() {
        remove_symlink(path).with_context(|| format!("remove stale link: {}", path.display()))?;
        return Ok(Archived::RemovedLink);
    }

    let slot = next_backup_slot(path);
    std::fs::rename(path, &slot)
        .with_context(|| format!("archive {} to {}", path.display(), slot.display()))?;
    Ok(Archived::Moved(slot))
}

/// Existing backup slots of `path`, in index order.
#[must_use]
pub fn existing_backups(path: &Path) -> Vec<PathBuf> {
    let Some(parent) = path.parent() else {
        return Vec::new();
    };
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };
    let prefix = format!("{name}{BACKUP_INFIX}");

    let mut found: Vec<(usize, PathBuf)> = std::fs::read_dir(parent)
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let file_name = entry.file_name();
            let index = file_name.to_str()?.strip_prefix(&prefix)?.parse().ok()?;
            Some((index, entry.path()))
        })
        .collect();
    found.sort_by_key(|(index, _)| *index);
    found.into_iter().map(|(_, p)| p).collect()
}
