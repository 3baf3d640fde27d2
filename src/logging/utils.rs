//! Where run logs live and how their lines are stamped.
use std::path::PathBuf;

use chrono::Utc;

/// Directory holding one log per command: `$XDG_CACHE_HOME/dotpkg`, falling
/// back to `~/.cache/dotpkg`.
fn log_dir() -> Option<PathBuf> {
    let cache = match std::env::var_os("XDG_CACHE_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(|home| PathBuf::from(home).join(".cache"))?,
    };
    Some(cache.join("dotpkg"))
}

/// Log file for `command`, with its directory created.
///
/// `None` when no cache location is known or it cannot be created.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = log_dir()?;
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Run start stamp for the log header, `YYYY-MM-DD HH:MM:SS UTC`.
pub(super) fn started_at() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Per-line stamp, `HH:MM:SS`.
pub(super) fn clock() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
