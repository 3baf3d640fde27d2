//! Destination/source path resolution.
use std::path::{Component, Path, PathBuf};

use crate::environment::EnvOverrides;

/// Expand `~`, `$VAR` and `${VAR}` in `raw` and return an absolute path.
///
/// The parent directory is canonicalized when it exists, but the final
/// component is never dereferenced: a destination that is itself a symlink
/// still resolves to the link, not to what it points at.  Nonexistent paths
/// resolve fine.
#[must_use]
pub fn resolve(raw: &str, env: &EnvOverrides) -> PathBuf {
    let expanded = expand_vars(&expand_tilde(raw, env), env);
    resolve_path(Path::new(&expanded))
}

/// Make `path` absolute and normalized without expanding anything.
#[must_use]
pub fn resolve_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let normalized = normalize_lexically(&absolute);

    match (normalized.parent(), normalized.file_name()) {
        (Some(parent), Some(name)) => dunce::canonicalize(parent)
            .map_or_else(|_| normalized.clone(), |parent| parent.join(name)),
        _ => normalized,
    }
}

/// Replace a leading `~` (alone or followed by a separator) with the home directory.
fn expand_tilde(raw: &str, env: &EnvOverrides) -> String {
    let Some(rest) = raw.strip_prefix('~') else {
        return raw.to_string();
    };
    if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with(std::path::MAIN_SEPARATOR))
    {
        // `~user` forms are left alone.
        return raw.to_string();
    }
    env.home()
        .map_or_else(|| raw.to_string(), |home| format!("{home}{rest}"))
}

/// Expand `$VAR` and `${VAR}` references. Unknown variables are left verbatim.
#[must_use]
pub fn expand_vars(raw: &str, env: &EnvOverrides) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{')
            && let Some(end) = braced.find('}')
        {
            let name = &braced[..end];
            match lookup(env, name) {
                Some(value) => out.push_str(&value),
                None => {
                    out.push_str("${");
                    out.push_str(name);
                    out.push('}');
                }
            }
            rest = &braced[end + 1..];
            continue;
        }

        let len = after
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(after.len());
        let name = &after[..len];
        match lookup(env, name) {
            Some(value) => out.push_str(&value),
            None => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &after[len..];
    }

    out.push_str(rest);
    out
}

fn lookup(env: &EnvOverrides, name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        env.get(name)
    }
}

/// Remove `.` components and fold `..` into the preceding component.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn env() -> EnvOverrides {
        EnvOverrides::from_vars([
            ("HOME", "/home/tester"),
            ("USERPROFILE", "/home/tester"),
            ("XDG_CONFIG_HOME", "/home/tester/.config"),
        ])
    }

    #[test]
    fn expands_leading_tilde() {
        assert_eq!(expand_tilde("~/.vimrc", &env()), "/home/tester/.vimrc");
        assert_eq!(expand_tilde("~", &env()), "/home/tester");
    }

    #[test]
    fn leaves_tilde_user_and_inner_tilde() {
        assert_eq!(expand_tilde("~root/.vimrc", &env()), "~root/.vimrc");
        assert_eq!(expand_tilde("/tmp/~x", &env()), "/tmp/~x");
    }

    #[test]
    fn expands_plain_and_braced_variables() {
        assert_eq!(
            expand_vars("$XDG_CONFIG_HOME/nvim", &env()),
            "/home/tester/.config/nvim"
        );
        assert_eq!(
            expand_vars("${HOME}/.cfgfile", &env()),
            "/home/tester/.cfgfile"
        );
        assert_eq!(expand_vars("${HOME}x$HOME", &env()), "/home/testerx/home/tester");
    }

    #[test]
    fn unknown_variables_are_left_verbatim() {
        assert_eq!(
            expand_vars("$DOTPKG_NO_SUCH_VAR/x", &env()),
            "$DOTPKG_NO_SUCH_VAR/x"
        );
        assert_eq!(
            expand_vars("${DOTPKG_NO_SUCH_VAR}/x", &env()),
            "${DOTPKG_NO_SUCH_VAR}/x"
        );
        assert_eq!(expand_vars("cost: $", &env()), "cost: $");
        assert_eq!(expand_vars("${unterminated", &env()), "${unterminated");
    }

    #[test]
    fn normalizes_parent_components() {
        assert_eq!(
            normalize_lexically(Path::new("/home/tester/test/../")),
            PathBuf::from("/home/tester")
        );
        assert_eq!(
            normalize_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
    }

    #[test]
    fn resolve_nonexistent_path_does_not_fail() {
        let dir = tempfile::tempdir().unwrap();
        let raw = format!("{}/missing/deeper/file", dir.path().display());
        let resolved = resolve(&raw, &env());
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("missing/deeper/file"));
    }

    #[test]
    fn resolve_makes_relative_paths_absolute() {
        let resolved = resolve("relative/file", &env());
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("relative/file"));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_does_not_follow_final_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        let link = dir.path().join("link");
        std::fs::write(&target, "x").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let resolved = resolve(link.to_str().unwrap(), &env());
        assert_eq!(resolved.file_name().unwrap(), "link");
        assert!(resolved.symlink_metadata().unwrap().is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn resolve_canonicalizes_symlinked_parent() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("alias")).unwrap();

        let raw = format!("{}/alias/file", dir.path().display());
        let resolved = resolve(&raw, &env());
        assert_eq!(resolved, dunce::canonicalize(&real).unwrap().join("file"));
    }
}
