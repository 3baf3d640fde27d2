//! Byte-for-byte comparison of files and directory trees.
//!
//! Both sides are enumerated into lists of regular files sorted by path
//! relative to their root, then paired positionally.  Directories and
//! symlinks never appear in the lists, but symlinked directories are
//! traversed.  A regular file passed as a root enumerates as itself.
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::logging::Log;

const CHUNK: usize = 8192;

/// A pair of corresponding files whose content (or relative path) differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferingPair {
    /// File under the left root.
    pub left: PathBuf,
    /// File under the right root.
    pub right: PathBuf,
    /// Why the pair differs.
    pub reason: String,
}

/// Outcome of comparing two trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeDiff {
    /// Every file pair is byte-identical.
    Identical,
    /// One side could not be enumerated (typically: it does not exist).
    Unreadable {
        /// The root that failed.
        root: PathBuf,
        /// Underlying error.
        reason: String,
    },
    /// The two sides hold different numbers of regular files.
    CountMismatch {
        /// Files under the left root.
        left: usize,
        /// Files under the right root.
        right: usize,
    },
    /// Counts match but some pairs differ.
    Differing(Vec<DifferingPair>),
}

impl TreeDiff {
    /// `true` if the trees are identical.
    #[must_use]
    pub const fn is_identical(&self) -> bool {
        matches!(self, Self::Identical)
    }
}

/// Regular files under `root`, as `(relative, absolute)` pairs sorted by relative path.
///
/// # Errors
///
/// Returns an error if `root` does not exist or cannot be traversed.
pub fn list_files(root: &Path) -> io::Result<Vec<(PathBuf, PathBuf)>> {
    if std::fs::metadata(root)?.is_file() {
        return Ok(vec![(PathBuf::new(), root.to_path_buf())]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() && !entry.path_is_symlink() {
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_or_else(|_| entry.path().to_path_buf(), Path::to_path_buf);
            files.push((relative, entry.into_path()));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// Compare the trees (or files) at `a` and `b`.
#[must_use]
pub fn diff_trees(a: &Path, b: &Path) -> TreeDiff {
    let left = match list_files(a) {
        Ok(files) => files,
        Err(e) => return unreadable(a, &e),
    };
    let right = match list_files(b) {
        Ok(files) => files,
        Err(e) => return unreadable(b, &e),
    };

    if left.len() != right.len() {
        return TreeDiff::CountMismatch {
            left: left.len(),
            right: right.len(),
        };
    }

    let differing: Vec<DifferingPair> = left
        .into_iter()
        .zip(right)
        .filter_map(|((left_rel, left), (right_rel, right))| {
            let reason = if left_rel == right_rel {
                match files_identical(&left, &right) {
                    Ok(true) => return None,
                    Ok(false) => "content differs".to_string(),
                    Err(e) => format!("cannot compare: {e}"),
                }
            } else {
                format!(
                    "path differs: {} vs {}",
                    left_rel.display(),
                    right_rel.display()
                )
            };
            Some(DifferingPair {
                left,
                right,
                reason,
            })
        })
        .collect();

    if differing.is_empty() {
        TreeDiff::Identical
    } else {
        TreeDiff::Differing(differing)
    }
}

/// `true` if `a` and `b` are byte-identical.
#[must_use]
pub fn compare_all(a: &Path, b: &Path) -> bool {
    diff_trees(a, b).is_identical()
}

/// Like [`compare_all`], reporting every mismatch through `log`.
pub fn compare_all_verbose(a: &Path, b: &Path, log: &dyn Log) -> bool {
    match diff_trees(a, b) {
        TreeDiff::Identical => true,
        TreeDiff::Unreadable { root, reason } => {
            log.warn(&format!("cannot read {}: {reason}", root.display()));
            false
        }
        TreeDiff::CountMismatch { left, right } => {
            log.warn(&format!(
                "file count differs: {} has {left}, {} has {right}",
                a.display(),
                b.display()
            ));
            false
        }
        TreeDiff::Differing(pairs) => {
            for pair in &pairs {
                log.warn(&format!(
                    "{} != {} ({})",
                    pair.left.display(),
                    pair.right.display(),
                    pair.reason
                ));
            }
            false
        }
    }
}

fn unreadable(root: &Path, e: &io::Error) -> TreeDiff {
    TreeDiff::Unreadable {
        root: root.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Byte-exact comparison, checking lengths first.
fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    if std::fs::metadata(a)?.len() != std::fs::metadata(b)?.len() {
        return Ok(false);
    }

    let mut fa = File::open(a)?;
    let mut fb = File::open(b)?;
    let mut buf_a = [0u8; CHUNK];
    let mut buf_b = [0u8; CHUNK];
    loop {
        let n = read_full(&mut fa, &mut buf_a)?;
        let m = read_full(&mut fb, &mut buf_b)?;
        if n != m || buf_a.get(..n) != buf_b.get(..m) {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as possible, returning the byte count (short only at EOF).
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let Some(rest) = buf.get_mut(filled..) else {
            break;
        };
        match reader.read(rest) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::CaptureLog;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn tree(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (rel, content) in files {
            write(dir.path(), rel, content);
        }
        dir
    }

    #[test]
    fn identical_trees_compare_equal() {
        let a = tree(&[("x", "1"), ("sub/y", "2"), ("sub/deeper/z", "3")]);
        let b = tree(&[("x", "1"), ("sub/y", "2"), ("sub/deeper/z", "3")]);
        assert!(compare_all(a.path(), b.path()));
    }

    #[test]
    fn listing_is_sorted_by_relative_path() {
        let a = tree(&[("b", ""), ("a/z", ""), ("a/b", ""), ("c", "")]);
        let rel: Vec<_> = list_files(a.path())
            .unwrap()
            .into_iter()
            .map(|(r, _)| r)
            .collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("a/b"),
                PathBuf::from("a/z"),
                PathBuf::from("b"),
                PathBuf::from("c")
            ]
        );
    }

    #[test]
    fn content_difference_is_reported() {
        let a = tree(&[("x", "1"), ("y", "same")]);
        let b = tree(&[("x", "2"), ("y", "same")]);
        match diff_trees(a.path(), b.path()) {
            TreeDiff::Differing(pairs) => {
                assert_eq!(pairs.len(), 1);
                assert!(pairs[0].left.ends_with("x"));
                assert_eq!(pairs[0].reason, "content differs");
            }
            other => panic!("expected Differing, got {other:?}"),
        }
    }

    #[test]
    fn same_length_different_bytes_differ() {
        let a = tree(&[("x", "abcd")]);
        let b = tree(&[("x", "abce")]);
        assert!(!compare_all(a.path(), b.path()));
    }

    #[test]
    fn large_files_compare_across_chunks() {
        let big = "z".repeat(CHUNK * 3 + 17);
        let mut tail_changed = big.clone();
        tail_changed.pop();
        tail_changed.push('y');
        let a = tree(&[("big", &big)]);
        let b = tree(&[("big", &big)]);
        let c = tree(&[("big", &tail_changed)]);
        assert!(compare_all(a.path(), b.path()));
        assert!(!compare_all(a.path(), c.path()));
    }

    #[test]
    fn count_mismatch_fails() {
        let a = tree(&[("x", "1")]);
        let b = tree(&[("x", "1"), ("extra", "")]);
        assert_eq!(
            diff_trees(a.path(), b.path()),
            TreeDiff::CountMismatch { left: 1, right: 2 }
        );
    }

    #[test]
    fn renamed_file_with_same_content_differs() {
        let a = tree(&[("x", "1")]);
        let b = tree(&[("y", "1")]);
        assert!(!compare_all(a.path(), b.path()));
    }

    #[test]
    fn empty_directories_are_ignored() {
        let a = tree(&[("x", "1")]);
        let b = tree(&[("x", "1")]);
        std::fs::create_dir(b.path().join("empty")).unwrap();
        assert!(compare_all(a.path(), b.path()));
    }

    #[test]
    fn missing_destination_is_not_identical() {
        let a = tree(&[("x", "1")]);
        let missing = a.path().join("nope");
        assert!(matches!(
            diff_trees(a.path(), &missing),
            TreeDiff::Unreadable { .. }
        ));
    }

    #[test]
    fn single_files_compare_directly() {
        let dir = tree(&[("a", "same"), ("b", "same"), ("c", "other")]);
        assert!(compare_all(&dir.path().join("a"), &dir.path().join("b")));
        assert!(!compare_all(&dir.path().join("a"), &dir.path().join("c")));
    }

    #[test]
    fn file_against_directory_differs() {
        let dir = tree(&[("a", "same"), ("d/a", "same"), ("d/b", "x")]);
        assert!(!compare_all(&dir.path().join("a"), &dir.path().join("d")));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_traversed() {
        let store = tree(&[("store/x", "1")]);
        let linked = tree(&[]);
        std::os::unix::fs::symlink(store.path().join("store"), linked.path().join("store"))
            .unwrap();
        assert!(compare_all(store.path(), linked.path()));
    }

    #[cfg(unix)]
    #[test]
    fn file_symlinks_are_not_listed() {
        let plain = tree(&[("store/x", "1")]);
        let aliased = tree(&[("store/x", "1")]);
        std::os::unix::fs::symlink(aliased.path().join("store/x"), aliased.path().join("alias"))
            .unwrap();
        assert_eq!(list_files(aliased.path()).unwrap().len(), 1);
        assert!(compare_all(plain.path(), aliased.path()));
    }

    #[test]
    fn verbose_variant_reports_each_pair() {
        let a = tree(&[("x", "1"), ("y", "1"), ("z", "1")]);
        let b = tree(&[("x", "2"), ("y", "1"), ("z", "2")]);
        let log = CaptureLog::default();
        assert!(!compare_all_verbose(a.path(), b.path(), &log));
        let warnings = log.at("warn");
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.contains("content differs")));
    }

    #[test]
    fn verbose_variant_is_silent_when_identical() {
        let a = tree(&[("x", "1")]);
        let b = tree(&[("x", "1")]);
        let log = CaptureLog::default();
        assert!(compare_all_verbose(a.path(), b.path(), &log));
        assert!(log.at("warn").is_empty());
    }
}
