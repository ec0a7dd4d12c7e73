//! Recursive ignore-aware directory walker and empty-directory pruning.
//!
//! The walker is the "eyes" of the rename flow: it enumerates the regular
//! files a listing is built from, consulting the layered [`IgnoreSet`] as it
//! descends. Traversal is single-threaded and blocking; any I/O error aborts
//! the whole walk so a partial file list never reaches the diff engine.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::errors::{BmvError, Result};
use crate::walker::ignores::IgnoreSet;

/// Version-control metadata directory skipped unconditionally.
pub const GIT_DIR: &str = ".git";

/// A single file discovered during a walk.
///
/// `rel_path` is relative to the walk root. Entries are yielded in
/// directory-then-children order; within a directory they follow the
/// filesystem's listing order, which is not guaranteed to be alphabetical.
/// Callers needing determinism must sort downstream.
#[derive(Debug)]
pub struct WalkEntry {
    /// Path relative to the walk root.
    pub rel_path: PathBuf,
    /// Directory-entry metadata captured at discovery time.
    pub metadata: fs::Metadata,
}

/// Enumerate regular files under `root`, invoking `visit` once per file.
///
/// `cwd` anchors the ancestor ignore-rule lookup: rule files in directories
/// from `cwd` down to `root` apply to the walk even though those directories
/// are never visited (see [`IgnoreSet::initial`]). A `visit` error
/// short-circuits the remaining traversal.
pub fn walk<F>(cwd: &Path, root: &Path, mut visit: F) -> Result<()>
where
    F: FnMut(WalkEntry) -> Result<()>,
{
    let initial = IgnoreSet::initial(cwd, root)?;
    walk_dir(root, root, &initial, &mut visit)
}

/// Collect root-relative paths of every walked file, in walk order.
pub fn collect_files(cwd: &Path, root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(cwd, root, |entry| {
        files.push(entry.rel_path);
        Ok(())
    })?;
    Ok(files)
}

fn walk_dir<F>(root: &Path, current: &Path, inherited: &IgnoreSet, visit: &mut F) -> Result<()>
where
    F: FnMut(WalkEntry) -> Result<()>,
{
    // Copy-on-descend: this directory's set is the parent's plus its own
    // rule file. The extended set dies with this stack frame.
    let ignores = inherited.extended(current)?;

    let entries = fs::read_dir(current).map_err(|e| BmvError::walk_io(current, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| BmvError::walk_io(current, e))?;
        if entry.file_name() == GIT_DIR {
            continue;
        }

        let abs = entry.path();
        let file_type = entry.file_type().map_err(|e| BmvError::walk_io(&abs, e))?;
        let is_dir = file_type.is_dir();

        if ignores.matched(&abs, is_dir) {
            continue;
        }

        if is_dir {
            walk_dir(root, &abs, &ignores, visit)?;
        } else {
            let metadata = entry.metadata().map_err(|e| BmvError::walk_io(&abs, e))?;
            let rel_path = abs.strip_prefix(root).unwrap_or(&abs).to_path_buf();
            visit(WalkEntry { rel_path, metadata })?;
        }
    }

    Ok(())
}

/// Remove directories left empty along the chain from `path` up toward
/// `stop`, stopping at the first non-empty directory. `stop` itself is never
/// removed. Read or remove errors end the chain silently: pruning is
/// cosmetic cleanup, not part of the transaction's correctness.
///
/// Returns the number of directories removed.
pub fn prune_empty_ancestors(path: &Path, stop: &Path) -> usize {
    let mut pruned = 0;
    if !path.starts_with(stop) {
        return pruned;
    }

    let mut current = path;
    while current != stop {
        match is_dir_empty(current) {
            Ok(true) => {
                if fs::remove_dir(current).is_err() {
                    return pruned;
                }
                pruned += 1;
            }
            Ok(false) | Err(_) => return pruned,
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return pruned,
        }
    }

    pruned
}

fn is_dir_empty(path: &Path) -> std::io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::ignores::IGNORE_FILENAME;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel).unwrap();
    }

    fn walked(root: &Path) -> BTreeSet<String> {
        collect_files(root, root)
            .unwrap()
            .into_iter()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn walks_files_not_directories() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.txt");
        touch(tmp.path(), "sub/b.txt");
        fs::create_dir_all(tmp.path().join("empty")).unwrap();

        let files = walked(tmp.path());
        assert_eq!(
            files,
            BTreeSet::from(["a.txt".to_string(), "sub/b.txt".to_string()])
        );
    }

    #[test]
    fn skips_git_directory_unconditionally() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), ".git/config");
        touch(tmp.path(), ".git/objects/ab/cdef");
        touch(tmp.path(), "tracked.txt");

        let files = walked(tmp.path());
        assert_eq!(files, BTreeSet::from(["tracked.txt".to_string()]));
    }

    #[test]
    fn ignore_rule_excludes_subtree() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(IGNORE_FILENAME), "build/\n").unwrap();
        touch(tmp.path(), "build/out.o");
        touch(tmp.path(), "other/build-like/x");
        touch(tmp.path(), "src/main.c");

        let files = walked(tmp.path());
        assert!(!files.contains("build/out.o"));
        // "build-like" is not "build": no false positives on similar names.
        assert!(files.contains("other/build-like/x"));
        assert!(files.contains("src/main.c"));
    }

    #[test]
    fn child_rules_do_not_leak_sideways() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a")).unwrap();
        fs::write(tmp.path().join("a").join(IGNORE_FILENAME), "secret.txt\n").unwrap();
        touch(tmp.path(), "a/secret.txt");
        touch(tmp.path(), "b/secret.txt");

        let files = walked(tmp.path());
        assert!(!files.contains("a/secret.txt"));
        assert!(files.contains("b/secret.txt"));
        // The rule file itself is still a regular file in the listing.
        assert!(files.contains(&format!("a/{IGNORE_FILENAME}")));
    }

    #[test]
    fn ancestor_rules_above_root_apply() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("repo").join("docs");
        fs::create_dir_all(&root).unwrap();
        fs::write(
            tmp.path().join("repo").join(IGNORE_FILENAME),
            "*.draft\n",
        )
        .unwrap();
        touch(&root, "kept.md");
        touch(&root, "wip.draft");

        let files: BTreeSet<String> = collect_files(tmp.path(), &root)
            .unwrap()
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        assert!(files.contains("kept.md"));
        assert!(!files.contains("wip.draft"));
    }

    #[test]
    fn walk_fails_when_start_is_not_prefix() {
        let tmp = TempDir::new().unwrap();
        let elsewhere = tmp.path().join("elsewhere");
        let err = collect_files(&elsewhere, tmp.path()).unwrap_err();
        assert_eq!(err.code(), "BMV-1101");
    }

    #[test]
    fn walk_fails_on_missing_root() {
        let tmp = TempDir::new().unwrap();
        let gone = tmp.path().join("nope");
        let err = collect_files(tmp.path(), &gone).unwrap_err();
        assert_eq!(err.code(), "BMV-2002");
    }

    #[test]
    fn visit_error_short_circuits() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "one.txt");
        touch(tmp.path(), "two.txt");

        let mut seen = 0;
        let err = walk(tmp.path(), tmp.path(), |_| {
            seen += 1;
            Err(BmvError::io(
                tmp.path(),
                std::io::Error::other("stop here"),
            ))
        })
        .unwrap_err();
        assert_eq!(seen, 1);
        assert_eq!(err.code(), "BMV-3005");
    }

    #[test]
    fn entries_carry_metadata() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "data.bin");

        walk(tmp.path(), tmp.path(), |entry| {
            assert!(entry.metadata.is_file());
            assert_eq!(entry.metadata.len(), "data.bin".len() as u64);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn prune_removes_empty_chain_but_not_stop() {
        let tmp = TempDir::new().unwrap();
        let leaf = tmp.path().join("a").join("b");
        fs::create_dir_all(&leaf).unwrap();

        let pruned = prune_empty_ancestors(&leaf, tmp.path());
        assert_eq!(pruned, 2);
        assert!(!tmp.path().join("a").exists());
        assert!(tmp.path().exists(), "stop directory must survive");
    }

    #[test]
    fn prune_stops_at_first_non_empty_directory() {
        let tmp = TempDir::new().unwrap();
        let leaf = tmp.path().join("a").join("b");
        fs::create_dir_all(&leaf).unwrap();
        fs::write(tmp.path().join("a").join("keep.txt"), "x").unwrap();

        let pruned = prune_empty_ancestors(&leaf, tmp.path());
        assert_eq!(pruned, 1);
        assert!(!leaf.exists());
        assert!(tmp.path().join("a").exists());
    }

    #[test]
    fn prune_ignores_paths_outside_stop() {
        let tmp = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let leaf = other.path().join("x");
        fs::create_dir_all(&leaf).unwrap();

        assert_eq!(prune_empty_ancestors(&leaf, tmp.path()), 0);
        assert!(leaf.exists());
    }

    #[test]
    fn prune_of_missing_path_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(prune_empty_ancestors(&tmp.path().join("gone"), tmp.path()), 0);
    }
}
