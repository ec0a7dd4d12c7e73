//! Layered `.gitignore` matching for the tree walker.
//!
//! Each directory may carry its own `.gitignore`; a child directory's rule
//! set is its parent's set plus the child's own file. Sets are extended by
//! value on descent, so a rule loaded in one subtree can never leak into a
//! sibling subtree.

use std::path::Path;
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::core::errors::{BmvError, Result};

/// Reserved per-directory ignore-rule filename.
pub const IGNORE_FILENAME: &str = ".gitignore";

/// One compiled ignore-rule file, rooted at the directory that owns it.
///
/// Pattern semantics (glob segments, leading-slash anchoring, trailing-slash
/// directory-only rules, `!` negation) are the `ignore` crate's and are not
/// reinterpreted here.
#[derive(Debug)]
pub struct IgnoreRule {
    matcher: Gitignore,
}

impl IgnoreRule {
    /// Compile `dir/.gitignore` if it exists.
    ///
    /// Returns `Ok(None)` when the directory has no rule file. A file that
    /// cannot be read or contains an invalid pattern is a configuration
    /// error: the walk must not proceed on a partially-loaded rule set.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let file = dir.join(IGNORE_FILENAME);
        if !file.is_file() {
            return Ok(None);
        }

        let mut builder = GitignoreBuilder::new(dir);
        if let Some(err) = builder.add(&file) {
            return Err(BmvError::IgnoreParse {
                path: file,
                details: err.to_string(),
            });
        }
        let matcher = builder.build().map_err(|err| BmvError::IgnoreParse {
            path: file,
            details: err.to_string(),
        })?;

        Ok(Some(Self { matcher }))
    }

    /// Whether this rule file ignores `path`.
    fn matched(&self, path: &Path, is_dir: bool) -> bool {
        self.matcher.matched(path, is_dir).is_ignore()
    }
}

/// Ordered collection of ignore rules accumulated from the start directory
/// down to the directory currently being walked.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    rules: Vec<Arc<IgnoreRule>>,
}

impl IgnoreSet {
    /// Build the rule set that applies above the walk root.
    ///
    /// Walks the path segments from `start_dir` down to (but excluding)
    /// `root`, loading one rule file per segment. The walk itself loads
    /// `root`'s own file on entry, so an ancestor-level rule such as a
    /// repository `.gitignore` is honored even when the walk root is a
    /// subdirectory.
    pub fn initial(start_dir: &Path, root: &Path) -> Result<Self> {
        let remainder = root
            .strip_prefix(start_dir)
            .map_err(|_| BmvError::StartNotPrefix {
                start: start_dir.to_path_buf(),
                root: root.to_path_buf(),
            })?;

        let mut set = Self::default();
        if start_dir == root {
            return Ok(set);
        }

        let mut dir = start_dir.to_path_buf();
        if let Some(rule) = IgnoreRule::load(&dir)? {
            set.rules.push(Arc::new(rule));
        }
        for segment in remainder.components() {
            dir.push(segment);
            if dir == root {
                break;
            }
            if let Some(rule) = IgnoreRule::load(&dir)? {
                set.rules.push(Arc::new(rule));
            }
        }

        Ok(set)
    }

    /// The copy-on-descend step: this set plus `dir`'s own rule file.
    ///
    /// The returned set is independent of `self`; extending it for one child
    /// directory leaves the parent's set untouched for siblings.
    pub fn extended(&self, dir: &Path) -> Result<Self> {
        let mut child = self.clone();
        if let Some(rule) = IgnoreRule::load(dir)? {
            child.rules.push(Arc::new(rule));
        }
        Ok(child)
    }

    /// Whether any rule in the set excludes `path`.
    ///
    /// Rules are OR-ed: a whitelist (`!pattern`) match in one file does not
    /// override an ignore match contributed by another file.
    pub fn matched(&self, path: &Path, is_dir: bool) -> bool {
        self.rules.iter().any(|rule| rule.matched(path, is_dir))
    }

    /// Number of rule files currently layered in the set.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set holds no rule files.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
