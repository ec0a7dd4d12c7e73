//! Ignore-aware tree walking.

pub mod ignores;
pub mod walk;

pub use ignores::{IGNORE_FILENAME, IgnoreRule, IgnoreSet};
pub use walk::{GIT_DIR, WalkEntry, collect_files, prune_empty_ancestors, walk};
