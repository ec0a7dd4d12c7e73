//! Listing parsing and move-intent derivation.
//!
//! Pure transformation layer: pairs the original walk listing with the
//! user-edited listing line by line and produces [`MoveIntent`]s. Nothing
//! here touches the filesystem.

use std::path::{Path, PathBuf};

use crate::core::errors::{BmvError, Result};

/// A proposed move derived from one listing line pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    /// Absolute path of the file as it exists now.
    pub source: PathBuf,
    /// Absolute path the file should move to.
    pub dest: PathBuf,
    /// Source and destination are the same path (a no-op move).
    pub identical: bool,
}

impl MoveIntent {
    /// Build an intent, deriving the identity flag.
    pub fn new(source: PathBuf, dest: PathBuf) -> Self {
        let identical = source == dest;
        Self {
            source,
            dest,
            identical,
        }
    }
}

/// Result of pairing the two listings.
#[derive(Debug, Default)]
pub struct DiffOutcome {
    /// Intents in listing order, one per non-skipped line pair.
    pub intents: Vec<MoveIntent>,
    /// Original (root-relative) paths whose destination line was left empty.
    /// These files are deliberately left untouched.
    pub skipped: Vec<String>,
}

/// Split listing text into lines, dropping trailing blank lines.
///
/// Editors routinely append a final newline on save; a trailing blank must
/// not change the line count and trip the mismatch guard.
pub fn parse_listing(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines
}

/// Pair the original paths with the edited paths positionally.
///
/// The listings must have the same length: the *i*-th edited line is what the
/// *i*-th original file should become. A mismatched count is rejected before
/// any filesystem mutation. An empty (or whitespace-only) edited line means
/// "leave this file alone" and is reported in [`DiffOutcome::skipped`] rather
/// than producing an intent.
pub fn compute_moves(root: &Path, old_paths: &[String], new_paths: &[String]) -> Result<DiffOutcome> {
    if old_paths.len() != new_paths.len() {
        return Err(BmvError::ListingCountMismatch {
            expected: old_paths.len(),
            actual: new_paths.len(),
        });
    }

    let mut outcome = DiffOutcome::default();
    for (old, new) in old_paths.iter().zip(new_paths) {
        if new.trim().is_empty() {
            outcome.skipped.push(old.clone());
            continue;
        }
        outcome
            .intents
            .push(MoveIntent::new(root.join(old), root.join(new)));
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn parse_drops_trailing_blank_lines() {
        assert_eq!(parse_listing("a\nb\n"), strings(&["a", "b"]));
        assert_eq!(parse_listing("a\nb\n\n\n"), strings(&["a", "b"]));
        assert_eq!(parse_listing("a\nb\n   \n"), strings(&["a", "b"]));
    }

    #[test]
    fn parse_keeps_interior_blank_lines() {
        // An interior blank is a skip marker, not noise.
        assert_eq!(parse_listing("a\n\nc\n"), strings(&["a", "", "c"]));
    }

    #[test]
    fn parse_of_empty_text_is_empty() {
        assert!(parse_listing("").is_empty());
        assert!(parse_listing("\n\n").is_empty());
    }

    #[test]
    fn mismatched_counts_are_rejected() {
        let root = Path::new("/r");
        let err = compute_moves(root, &strings(&["a", "b"]), &strings(&["a"])).unwrap_err();
        assert_eq!(err.code(), "BMV-2101");
    }

    #[test]
    fn identity_lines_flagged_identical() {
        let root = Path::new("/r");
        let outcome =
            compute_moves(root, &strings(&["a.txt", "b.txt"]), &strings(&["a.txt", "c.txt"]))
                .unwrap();
        assert_eq!(outcome.intents.len(), 2);
        assert!(outcome.intents[0].identical);
        assert!(!outcome.intents[1].identical);
        assert_eq!(outcome.intents[1].dest, PathBuf::from("/r/c.txt"));
    }

    #[test]
    fn empty_line_means_skip() {
        let root = Path::new("/r");
        let outcome =
            compute_moves(root, &strings(&["a", "b", "c"]), &strings(&["a", "", "c2"])).unwrap();
        assert_eq!(outcome.intents.len(), 2);
        assert_eq!(outcome.skipped, strings(&["b"]));
    }

    #[test]
    fn whitespace_only_line_also_skips() {
        let root = Path::new("/r");
        let outcome = compute_moves(root, &strings(&["a"]), &strings(&["   "])).unwrap();
        assert!(outcome.intents.is_empty());
        assert_eq!(outcome.skipped, strings(&["a"]));
    }

    #[test]
    fn paths_are_joined_onto_root() {
        let root = Path::new("/walk/root");
        let outcome =
            compute_moves(root, &strings(&["sub/a.txt"]), &strings(&["other/b.txt"])).unwrap();
        assert_eq!(outcome.intents[0].source, PathBuf::from("/walk/root/sub/a.txt"));
        assert_eq!(outcome.intents[0].dest, PathBuf::from("/walk/root/other/b.txt"));
    }

    proptest! {
        #[test]
        fn unchanged_listing_yields_only_identity_intents(
            rels in proptest::collection::vec("[a-z]{1,8}(/[a-z]{1,8}){0,3}", 0..24)
        ) {
            let root = Path::new("/r");
            let outcome = compute_moves(root, &rels, &rels).unwrap();
            prop_assert_eq!(outcome.intents.len(), rels.len());
            prop_assert!(outcome.skipped.is_empty());
            prop_assert!(outcome.intents.iter().all(|i| i.identical));
        }

        #[test]
        fn every_line_pair_is_accounted_for(
            pairs in proptest::collection::vec(("[a-z]{1,8}", prop_oneof!["[a-z]{1,8}", Just(String::new())]), 0..24)
        ) {
            let root = Path::new("/r");
            let old: Vec<String> = pairs.iter().map(|(o, _)| o.clone()).collect();
            let new: Vec<String> = pairs.iter().map(|(_, n)| n.clone()).collect();
            let outcome = compute_moves(root, &old, &new).unwrap();
            prop_assert_eq!(outcome.intents.len() + outcome.skipped.len(), pairs.len());
        }
    }
}
