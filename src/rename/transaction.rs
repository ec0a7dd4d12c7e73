//! Transactional rename executor: copy-then-delete with rollback.
//!
//! Pipeline: move intents -> copy pass -> (rollback on failure) -> delete
//! pass -> prune emptied directories.
//!
//! The guarantee is "copy-phase atomicity, best-effort delete-phase cleanup":
//! a failure while copying rolls back every destination written so far and
//! leaves the tree as it started; a failure while deleting originals is
//! reported but not unwound. The affected file then exists at both its old
//! and new path, so no data is ever lost.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::core::errors::{BmvError, Result};
use crate::logger::journal::{EventType, Journal, JournalEntry, Severity};
use crate::rename::diff::MoveIntent;
use crate::walker::walk::prune_empty_ancestors;

/// Configuration for the rename executor.
#[derive(Debug, Clone)]
pub struct TransactionConfig {
    /// Report what would move without touching the filesystem.
    pub dry_run: bool,
    /// Re-hash each copied destination against its source before the delete
    /// pass runs. A mismatch is treated like any other copy failure.
    pub verify_copies: bool,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            verify_copies: true,
        }
    }
}

/// Summary after a transaction completes.
#[derive(Debug, Clone)]
pub struct ApplyReport {
    /// Files whose copy and delete both succeeded.
    pub files_moved: usize,
    /// Intents skipped because source and destination were identical.
    pub identity_skips: usize,
    /// Total bytes copied during the copy pass.
    pub bytes_copied: u64,
    /// Delete-pass failures; the listed files exist at both paths.
    pub delete_failures: Vec<DeleteFailure>,
    /// Directories removed because the moves emptied them.
    pub pruned_dirs: usize,
    /// Wall-clock duration of the apply call.
    pub duration: Duration,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

/// A single delete-pass failure record.
#[derive(Debug, Clone)]
pub struct DeleteFailure {
    /// Source path that could not be deleted.
    pub path: PathBuf,
    /// Human-readable failure description.
    pub error: String,
    /// Stable BMV error code.
    pub error_code: String,
}

impl DeleteFailure {
    fn from_error(path: &Path, err: &BmvError) -> Self {
        Self {
            path: path.to_path_buf(),
            error: err.to_string(),
            error_code: err.code().to_string(),
        }
    }
}

/// The rename executor: applies move intents with all-or-nothing copy
/// semantics.
pub struct RenameTransaction {
    config: TransactionConfig,
    journal: Option<Journal>,
}

impl RenameTransaction {
    /// Create an executor with the given config and optional journal.
    pub fn new(config: TransactionConfig, journal: Option<Journal>) -> Self {
        Self { config, journal }
    }

    /// Execute the intents against the tree rooted at `root`.
    ///
    /// Identity intents are skipped. Non-identity intents are copied in
    /// order; the first copy failure rolls back every destination written so
    /// far and surfaces the copy error. Only after every copy has succeeded
    /// are the sources deleted and their emptied parent directories pruned
    /// (never `root` itself).
    pub fn apply(&self, root: &Path, intents: &[MoveIntent]) -> Result<ApplyReport> {
        let start = Instant::now();
        let moves: Vec<&MoveIntent> = intents.iter().filter(|i| !i.identical).collect();

        let mut report = ApplyReport {
            files_moved: 0,
            identity_skips: intents.len() - moves.len(),
            bytes_copied: 0,
            delete_failures: Vec::new(),
            pruned_dirs: 0,
            duration: Duration::ZERO,
            dry_run: self.config.dry_run,
        };

        if self.config.dry_run {
            report.files_moved = moves.len();
            report.duration = start.elapsed();
            return Ok(report);
        }

        self.journal_event(
            JournalEntry::new(EventType::RunStarted, Severity::Info)
                .with_path(root)
                .with_details(format!("{} moves planned", moves.len())),
        );

        // Copy pass. `high_water` counts successfully copied intents; on
        // failure, exactly intents[..high_water] have destinations to undo.
        let mut high_water = 0;
        let mut copy_error = None;
        for intent in &moves {
            match self.copy_intent(intent) {
                Ok(bytes) => {
                    report.bytes_copied += bytes;
                    high_water += 1;
                }
                Err(err) => {
                    copy_error = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = copy_error {
            self.rollback(root, &moves[..high_water]);
            self.journal_event(
                JournalEntry::new(EventType::RunFailed, Severity::Critical)
                    .with_path(root)
                    .with_error(err.code(), err.to_string()),
            );
            return Err(err);
        }

        // Delete pass. Failures are recorded, not unwound: the copy already
        // succeeded, so the file exists at both paths until a retry removes
        // the original.
        for intent in &moves {
            match fs::remove_file(&intent.source) {
                Ok(()) => {
                    report.files_moved += 1;
                    if let Some(parent) = intent.source.parent() {
                        report.pruned_dirs += prune_empty_ancestors(parent, root);
                    }
                    self.journal_event(
                        JournalEntry::new(EventType::FileMoved, Severity::Info)
                            .with_path(&intent.source)
                            .with_dest(&intent.dest),
                    );
                }
                Err(io_err) => {
                    let err = BmvError::DeleteFailed {
                        path: intent.source.clone(),
                        details: io_err.to_string(),
                    };
                    self.journal_event(
                        JournalEntry::new(EventType::DeleteFailed, Severity::Warning)
                            .with_path(&intent.source)
                            .with_error(err.code(), err.to_string()),
                    );
                    report
                        .delete_failures
                        .push(DeleteFailure::from_error(&intent.source, &err));
                }
            }
        }

        self.journal_event(
            JournalEntry::new(EventType::RunCompleted, Severity::Info)
                .with_path(root)
                .with_details(format!(
                    "{} moved, {} delete failures",
                    report.files_moved,
                    report.delete_failures.len()
                )),
        );

        report.duration = start.elapsed();
        Ok(report)
    }

    // ──────────────────── copy pass ────────────────────

    fn copy_intent(&self, intent: &MoveIntent) -> Result<u64> {
        if let Some(parent) = intent.dest.parent() {
            fs::create_dir_all(parent).map_err(|e| BmvError::CopyFailed {
                src: intent.source.clone(),
                dst: intent.dest.clone(),
                details: format!("create destination directory: {e}"),
            })?;
        }

        let (bytes, digest) =
            copy_file(&intent.source, &intent.dest).map_err(|e| BmvError::CopyFailed {
                src: intent.source.clone(),
                dst: intent.dest.clone(),
                details: e.to_string(),
            })?;

        if self.config.verify_copies {
            let dest_digest = digest_file(&intent.dest).map_err(|e| BmvError::CopyFailed {
                src: intent.source.clone(),
                dst: intent.dest.clone(),
                details: format!("verify read-back: {e}"),
            })?;
            if dest_digest != digest {
                return Err(BmvError::CopyVerifyMismatch {
                    src: intent.source.clone(),
                    dst: intent.dest.clone(),
                });
            }
        }

        Ok(bytes)
    }

    // ──────────────────── rollback ────────────────────

    /// Undo the already-copied prefix after a copy-pass failure.
    ///
    /// Rollback failures are reported distinctly but never mask the copy
    /// error that triggered the rollback; the caller always receives that
    /// original error.
    fn rollback(&self, root: &Path, copied: &[&MoveIntent]) {
        for intent in copied {
            if let Err(io_err) = fs::remove_file(&intent.dest) {
                let err = BmvError::RollbackFailed {
                    path: intent.dest.clone(),
                    details: io_err.to_string(),
                };
                eprintln!("bmv: {err}");
                self.journal_event(
                    JournalEntry::new(EventType::RollbackFailed, Severity::Critical)
                        .with_path(&intent.dest)
                        .with_error(err.code(), err.to_string()),
                );
                continue;
            }
            if let Some(parent) = intent.dest.parent() {
                prune_empty_ancestors(parent, root);
            }
            self.journal_event(
                JournalEntry::new(EventType::CopyRolledBack, Severity::Warning)
                    .with_path(&intent.dest),
            );
        }
    }

    fn journal_event(&self, entry: JournalEntry) {
        if let Some(journal) = &self.journal {
            journal.record(&entry);
        }
    }
}

/// Copy `src` to `dst`, returning the byte count and content digest.
///
/// Content copy only: permissions and timestamps are not preserved.
fn copy_file(src: &Path, dst: &Path) -> std::io::Result<(u64, [u8; 32])> {
    let mut reader = File::open(src)?;
    let mut writer = File::create(dst)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        writer.write_all(&buf[..n])?;
        total += n as u64;
    }
    writer.flush()?;

    Ok((total, hasher.finalize().into()))
}

fn digest_file(path: &Path) -> std::io::Result<[u8; 32]> {
    let mut reader = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finalize().into())
}
