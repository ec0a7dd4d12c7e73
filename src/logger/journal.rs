//! Append-only JSONL journal of rename activity.
//!
//! Each line is a self-contained JSON object, assembled in memory and written
//! with a single `write_all` so a tailing process never observes a partial
//! line. Journaling is strictly best-effort: a failure degrades to one stderr
//! warning and then silent discard. A rename never fails because its journal
//! could not be written.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::config::JournalConfig;

/// Severity level for journal events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Journal event types matching the rename transaction model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RunStarted,
    FileMoved,
    CopyRolledBack,
    RollbackFailed,
    DeleteFailed,
    RunCompleted,
    RunFailed,
}

/// A single journal entry. All fields optional except `ts`, `event`,
/// `severity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// RFC 3339 UTC timestamp.
    pub ts: String,
    /// Event type identifier.
    pub event: EventType,
    /// Severity level.
    pub severity: Severity,
    /// Affected source path (when applicable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Destination path for moves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    /// Size in bytes of the moved content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// BMV error code if the action failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Human-readable error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Freeform details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl JournalEntry {
    /// Create a new entry stamped with the current UTC time.
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: Utc::now().to_rfc3339(),
            event,
            severity,
            path: None,
            dest: None,
            size: None,
            error_code: None,
            error_message: None,
            details: None,
        }
    }

    /// Attach a source path.
    #[must_use]
    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_string_lossy().into_owned());
        self
    }

    /// Attach a destination path.
    #[must_use]
    pub fn with_dest(mut self, dest: &Path) -> Self {
        self.dest = Some(dest.to_string_lossy().into_owned());
        self
    }

    /// Attach an error code and message.
    #[must_use]
    pub fn with_error(mut self, code: &str, message: impl Into<String>) -> Self {
        self.error_code = Some(code.to_string());
        self.error_message = Some(message.into());
        self
    }

    /// Attach freeform details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Append-only journal writer.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    warned: AtomicBool,
}

impl Journal {
    /// Create a writer targeting `path`. The file and its parent directory
    /// are created lazily on first record.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            warned: AtomicBool::new(false),
        }
    }

    /// Build a writer from config, or `None` when journaling is disabled.
    pub fn from_config(cfg: &JournalConfig) -> Option<Self> {
        cfg.enabled.then(|| Self::new(cfg.path.clone()))
    }

    /// Journal file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one entry. Failures degrade to a single stderr warning and are
    /// then discarded.
    pub fn record(&self, entry: &JournalEntry) {
        if let Err(err) = self.try_append(entry)
            && !self.warned.swap(true, Ordering::Relaxed)
        {
            eprintln!(
                "[BMV-JOURNAL] cannot write {}: {err}; further journal output discarded",
                self.path.display()
            );
        }
    }

    fn try_append(&self, entry: &JournalEntry) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(entry).map_err(std::io::Error::other)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())
    }
}
