//! Configuration system: TOML file + env var overrides + defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{BmvError, Result};
use crate::core::paths;

/// Full bmv configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub editor: EditorConfig,
    pub rename: RenameConfig,
    pub journal: JournalConfig,
    pub paths: PathsConfig,
}

/// Editor selection: explicit command first, then env vars, then fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditorConfig {
    /// Editor command to use unconditionally (overrides $VISUAL/$EDITOR).
    pub command: Option<String>,
    /// Fallback editors tried in order when no command or env var applies.
    pub fallbacks: Vec<String>,
}

/// Rename transaction knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenameConfig {
    /// Re-hash each copied destination against its source before the delete
    /// pass. Costs a second read of every moved file.
    pub verify_copies: bool,
    /// Leave the scratch listing file behind after a run.
    pub keep_listing: bool,
}

/// Append-only JSONL journal of applied renames.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JournalConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

/// Filesystem paths used by bmv.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            command: None,
            fallbacks: vec![
                "code".to_string(),
                "nano".to_string(),
                "vim".to_string(),
                "vi".to_string(),
            ],
        }
    }
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            verify_copies: true,
            keep_listing: false,
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: paths::default_journal_path(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_file: paths::default_config_path(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// With an explicit `path`, the file must exist. Without one, the default
    /// location is read if present, otherwise built-in defaults apply. Env
    /// overrides are applied after the file, then the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(paths::default_config_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| BmvError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(BmvError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(|name| env::var(name).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `BMV_*` env overrides via a lookup function (injectable for tests).
    fn apply_env_overrides_from<F>(&mut self, mut lookup: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(editor) = lookup("BMV_EDITOR")
            && !editor.is_empty()
        {
            self.editor.command = Some(editor);
        }

        if let Some(journal) = lookup("BMV_JOURNAL") {
            match journal.as_str() {
                "0" | "false" | "off" => self.journal.enabled = false,
                "" | "1" | "true" | "on" => self.journal.enabled = true,
                other => {
                    self.journal.enabled = true;
                    self.journal.path = PathBuf::from(other);
                }
            }
        }

        if let Some(flag) = lookup("BMV_NO_VERIFY")
            && matches!(flag.as_str(), "1" | "true" | "on")
        {
            self.rename.verify_copies = false;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.editor.command.is_none() && self.editor.fallbacks.is_empty() {
            return Err(BmvError::InvalidConfig {
                details: "editor.fallbacks must not be empty when editor.command is unset"
                    .to_string(),
            });
        }
        if self.journal.enabled && self.journal.path.as_os_str().is_empty() {
            return Err(BmvError::InvalidConfig {
                details: "journal.path must not be empty when journal.enabled is true".to_string(),
            });
        }
        Ok(())
    }
}
