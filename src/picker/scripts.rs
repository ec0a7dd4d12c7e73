//! `package.json` script-list loading.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::core::errors::{BmvError, Result};

/// One runnable script: its name and the shell command behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCommand {
    /// Script name (`npm run <name>`).
    pub name: String,
    /// The command string, shown alongside the name in the picker.
    pub command: String,
}

/// The loaded script list: manifest title plus scripts in file order.
#[derive(Debug, Clone, Default)]
pub struct ScriptManifest {
    /// The manifest's `name` field (may be empty).
    pub title: String,
    /// Scripts in the order they appear in the file.
    pub commands: Vec<ScriptCommand>,
}

impl ScriptManifest {
    /// Number of runnable scripts.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the manifest has no scripts.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

// serde_json's preserve_order feature keeps `scripts` in file order, which is
// the order the picker presents.
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    scripts: serde_json::Map<String, Value>,
}

/// Load `name` and `scripts` from a `package.json`.
///
/// A script whose value is not a string is rejected rather than silently
/// skipped: a malformed manifest should be visible, not half-loaded.
pub fn load_manifest(path: &Path) -> Result<ScriptManifest> {
    let raw = fs::read_to_string(path).map_err(|err| BmvError::ManifestLoad {
        path: path.to_path_buf(),
        details: err.to_string(),
    })?;

    let parsed: RawManifest =
        serde_json::from_str(&raw).map_err(|err| BmvError::ManifestLoad {
            path: path.to_path_buf(),
            details: err.to_string(),
        })?;

    let mut commands = Vec::with_capacity(parsed.scripts.len());
    for (name, value) in parsed.scripts {
        let Value::String(command) = value else {
            return Err(BmvError::ManifestLoad {
                path: path.to_path_buf(),
                details: format!("script `{name}` is not a string"),
            });
        };
        commands.push(ScriptCommand { name, command });
    }

    Ok(ScriptManifest {
        title: parsed.name,
        commands,
    })
}
