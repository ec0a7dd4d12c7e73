//! Shared path resolution utilities.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Resolve the walk root from a command-line argument.
///
/// A relative argument (including the default `.`) is joined onto `cwd`; a
/// leading `./` is stripped first so `./src` and `src` resolve identically.
/// `..`/`.` components are folded syntactically without touching the
/// filesystem, so a not-yet-existing root still resolves to a clean path.
pub fn resolve_root(cwd: &Path, arg: &Path) -> PathBuf {
    let arg = arg.strip_prefix("./").unwrap_or(arg);
    let absolute = if arg.is_absolute() {
        arg.to_path_buf()
    } else {
        cwd.join(arg)
    };
    normalize_syntactic(&absolute)
}

/// Fold `.` and `..` components without consulting the filesystem.
fn normalize_syntactic(path: &Path) -> PathBuf {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                }
            }
        }
    }
    components.into_iter().collect()
}

/// Default configuration file location: `$XDG_CONFIG_HOME/bmv/config.toml`,
/// falling back to `~/.config/bmv/config.toml`.
pub fn default_config_path() -> PathBuf {
    base_dir("XDG_CONFIG_HOME", ".config")
        .join("bmv")
        .join("config.toml")
}

/// Default rename-journal location: `$XDG_STATE_HOME/bmv/journal.jsonl`,
/// falling back to `~/.local/state/bmv/journal.jsonl`.
pub fn default_journal_path() -> PathBuf {
    base_dir("XDG_STATE_HOME", ".local/state")
        .join("bmv")
        .join("journal.jsonl")
}

fn base_dir(xdg_var: &str, home_suffix: &str) -> PathBuf {
    if let Ok(dir) = env::var(xdg_var)
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    env::var("HOME").map_or_else(
        |_| env::temp_dir(),
        |home| PathBuf::from(home).join(home_suffix),
    )
}
