//! External editor invocation.
//!
//! Contract with the rest of the tool: given the scratch listing path, block
//! until the editor process exits; a normal exit means the listing can be
//! read back, anything else aborts the rename before any mutation.
//!
//! Candidates are tried in precedence order, falling through on
//! binary-not-found: explicit override, config `editor.command`, `$VISUAL`,
//! `$EDITOR`, then the configured fallbacks (`code`, `nano`, `vim`, `vi`).
//! GUI editors detach from the terminal, so `code` is given `--wait`, put in
//! its own process group, and a SIGINT listener forwards Ctrl-C to that
//! group while the main flow blocks.

use std::env;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, ExitStatus};
#[cfg(unix)]
use std::time::Duration;

use crate::core::config::EditorConfig;
use crate::core::errors::{BmvError, Result};

/// GUI editor needing `--wait` and process-group signal forwarding.
const GUI_EDITOR: &str = "code";

/// Poll interval while supervising a GUI editor child.
#[cfg(unix)]
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Build the ordered editor candidate list.
///
/// Pure so the precedence rules are testable without touching the process
/// environment. Empty entries are dropped.
pub fn candidate_list(
    override_cmd: Option<&str>,
    visual: Option<&str>,
    editor_env: Option<&str>,
    cfg: &EditorConfig,
) -> Vec<String> {
    let mut candidates = Vec::new();
    let mut push = |value: Option<&str>| {
        if let Some(cmd) = value
            && !cmd.trim().is_empty()
        {
            candidates.push(cmd.to_string());
        }
    };

    push(override_cmd);
    push(cfg.command.as_deref());
    push(visual);
    push(editor_env);
    for fallback in &cfg.fallbacks {
        push(Some(fallback));
    }

    candidates
}

/// Launch an editor on `listing` and block until it exits.
///
/// Candidates whose binary is missing fall through to the next; an editor
/// that launches but exits abnormally is an error, since the user may have
/// saved a half-edited listing.
pub fn edit_listing(listing: &Path, override_cmd: Option<&str>, cfg: &EditorConfig) -> Result<()> {
    let visual = env::var("VISUAL").ok();
    let editor_env = env::var("EDITOR").ok();
    let candidates = candidate_list(
        override_cmd,
        visual.as_deref(),
        editor_env.as_deref(),
        cfg,
    );
    try_candidates(&candidates, listing)
}

/// Try candidates in order, falling through on binary-not-found.
fn try_candidates(candidates: &[String], listing: &Path) -> Result<()> {
    for candidate in candidates {
        match launch(candidate, listing)? {
            Some(status) => return check_status(candidate, status),
            None => {} // binary not found, try the next candidate
        }
    }

    Err(BmvError::NoEditorFound)
}

/// Spawn one candidate. `Ok(None)` means the binary was not found.
fn launch(candidate: &str, listing: &Path) -> Result<Option<ExitStatus>> {
    let mut words = candidate.split_whitespace();
    let Some(program) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let is_gui = Path::new(program)
        .file_name()
        .is_some_and(|name| name == GUI_EDITOR);

    if is_gui {
        return launch_gui(program, &args, listing);
    }

    let mut cmd = Command::new(program);
    cmd.args(&args).arg(listing);
    match cmd.status() {
        Ok(status) => Ok(Some(status)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(BmvError::EditorFailed {
            editor: candidate.to_string(),
            details: err.to_string(),
        }),
    }
}

/// Launch a GUI editor in its own process group, forwarding Ctrl-C.
#[cfg(unix)]
fn launch_gui(program: &str, args: &[&str], listing: &Path) -> Result<Option<ExitStatus>> {
    use std::os::unix::process::CommandExt;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    let mut cmd = Command::new(program);
    cmd.args(args).arg("--wait").arg(listing).process_group(0);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(BmvError::EditorFailed {
                editor: program.to_string(),
                details: err.to_string(),
            });
        }
    };

    println!("CTRL-C to cancel");

    let interrupted = Arc::new(AtomicBool::new(false));
    let sig_id = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&interrupted))
        .map_err(|err| BmvError::EditorFailed {
            editor: program.to_string(),
            details: format!("register SIGINT listener: {err}"),
        })?;

    let result = loop {
        if interrupted.swap(false, Ordering::Relaxed) {
            forward_interrupt(child.id());
        }
        match child.try_wait() {
            Ok(Some(status)) => break Ok(Some(status)),
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(err) => {
                break Err(BmvError::EditorFailed {
                    editor: program.to_string(),
                    details: err.to_string(),
                });
            }
        }
    };

    signal_hook::low_level::unregister(sig_id);
    result
}

#[cfg(not(unix))]
fn launch_gui(program: &str, args: &[&str], listing: &Path) -> Result<Option<ExitStatus>> {
    let mut cmd = Command::new(program);
    cmd.args(args).arg("--wait").arg(listing);
    match cmd.status() {
        Ok(status) => Ok(Some(status)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(BmvError::EditorFailed {
            editor: program.to_string(),
            details: err.to_string(),
        }),
    }
}

/// Forward SIGINT to the editor's process group.
#[cfg(unix)]
fn forward_interrupt(child_pid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if let Ok(raw) = i32::try_from(child_pid) {
        let _ = killpg(Pid::from_raw(raw), Signal::SIGINT);
    }
}

fn check_status(editor: &str, status: ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(BmvError::EditorFailed {
                editor: editor.to_string(),
                details: format!("killed by signal {signal}"),
            });
        }
    }

    Err(BmvError::EditorFailed {
        editor: editor.to_string(),
        details: format!("exited with {status}"),
    })
}
