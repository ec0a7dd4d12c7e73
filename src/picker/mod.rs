//! Interactive script picker: a scrollable terminal list bound to keyboard
//! events.
//!
//! All selection/scroll logic lives in [`PickerState`], an explicit state
//! struct created when the UI starts and discarded when it exits. Its
//! methods are pure and need no terminal. The crossterm event loop in
//! [`run`] is a thin shell around it.

#![allow(missing_docs)]

pub mod scripts;

use std::io::{self, Write};
use std::process::Command;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute, queue};

use crate::core::errors::{BmvError, Result};
pub use scripts::{ScriptCommand, ScriptManifest, load_manifest};

/// Blank rows reserved above the list (title row + spacer).
const PADDING_TOP: usize = 2;
/// Blank rows reserved below the list (spacer + footer row).
const PADDING_BOTTOM: usize = 2;
/// Number of digit shortcuts offered for visible rows.
const SHORTCUT_ROWS: usize = 10;

/// Selection and scroll state for the picker list.
#[derive(Debug)]
pub struct PickerState {
    manifest: ScriptManifest,
    /// Index of the highlighted command.
    pub selected: usize,
    /// Index of the first visible row.
    pub offset: usize,
}

impl PickerState {
    /// Start with the first command highlighted and the window at the top.
    pub fn new(manifest: ScriptManifest) -> Self {
        Self {
            manifest,
            selected: 0,
            offset: 0,
        }
    }

    /// Rows available for list content given the terminal height.
    pub fn visible_rows(terminal_height: usize) -> usize {
        terminal_height.saturating_sub(PADDING_TOP + PADDING_BOTTOM)
    }

    /// Move the cursor down one row, scrolling the window when it would
    /// leave the visible range.
    pub fn cursor_down(&mut self, visible: usize) {
        if self.manifest.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.manifest.len() - 1);
        if visible > 0 && self.selected >= self.offset + visible {
            self.offset = self.selected - visible + 1;
        }
    }

    /// Move the cursor up one row, scrolling the window when needed.
    pub fn cursor_up(&mut self) {
        if self.manifest.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        }
    }

    /// Map a digit shortcut to a command index.
    ///
    /// Digits label the visible rows except the selected one (which already
    /// has Enter), so the mapping skips over the cursor row.
    pub fn shortcut_index(&self, shortcut: usize) -> Option<usize> {
        let idx = if shortcut < self.selected.saturating_sub(self.offset) {
            self.offset + shortcut
        } else {
            self.offset + shortcut + 1
        };
        (idx < self.manifest.len() && shortcut < SHORTCUT_ROWS).then_some(idx)
    }

    /// Currently highlighted command, if any.
    pub fn selected_command(&self) -> Option<&ScriptCommand> {
        self.manifest.commands.get(self.selected)
    }

    fn header(&self) -> String {
        if self.offset == 0 {
            format!(" ({} commands)", self.manifest.len())
        } else {
            format!(" ({} above)", self.offset)
        }
    }

    fn footer(&self, visible: usize) -> String {
        let below = self.manifest.len().saturating_sub(self.offset + visible);
        if below > 0 {
            format!(" ({below} below)")
        } else {
            String::new()
        }
    }
}

/// Truncate `value` to at most `n` characters.
fn head(value: &str, n: usize) -> &str {
    match value.char_indices().nth(n) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Run the picker UI. Returns the chosen command, or `None` on cancel.
pub fn run(manifest: ScriptManifest) -> Result<Option<ScriptCommand>> {
    let mut state = PickerState::new(manifest);
    let _guard = TerminalGuard::enter()?;
    let mut out = io::stdout();

    loop {
        let (width, height) = terminal::size().map_err(runtime_err)?;
        let visible = PickerState::visible_rows(height as usize);
        render(&state, &mut out, width as usize, visible)?;

        let Event::Key(key) = event::read().map_err(runtime_err)? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j' | 's') => state.cursor_down(visible),
            KeyCode::Up | KeyCode::Char('k' | 'w') => state.cursor_up(),
            KeyCode::Enter => return Ok(state.selected_command().cloned()),
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(None);
            }
            KeyCode::Char(digit @ '0'..='9') => {
                let shortcut = digit as usize - '0' as usize;
                if let Some(idx) = state.shortcut_index(shortcut) {
                    state.selected = idx;
                    return Ok(state.selected_command().cloned());
                }
            }
            _ => {}
        }
    }
}

/// Execute the chosen script with inherited stdio, blocking until it exits.
pub fn run_script(command: &ScriptCommand) -> Result<()> {
    let status = Command::new("npm")
        .args(["run", &command.name])
        .status()
        .map_err(|err| BmvError::ScriptFailed {
            name: command.name.clone(),
            details: err.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(BmvError::ScriptFailed {
            name: command.name.clone(),
            details: format!("exited with {status}"),
        })
    }
}

fn render(state: &PickerState, out: &mut impl Write, width: usize, visible: usize) -> Result<()> {
    queue!(out, Clear(ClearType::All), cursor::MoveTo(0, 0)).map_err(runtime_err)?;

    // Title row: bold title left, count/above right.
    let header = state.header();
    let title = head(
        &format!("[{}]", state.manifest.title),
        width.saturating_sub(header.len() + 1),
    )
    .to_string();
    let gap = width.saturating_sub(title.len() + header.len());
    queue!(
        out,
        crossterm::style::PrintStyledContent(title.bold()),
        crossterm::style::Print(format!("{}{header}\r\n", " ".repeat(gap)))
    )
    .map_err(runtime_err)?;
    for _ in 1..PADDING_TOP {
        queue!(out, crossterm::style::Print("\r\n")).map_err(runtime_err)?;
    }

    // List rows.
    let mut shortcut_position = 0;
    for row in 0..visible.min(state.manifest.len()) {
        let i = row + state.offset;
        let Some(cmd) = state.manifest.commands.get(i) else {
            break;
        };

        if i == state.selected {
            let tail = " [Enter]";
            let mut remaining = width.saturating_sub(tail.len() + 2);
            let name = head(&cmd.name, remaining).to_string();
            remaining = remaining.saturating_sub(name.len());
            let detail = head(&format!(": {}", cmd.command), remaining).to_string();
            remaining = remaining.saturating_sub(detail.len());
            queue!(
                out,
                crossterm::style::PrintStyledContent("> ".yellow().bold()),
                crossterm::style::PrintStyledContent(name.cyan().bold().underlined()),
                crossterm::style::Print(detail),
                crossterm::style::Print(" ".repeat(remaining)),
                crossterm::style::PrintStyledContent(tail.green().bold()),
                crossterm::style::Print("\r\n")
            )
            .map_err(runtime_err)?;
        } else {
            let shortcut = (shortcut_position < SHORTCUT_ROWS)
                .then(|| format!(" ({shortcut_position})"))
                .unwrap_or_default();
            let mut remaining = width.saturating_sub(2 + shortcut.len());
            let name = head(&cmd.name, remaining).to_string();
            remaining = remaining.saturating_sub(name.len());
            let detail = head(&format!(": {}", cmd.command), remaining).to_string();
            remaining = remaining.saturating_sub(detail.len());
            queue!(
                out,
                crossterm::style::Print("  "),
                crossterm::style::PrintStyledContent(name.cyan().bold()),
                crossterm::style::PrintStyledContent(detail.dim()),
                crossterm::style::Print(" ".repeat(remaining)),
                crossterm::style::PrintStyledContent(shortcut.dim()),
                crossterm::style::Print("\r\n")
            )
            .map_err(runtime_err)?;
            shortcut_position += 1;
        }
    }

    // Footer row: quit hint left, below-count right.
    for _ in 1..PADDING_BOTTOM {
        queue!(out, crossterm::style::Print("\r\n")).map_err(runtime_err)?;
    }
    let footer = state.footer(visible);
    let hint = head("CTRL+C to quit", width.saturating_sub(footer.len()));
    let gap = width.saturating_sub(hint.len() + footer.len());
    queue!(
        out,
        crossterm::style::PrintStyledContent(hint.to_string().dim()),
        crossterm::style::Print(format!("{}{footer}", " ".repeat(gap)))
    )
    .map_err(runtime_err)?;

    out.flush().map_err(runtime_err)
}

fn runtime_err(err: io::Error) -> BmvError {
    BmvError::Runtime {
        details: err.to_string(),
    }
}

/// RAII guard: raw mode + alternate screen + hidden cursor, restored on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode().map_err(runtime_err)?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(runtime_err(err));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
