//! Top-level CLI definition and dispatch.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::Colorize;
use colored::control;
use serde_json::json;
use thiserror::Error;

use bulk_mv::core::config::Config;
use bulk_mv::core::errors::BmvError;
use bulk_mv::core::paths::resolve_root;
use bulk_mv::editor;
use bulk_mv::logger::journal::Journal;
use bulk_mv::picker;
use bulk_mv::rename::diff::{MoveIntent, compute_moves, parse_listing};
use bulk_mv::rename::transaction::{ApplyReport, RenameTransaction, TransactionConfig};
use bulk_mv::walker::walk::collect_files;

/// Rename files by editing their listing in your editor.
#[derive(Debug, Parser)]
#[command(
    name = "bmv",
    author,
    version,
    about = "Bulk rename files by editing their listing",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Walk a tree, edit its listing, apply the renames.
    Rename(RenameArgs),
    /// Print the listing a rename would offer.
    List(ListArgs),
    /// Pick and run a script from a package.json.
    Run(RunArgs),
    /// View configuration state.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct RenameArgs {
    /// Root directory to rename under (defaults to the current directory).
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,
    /// Print planned moves without touching the filesystem.
    #[arg(long)]
    dry_run: bool,
    /// Editor command to use (overrides config and $VISUAL/$EDITOR).
    #[arg(long, value_name = "CMD")]
    editor: Option<String>,
    /// Keep the scratch listing file after the run.
    #[arg(long)]
    keep_listing: bool,
}

#[derive(Debug, Clone, Args, Default)]
struct ListArgs {
    /// Root directory to list (defaults to the current directory).
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Args, Default)]
struct RunArgs {
    /// Script manifest to load (defaults to ./package.json).
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Print the config file location.
    Path,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// Operation partially succeeded.
    #[error("{0}")]
    Partial(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
            Self::Partial(_) => 4,
        }
    }
}

impl From<BmvError> for CliError {
    fn from(err: BmvError) -> Self {
        match err {
            // Bad input or configuration: the user can fix these.
            BmvError::InvalidConfig { .. }
            | BmvError::MissingConfig { .. }
            | BmvError::ConfigParse { .. }
            | BmvError::StartNotPrefix { .. }
            | BmvError::IgnoreParse { .. }
            | BmvError::ListingCountMismatch { .. }
            | BmvError::ManifestLoad { .. }
            | BmvError::NoEditorFound => Self::User(err.to_string()),
            BmvError::Serialization { .. } => Self::Internal(err.to_string()),
            _ => Self::Runtime(err.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Rename(args) => run_rename(cli, args),
        Command::List(args) => run_list(cli, args),
        Command::Run(args) => run_run(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ──────────────────── rename ────────────────────

fn run_rename(cli: &Cli, args: &RenameArgs) -> Result<(), CliError> {
    let cfg = Config::load(cli.config.as_deref())?;
    let (cwd, root) = resolve_walk_root(args.path.as_deref())?;

    let files = collect_files(&cwd, &root)?;
    if files.is_empty() {
        say(cli, &format!("no files to rename under {}", root.display()));
        return Ok(());
    }
    say_verbose(cli, &format!("walked {} files", files.len()));

    // Scratch listing: one root-relative path per line, in walk order.
    let mut listing_text = files
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("\n");
    listing_text.push('\n');

    let mut scratch = tempfile::Builder::new()
        .prefix("bmv-listing-")
        .suffix(".txt")
        .tempfile()
        .map_err(|e| CliError::Runtime(format!("create scratch listing: {e}")))?;
    scratch
        .write_all(listing_text.as_bytes())
        .and_then(|()| scratch.as_file_mut().flush())
        .map_err(|e| CliError::Runtime(format!("write scratch listing: {e}")))?;

    say(cli, &"Close the editor to rename files".cyan().to_string());
    editor::edit_listing(scratch.path(), args.editor.as_deref(), &cfg.editor)?;

    let edited = fs::read_to_string(scratch.path())
        .map_err(|e| CliError::Runtime(format!("read back edited listing: {e}")))?;

    if args.keep_listing || cfg.rename.keep_listing {
        match scratch.keep() {
            Ok((_, path)) => say(cli, &format!("listing kept at {}", path.display())),
            Err(e) => eprintln!("bmv: could not keep listing: {e}"),
        }
    }

    let old_lines = parse_listing(&listing_text);
    let new_lines = parse_listing(&edited);
    let outcome = compute_moves(&root, &old_lines, &new_lines)?;
    for skipped in &outcome.skipped {
        eprintln!(
            "bmv: {}",
            format!("destination left empty; {skipped} unchanged").yellow()
        );
    }

    let journal = if args.dry_run {
        None
    } else {
        Journal::from_config(&cfg.journal)
    };
    let txn = RenameTransaction::new(
        TransactionConfig {
            dry_run: args.dry_run,
            verify_copies: cfg.rename.verify_copies,
        },
        journal,
    );
    let report = txn.apply(&root, &outcome.intents)?;

    emit_report(cli, &root, &outcome.intents, &report)?;

    if report.delete_failures.is_empty() {
        Ok(())
    } else {
        Err(CliError::Partial(format!(
            "{} of {} originals could not be deleted; they exist at both paths",
            report.delete_failures.len(),
            report.delete_failures.len() + report.files_moved
        )))
    }
}

fn emit_report(
    cli: &Cli,
    root: &Path,
    intents: &[MoveIntent],
    report: &ApplyReport,
) -> Result<(), CliError> {
    match output_mode(cli) {
        OutputMode::Human => {
            if report.dry_run {
                say(cli, &"dry run; nothing was moved".bold().to_string());
                for intent in intents.iter().filter(|i| !i.identical) {
                    say(
                        cli,
                        &format!(
                            "  {} -> {}",
                            display_relative(&intent.source, root),
                            display_relative(&intent.dest, root)
                        ),
                    );
                }
            }
            say(
                cli,
                &format!(
                    "{} moved, {} unchanged, {} bytes copied, {} empty dirs pruned",
                    report.files_moved,
                    report.identity_skips,
                    report.bytes_copied,
                    report.pruned_dirs
                ),
            );
            for failure in &report.delete_failures {
                eprintln!("bmv: {}", failure.error.red());
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "root": root.display().to_string(),
                "dry_run": report.dry_run,
                "files_moved": report.files_moved,
                "identity_skips": report.identity_skips,
                "bytes_copied": report.bytes_copied,
                "pruned_dirs": report.pruned_dirs,
                "duration_ms": u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
                "delete_failures": report
                    .delete_failures
                    .iter()
                    .map(|f| {
                        json!({
                            "path": f.path.display().to_string(),
                            "error": f.error,
                            "error_code": f.error_code,
                        })
                    })
                    .collect::<Vec<_>>(),
                "planned_moves": if report.dry_run {
                    intents
                        .iter()
                        .filter(|i| !i.identical)
                        .map(|i| {
                            json!({
                                "source": i.source.display().to_string(),
                                "dest": i.dest.display().to_string(),
                            })
                        })
                        .collect::<Vec<_>>()
                } else {
                    Vec::new()
                },
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}

// ──────────────────── list ────────────────────

fn run_list(cli: &Cli, args: &ListArgs) -> Result<(), CliError> {
    let (cwd, root) = resolve_walk_root(args.path.as_deref())?;
    let files = collect_files(&cwd, &root)?;

    match output_mode(cli) {
        OutputMode::Human => {
            for file in &files {
                println!("{}", file.display());
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "root": root.display().to_string(),
                "files": files
                    .iter()
                    .map(|f| f.display().to_string())
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}

// ──────────────────── run (script picker) ────────────────────

fn run_run(cli: &Cli, args: &RunArgs) -> Result<(), CliError> {
    let manifest_path = args
        .manifest
        .clone()
        .unwrap_or_else(|| PathBuf::from("package.json"));
    let manifest = picker::load_manifest(&manifest_path)?;

    if manifest.is_empty() {
        say(
            cli,
            &format!("no scripts in {}", manifest_path.display()),
        );
        return Ok(());
    }

    let Some(command) = picker::run(manifest)? else {
        say(cli, "cancelled");
        return Ok(());
    };

    say(
        cli,
        &format!("{} {}", "running".green().bold(), command.name),
    );
    picker::run_script(&command)?;
    Ok(())
}

// ──────────────────── config ────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    let cfg = Config::load(cli.config.as_deref())?;

    match args.command.as_ref().unwrap_or(&ConfigCommand::Show) {
        ConfigCommand::Path => {
            println!("{}", cfg.paths.config_file.display());
        }
        ConfigCommand::Show => match output_mode(cli) {
            OutputMode::Human => {
                let rendered = toml::to_string_pretty(&cfg)
                    .map_err(|e| CliError::Internal(format!("render config: {e}")))?;
                print!("{rendered}");
            }
            OutputMode::Json => {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            }
        },
    }
    Ok(())
}

// ──────────────────── helpers ────────────────────

fn resolve_walk_root(arg: Option<&Path>) -> Result<(PathBuf, PathBuf), CliError> {
    let cwd = env::current_dir()
        .map_err(|e| CliError::Runtime(format!("get current working directory: {e}")))?;
    let root = resolve_root(&cwd, arg.unwrap_or_else(|| Path::new(".")));
    if !root.is_dir() {
        return Err(CliError::User(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    Ok((cwd, root))
}

fn display_relative<'a>(path: &'a Path, root: &Path) -> std::path::Display<'a> {
    path.strip_prefix(root).unwrap_or(path).display()
}

const fn output_mode(cli: &Cli) -> OutputMode {
    if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    }
}

/// Print a status line unless quiet or JSON mode is active.
fn say(cli: &Cli, msg: &str) {
    if !cli.quiet && output_mode(cli) == OutputMode::Human {
        println!("{msg}");
    }
}

/// Print an extra status line in verbose mode.
fn say_verbose(cli: &Cli, msg: &str) {
    if cli.verbose {
        say(cli, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn exit_codes_follow_contract() {
        assert_eq!(CliError::User(String::new()).exit_code(), 1);
        assert_eq!(CliError::Runtime(String::new()).exit_code(), 2);
        assert_eq!(CliError::Internal(String::new()).exit_code(), 3);
        assert_eq!(CliError::Partial(String::new()).exit_code(), 4);
    }

    #[test]
    fn config_errors_map_to_user_class() {
        let err: CliError = BmvError::ListingCountMismatch {
            expected: 2,
            actual: 3,
        }
        .into();
        assert_eq!(err.exit_code(), 1);

        let err: CliError = BmvError::io("/x", io::Error::other("boom")).into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn rename_parses_with_defaults() {
        let cli = Cli::parse_from(["bmv", "rename"]);
        let Command::Rename(args) = &cli.command else {
            panic!("expected rename");
        };
        assert!(args.path.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn global_flags_parse_anywhere() {
        let cli = Cli::parse_from(["bmv", "list", "src", "--json", "--no-color"]);
        assert!(cli.json);
        assert!(cli.no_color);
        let Command::List(args) = &cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.path.as_deref(), Some(Path::new("src")));
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["bmv", "list", "-v", "-q"]).is_err());
    }
}
