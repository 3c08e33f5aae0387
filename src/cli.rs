//! Command-line interface module for filesorter.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Folder precondition checks and the notices they raise
//! - Wiring the persistent and live activity logs to an organization run
//! - Dry-run previews and category listing

use crate::activity_log::{FanOutSink, FileLogSink};
use crate::config::OrganizerConfig;
use crate::error::{ConfigError, OrganizeError, PreconditionError};
use crate::file_organizer::Organizer;
use crate::output::{OutputFormatter, TerminalLogSink};
use clap::Parser;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sort the files of a folder into category subfolders.
#[derive(Parser, Debug)]
#[command(name = "filesorter", version, about, long_about = None)]
pub struct Args {
    /// Folder to organize
    pub folder: Option<PathBuf>,

    /// Show what would be moved without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the active category table and exit
    #[arg(long)]
    pub categories: bool,

    /// Enable debug diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The command these arguments ask for.
    pub fn command(&self) -> OrganizeCommand {
        if self.categories {
            OrganizeCommand::ListCategories
        } else {
            OrganizeCommand::Organize {
                dry_run: self.dry_run,
            }
        }
    }
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Organize files in a directory.
    Organize {
        /// If true, simulate the operation without making changes.
        dry_run: bool,
    },
    /// Show the category table.
    ListCategories,
}

/// How a successful invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every file found was moved.
    Completed,
    /// The run finished but some files were left in place.
    CompletedWithFailures,
    /// Nothing was changed.
    DryRun,
    /// The category table was printed.
    Listed,
}

impl RunStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::CompletedWithFailures => 1,
            _ => 0,
        }
    }
}

/// Errors surfaced to the user by the CLI.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Organize(OrganizeError),
}

impl From<OrganizeError> for CliError {
    fn from(error: OrganizeError) -> Self {
        match error {
            OrganizeError::Precondition(e) => CliError::Precondition(e),
            other => CliError::Organize(other),
        }
    }
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Precondition(_) => 2,
            _ => 1,
        }
    }

    /// Tells the user what went wrong.
    pub fn notify(&self) {
        match self {
            CliError::Precondition(PreconditionError::NoFolderSelected) => {
                OutputFormatter::warning("Please select a folder first.");
            }
            CliError::Precondition(PreconditionError::FolderNotFound(_)) => {
                OutputFormatter::error("The selected folder does not exist.");
            }
            CliError::Precondition(PreconditionError::NotADirectory(path)) => {
                OutputFormatter::error(&format!(
                    "The selected path is not a folder: {}",
                    path.display()
                ));
            }
            CliError::Config(e) => {
                OutputFormatter::error(&format!("Error loading configuration: {e}"));
            }
            CliError::Organize(e) => {
                OutputFormatter::error(&format!("Organization aborted: {e}"));
            }
        }
    }
}

/// Runs the CLI application with the given command and folder.
///
/// # Examples
///
/// ```no_run
/// use filesorter::cli::{run_cli, OrganizeCommand};
/// use std::path::Path;
///
/// let result = run_cli(
///     OrganizeCommand::Organize { dry_run: false },
///     Some(Path::new("/path/to/directory")),
/// );
/// if let Err(e) = result {
///     e.notify();
/// }
/// ```
pub fn run_cli(command: OrganizeCommand, folder: Option<&Path>) -> Result<RunStatus, CliError> {
    run_cli_with_config(command, folder, None)
}

/// Runs the CLI application with an optional configuration file.
pub fn run_cli_with_config(
    command: OrganizeCommand,
    folder: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<RunStatus, CliError> {
    let config = OrganizerConfig::load(config_path)?;
    let mut organizer = Organizer::from_config(&config)?.exclude(&config.log_file);
    if let Some(source) = &config.source {
        organizer = organizer.exclude(source);
    }

    match command {
        OrganizeCommand::ListCategories => {
            OutputFormatter::category_table(organizer.table());
            Ok(RunStatus::Listed)
        }
        OrganizeCommand::Organize { dry_run: true } => {
            let target = Organizer::validate_target(folder)?;
            let plan = organizer.plan(target)?;
            OutputFormatter::plan(&plan);
            Ok(RunStatus::DryRun)
        }
        OrganizeCommand::Organize { dry_run: false } => {
            let target = Organizer::validate_target(folder)?;
            organize_directory(&organizer, target, &config)
        }
    }
}

/// Runs one organization pass, logging to the log file and the terminal.
fn organize_directory(
    organizer: &Organizer,
    target: &Path,
    config: &OrganizerConfig,
) -> Result<RunStatus, CliError> {
    tracing::debug!(log_file = %config.log_file.display(), "activity log");

    let mut terminal = TerminalLogSink::new();
    let result = {
        let mut sink = FanOutSink::new()
            .with(FileLogSink::new(&config.log_file))
            .with(&mut terminal);
        organizer.organize(target, &mut sink)
    };
    terminal.finish();

    let report = result?;
    OutputFormatter::run_report(&report);

    if report.is_clean() {
        OutputFormatter::success("Folder organization completed!");
        Ok(RunStatus::Completed)
    } else {
        OutputFormatter::warning(&format!(
            "Folder organization completed, but {} file(s) could not be moved.",
            report.failed_count()
        ));
        Ok(RunStatus::CompletedWithFailures)
    }
}
