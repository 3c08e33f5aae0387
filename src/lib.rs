//! filesorter - sort a folder's files into category subfolders
//!
//! This library classifies files by extension, moves the top-level files of a
//! directory into one subfolder per category, and records every step in an
//! activity log that is both persisted to a file and shown live.

pub mod activity_log;
pub mod cli;
pub mod config;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod output;

pub use activity_log::{FileLogSink, LogRecord, LogSink, MemoryLogSink};
pub use config::{ConflictPolicy, OrganizerConfig};
pub use error::{ConfigError, MoveError, OrganizeError, PreconditionError};
pub use file_category::{Category, CategoryTable};
pub use file_organizer::{OrganizePlan, OrganizeReport, Organizer};

pub use cli::{OrganizeCommand, RunStatus, run_cli};
