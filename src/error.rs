//! Error types shared across filesorter.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// IO error while reading configuration.
    #[error("IO error reading configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The category table has no entries at all.
    #[error("The category table is empty")]
    NoCategories,

    /// No category has an empty extension list.
    #[error("No fallback category: exactly one category must have no extensions")]
    NoFallback,

    /// More than one category has an empty extension list.
    #[error("Categories '{first}' and '{second}' both have no extensions; only one fallback is allowed")]
    MultipleFallbacks { first: String, second: String },

    /// The same label appears twice.
    #[error("Duplicate category label '{0}'")]
    DuplicateLabel(String),

    /// The label cannot be used as a single folder name.
    #[error("Invalid category label '{0}': must be a single folder name")]
    InvalidLabel(String),

    /// The extension can never match a file name.
    #[error("Invalid extension '{extension}' in category '{label}'")]
    InvalidExtension { label: String, extension: String },

    /// One extension is claimed by two categories.
    #[error("Extension '{extension}' is listed in both '{first}' and '{second}'")]
    OverlappingExtension {
        extension: String,
        first: String,
        second: String,
    },
}

/// A run was refused before touching the filesystem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("No folder selected")]
    NoFolderSelected,

    #[error("Folder does not exist: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Errors that abort an organization run.
#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// Failed to create a category directory.
    #[error("Failed to create folder {}: {source}", path.display())]
    FolderCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to list the target directory.
    #[error("Failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single file was left in place.
#[derive(Error, Debug)]
pub enum MoveError {
    #[error("destination exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for organization runs.
pub type OrganizeResult<T> = Result<T, OrganizeError>;
