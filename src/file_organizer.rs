/// File organization system for moving files into category directories.
///
/// An [`Organizer`] ensures one subfolder per category exists in the target
/// directory, then moves every top-level file into the folder of its
/// category. Subdirectories are never entered. Each folder creation and each
/// move is reported to a [`LogSink`] as it happens.
use crate::activity_log::{LogRecord, LogSink};
use crate::config::{ConflictPolicy, OrganizerConfig};
use crate::error::{ConfigError, MoveError, OrganizeError, OrganizeResult, PreconditionError};
use crate::file_category::CategoryTable;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A top-level entry of the target directory.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// The file name, lossily converted for classification and display.
    pub name: String,
    /// The file name as stored on disk.
    pub file_name: OsString,
    /// The full path to the entry.
    pub path: PathBuf,
    /// Whether the entry is (or links to) a directory.
    pub is_dir: bool,
}

/// A file that reached its category folder.
#[derive(Debug, Clone)]
pub struct MovedFile {
    pub name: String,
    pub category: String,
    pub destination: PathBuf,
}

/// A file that was left in place.
#[derive(Debug)]
pub struct FailedMove {
    pub name: String,
    pub category: String,
    pub source: PathBuf,
    pub error: MoveError,
}

/// Outcome of one organization run.
#[derive(Debug)]
pub struct OrganizeReport {
    pub target: PathBuf,
    pub created_folders: Vec<PathBuf>,
    pub moved: Vec<MovedFile>,
    pub failed: Vec<FailedMove>,
}

impl OrganizeReport {
    fn new(target: PathBuf) -> Self {
        Self {
            target,
            created_folders: Vec::new(),
            moved: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    pub fn created_folder_count(&self) -> usize {
        self.created_folders.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// True when every file found was moved.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of moved files per category label.
    pub fn category_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for moved in &self.moved {
            *counts.entry(moved.category.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// A move that a run would perform.
#[derive(Debug, Clone)]
pub struct PlannedMove {
    pub name: String,
    pub category: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    /// A file already sits at the destination.
    pub destination_exists: bool,
}

/// What a run would do, computed without touching the filesystem.
#[derive(Debug, Clone)]
pub struct OrganizePlan {
    pub target: PathBuf,
    pub on_conflict: ConflictPolicy,
    pub missing_folders: Vec<PathBuf>,
    /// Category paths occupied by something that is not a directory.
    /// The real run stops at the first of these.
    pub blocked_folders: Vec<PathBuf>,
    pub moves: Vec<PlannedMove>,
}

impl OrganizePlan {
    /// True when the run would abort while creating category folders.
    pub fn is_blocked(&self) -> bool {
        !self.blocked_folders.is_empty()
    }

    /// Number of planned files per category label.
    pub fn category_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for planned in &self.moves {
            *counts.entry(planned.category.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// Organizes files by moving them into category subdirectories.
#[derive(Debug, Clone)]
pub struct Organizer {
    table: CategoryTable,
    on_conflict: ConflictPolicy,
    excluded: Vec<PathBuf>,
}

impl Default for Organizer {
    fn default() -> Self {
        Self::new(CategoryTable::default(), ConflictPolicy::default())
    }
}

impl Organizer {
    pub fn new(table: CategoryTable, on_conflict: ConflictPolicy) -> Self {
        Self {
            table,
            on_conflict,
            excluded: Vec::new(),
        }
    }

    /// Leaves `path` alone if it turns up among the target's entries.
    ///
    /// Used for the configuration file and the activity log, which may live
    /// in the directory being organized.
    pub fn exclude(mut self, path: impl AsRef<Path>) -> Self {
        match canonical_location(path.as_ref()) {
            Some(location) => self.excluded.push(location),
            None => debug!(path = %path.as_ref().display(), "cannot resolve excluded path"),
        }
        self
    }

    /// Builds an organizer from loaded configuration.
    pub fn from_config(config: &OrganizerConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.compile()?, config.on_conflict))
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Checks that a folder was chosen and that it is an existing directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use filesorter::file_organizer::Organizer;
    /// use filesorter::PreconditionError;
    /// use std::path::Path;
    ///
    /// assert_eq!(
    ///     Organizer::validate_target(None),
    ///     Err(PreconditionError::NoFolderSelected)
    /// );
    /// assert!(Organizer::validate_target(Some(Path::new("/non/existent"))).is_err());
    /// ```
    pub fn validate_target(target: Option<&Path>) -> Result<&Path, PreconditionError> {
        let target = match target {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => return Err(PreconditionError::NoFolderSelected),
        };

        if !target.exists() {
            return Err(PreconditionError::FolderNotFound(target.to_path_buf()));
        }
        if !target.is_dir() {
            return Err(PreconditionError::NotADirectory(target.to_path_buf()));
        }
        Ok(target)
    }

    /// Works out what [`Organizer::organize`] would do, without side effects.
    pub fn plan(&self, target: &Path) -> OrganizeResult<OrganizePlan> {
        let target = Self::validate_target(Some(target))?;

        let mut missing_folders = Vec::new();
        let mut blocked_folders = Vec::new();
        for folder in self.table.labels().map(|label| target.join(label)) {
            match folder.symlink_metadata() {
                Err(_) => missing_folders.push(folder),
                Ok(_) if folder.is_dir() => {}
                Ok(_) => blocked_folders.push(folder),
            }
        }

        let moves = self
            .read_entries(target)?
            .into_iter()
            .filter(|entry| !entry.is_dir)
            .map(|entry| {
                let category = self.table.classify(&entry.name).to_string();
                let destination = target.join(&category).join(&entry.file_name);
                PlannedMove {
                    destination_exists: destination.symlink_metadata().is_ok(),
                    name: entry.name,
                    category,
                    source: entry.path,
                    destination,
                }
            })
            .collect();

        Ok(OrganizePlan {
            target: target.to_path_buf(),
            on_conflict: self.on_conflict,
            missing_folders,
            blocked_folders,
            moves,
        })
    }

    /// Runs one organization pass over `target`.
    ///
    /// Nothing is touched or logged if `target` is not an existing directory.
    /// A category folder that cannot be created aborts the run; a file that
    /// cannot be moved is reported and the run continues with the next one.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filesorter::activity_log::MemoryLogSink;
    /// use filesorter::file_organizer::Organizer;
    /// use std::path::Path;
    ///
    /// let mut log = MemoryLogSink::new();
    /// let report = Organizer::default()
    ///     .organize(Path::new("/home/user/Downloads"), &mut log)
    ///     .expect("run failed");
    /// println!("moved {} files", report.moved_count());
    /// ```
    pub fn organize(
        &self,
        target: &Path,
        sink: &mut dyn LogSink,
    ) -> OrganizeResult<OrganizeReport> {
        let target = Self::validate_target(Some(target))?;
        let mut report = OrganizeReport::new(target.to_path_buf());

        emit(
            sink,
            LogRecord::info(format!("Starting organization of: {}", target.display())),
        );

        self.ensure_folders(target, sink, &mut report)?;

        let entries = match self.read_entries(target) {
            Ok(entries) => entries,
            Err(e) => {
                emit(sink, LogRecord::error(format!("Error: {e}")));
                return Err(e);
            }
        };

        for entry in entries {
            if entry.is_dir {
                debug!(name = %entry.name, "skipping directory");
                continue;
            }
            self.move_entry(target, entry, sink, &mut report);
        }

        if !report.is_clean() {
            emit(
                sink,
                LogRecord::warning(format!(
                    "{} file(s) could not be moved.",
                    report.failed_count()
                )),
            );
        }
        emit(sink, LogRecord::info("Organization completed."));

        info!(
            target = %target.display(),
            moved = report.moved_count(),
            failed = report.failed_count(),
            created = report.created_folder_count(),
            "organization run finished"
        );
        Ok(report)
    }

    /// Creates every missing category folder directly under `target`.
    fn ensure_folders(
        &self,
        target: &Path,
        sink: &mut dyn LogSink,
        report: &mut OrganizeReport,
    ) -> OrganizeResult<()> {
        for label in self.table.labels() {
            let folder = target.join(label);
            if folder.is_dir() {
                continue;
            }

            if let Err(source) = fs::create_dir(&folder) {
                emit(
                    sink,
                    LogRecord::error(format!(
                        "Failed to create folder: {} ({})",
                        folder.display(),
                        source
                    )),
                );
                return Err(OrganizeError::FolderCreation {
                    path: folder,
                    source,
                });
            }

            emit(
                sink,
                LogRecord::info(format!("Folder created: {}", folder.display())),
            );
            report.created_folders.push(folder);
        }
        Ok(())
    }

    fn move_entry(
        &self,
        target: &Path,
        entry: DirectoryEntry,
        sink: &mut dyn LogSink,
        report: &mut OrganizeReport,
    ) {
        let category = self.table.classify(&entry.name).to_string();
        let destination = target.join(&category).join(&entry.file_name);

        match self.move_file(&entry.path, &destination) {
            Ok(()) => {
                emit(
                    sink,
                    LogRecord::info(format!("Moved: {} -> {}", entry.name, category)),
                );
                report.moved.push(MovedFile {
                    name: entry.name,
                    category,
                    destination,
                });
            }
            Err(error) => {
                warn!(name = %entry.name, %error, "file left in place");
                emit(
                    sink,
                    LogRecord::error(format!(
                        "Failed to move: {} -> {} ({})",
                        entry.name, category, error
                    )),
                );
                report.failed.push(FailedMove {
                    name: entry.name,
                    category,
                    source: entry.path,
                    error,
                });
            }
        }
    }

    fn move_file(&self, source: &Path, destination: &Path) -> Result<(), MoveError> {
        if self.on_conflict == ConflictPolicy::Skip && destination.symlink_metadata().is_ok() {
            return Err(MoveError::DestinationExists(destination.to_path_buf()));
        }
        fs::rename(source, destination)?;
        Ok(())
    }

    /// Lists the immediate children of `target`, sorted by name, minus the
    /// excluded paths.
    fn read_entries(&self, target: &Path) -> OrganizeResult<Vec<DirectoryEntry>> {
        let read_dir_error = |source| OrganizeError::ReadDir {
            path: target.to_path_buf(),
            source,
        };

        let canonical_target = if self.excluded.is_empty() {
            None
        } else {
            fs::canonicalize(target).ok()
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(target).map_err(read_dir_error)? {
            let entry = entry.map_err(read_dir_error)?;
            let file_name = entry.file_name();

            if let Some(canonical_target) = &canonical_target
                && self.excluded.contains(&canonical_target.join(&file_name))
            {
                debug!(name = %file_name.to_string_lossy(), "skipping excluded entry");
                continue;
            }

            let path = entry.path();
            // Follows symlinks; a dangling link is treated as a file.
            let is_dir = fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false);
            entries.push(DirectoryEntry {
                name: file_name.to_string_lossy().into_owned(),
                file_name,
                path,
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }
}

/// Absolute location of `path` with its parent resolved but the final
/// component kept as is, so a link is identified by where it sits rather
/// than where it points. The path itself need not exist yet.
fn canonical_location(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Some(fs::canonicalize(parent).ok()?.join(name))
}

fn emit(sink: &mut dyn LogSink, record: LogRecord) {
    if let Err(e) = sink.append(&record) {
        warn!(error = %e, message = %record.message, "failed to write activity log record");
    }
}
