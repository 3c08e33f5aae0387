//! Activity log records and the sinks that receive them.
//!
//! Every event of a run (folder created, file moved, run started or finished,
//! failures) becomes a [`LogRecord`] handed to a [`LogSink`]. The front-end
//! fans records out to the persistent log file and the live terminal view.

use chrono::{DateTime, Local};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

/// Timestamp layout used in the persistent log, e.g. `2024-05-01 14:03:07,512`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// How a record should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One timestamped event description.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub message: String,
}

impl LogRecord {
    /// Creates a record stamped with the current local time.
    pub fn now(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            severity,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::now(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::now(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::now(Severity::Error, message)
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.message
        )
    }
}

/// Anything that accepts log records in emission order.
pub trait LogSink {
    fn append(&mut self, record: &LogRecord) -> io::Result<()>;
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        (**self).append(record)
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        (**self).append(record)
    }
}

/// Append-only log file, opened on the first record.
///
/// The parent directory is created if it is missing.
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    file: Option<File>,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    fn open(&mut self) -> io::Result<&mut File> {
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                if let Some(parent) = self.path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    fs::create_dir_all(parent)?;
                }
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?
            }
        };
        Ok(self.file.insert(file))
    }
}

impl LogSink for FileLogSink {
    fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        let file = self.open()?;
        writeln!(file, "{record}")
    }
}

/// Keeps records in memory, e.g. for a display surface or for tests.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    records: Vec<LogRecord>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    /// The messages alone, in emission order.
    pub fn messages(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.message.as_str()).collect()
    }
}

impl LogSink for MemoryLogSink {
    fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Forwards each record to every inner sink.
///
/// A failing sink does not stop the others; the first error is returned.
#[derive(Default)]
pub struct FanOutSink<'a> {
    sinks: Vec<Box<dyn LogSink + 'a>>,
}

impl<'a> FanOutSink<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with(mut self, sink: impl LogSink + 'a) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl LogSink for FanOutSink<'_> {
    fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.append(record) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
