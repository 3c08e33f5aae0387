//! Output formatting and styling module.
//!
//! Everything the user sees on the terminal goes through here: the live
//! activity log, the warning/error/success notices, and the summary tables.

use crate::activity_log::{LogRecord, LogSink, Severity, TIMESTAMP_FORMAT};
use crate::config::ConflictPolicy;
use crate::file_category::CategoryTable;
use crate::file_organizer::{OrganizePlan, OrganizeReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::io;
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Renders one activity log line the way the live view shows it.
    pub fn format_record(record: &LogRecord) -> String {
        let stamp = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let message = match record.severity {
            Severity::Info => record.message.normal(),
            Severity::Warning => record.message.yellow(),
            Severity::Error => record.message.red(),
        };
        format!("{} - {}", stamp.dimmed(), message)
    }

    /// Prints the active category table, fallback last.
    pub fn category_table(table: &CategoryTable) {
        Self::header("CATEGORIES");
        let width = table.labels().map(str::len).max().unwrap_or(0).max(8);
        for category in table.categories() {
            let extensions = if category.is_fallback() {
                "(everything else)".dimmed().to_string()
            } else {
                category.extensions().join(" ")
            };
            println!(
                "{:<width$} | {}",
                category.label().bold(),
                extensions,
                width = width
            );
        }
    }

    /// Prints a summary table with file counts by category.
    pub fn summary_table(category_counts: &BTreeMap<&str, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_category_len = category_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = max_category_len
        );
        println!("{}", "-".repeat(max_category_len + 10));

        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = max_category_len
            );
        }

        println!("{}", "-".repeat(max_category_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = max_category_len
        );
    }

    /// Prints the outcome of a completed run.
    pub fn run_report(report: &OrganizeReport) {
        Self::summary_table(&report.category_counts(), report.moved_count());
        if report.created_folder_count() > 0 {
            println!(
                "{} new {}",
                report.created_folder_count(),
                if report.created_folder_count() == 1 {
                    "folder"
                } else {
                    "folders"
                }
            );
        }
        if !report.is_clean() {
            Self::header("NOT MOVED");
            for failed in &report.failed {
                println!(
                    " - {} -> {}: {}",
                    failed.name,
                    failed.category,
                    failed.error.to_string().red()
                );
            }
        }
    }

    /// Prints what a run would do.
    pub fn plan(plan: &OrganizePlan) {
        Self::dry_run_notice(&format!("Analyzing contents of: {}", plan.target.display()));

        for folder in &plan.missing_folders {
            println!(" + {}", folder.display());
        }
        for folder in &plan.blocked_folders {
            Self::error(&format!(
                "{} exists but is not a folder; the run would stop here",
                folder.display()
            ));
        }

        if plan.moves.is_empty() {
            println!("No files found to organize.");
        }
        for planned in &plan.moves {
            let note = if planned.destination_exists {
                format!(" {}", conflict_note(plan.on_conflict).yellow())
            } else {
                String::new()
            };
            println!(" - {}", planned.name);
            println!("   → Would move to {}/{}{}", planned.category, planned.name, note);
        }

        Self::summary_table(&plan.category_counts(), plan.moves.len());
        println!("\n{} Dry run complete. No files were modified.", "✓".green());
    }
}

/// How a dry run describes a file whose name is already taken in its category folder.
fn conflict_note(policy: ConflictPolicy) -> &'static str {
    match policy {
        ConflictPolicy::Skip => "(already there, will be skipped)",
        ConflictPolicy::Overwrite => "(will replace existing file)",
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Live activity log: prints every record above a spinner while a run is going.
pub struct TerminalLogSink {
    spinner: ProgressBar,
}

impl TerminalLogSink {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }

    /// Removes the spinner once the run is over.
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Default for TerminalLogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for TerminalLogSink {
    fn append(&mut self, record: &LogRecord) -> io::Result<()> {
        let line = OutputFormatter::format_record(record);
        // A hidden bar drops println output, e.g. when stderr is redirected.
        if self.spinner.is_hidden() {
            println!("{line}");
        } else {
            self.spinner.println(line);
            self.spinner.set_message(record.message.clone());
        }
        Ok(())
    }
}

impl Drop for TerminalLogSink {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
