//! Output formatting and display for sati.
//!
//! This module handles all user-facing output including:
//! - Formatted status messages
//! - Warnings for skipped entries
//! - Run summaries
//! - Quiet and verbose modes
//!
//! # Examples
//!
//! ```no_run
//! use sati::output::{OutputFormatter, display_run_report};
//! use sati::{Config, decode_and_merge};
//!
//! # async fn example(config: Config) -> Result<(), Box<dyn std::error::Error>> {
//! let formatter = OutputFormatter::from_config(&config);
//! let report = decode_and_merge(&config).await?;
//! display_run_report(&formatter, &report);
//! # Ok(())
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::pipeline::{RunReport, SkippedEntry};
use crate::utils::{format_duration, format_file_size, plural};

/// The warning line shown for an entry that was left out.
pub fn skip_message(entry: &SkippedEntry) -> String {
    format!("Skipping {}: {}", entry.name, entry.reason)
}

/// One-line summary of a run.
pub fn summary_line(report: &RunReport) -> String {
    let mut line = if report.written {
        format!(
            "Merged {} into {} ({}, {})",
            plural(report.merged.len(), "file"),
            report.output.display(),
            plural(report.total_pages, "page"),
            format_file_size(report.output_size.unwrap_or(0)),
        )
    } else {
        format!(
            "Would merge {} into {} ({})",
            plural(report.merged.len(), "file"),
            report.output.display(),
            plural(report.total_pages, "page"),
        )
    };

    if report.is_partial() {
        line.push_str(&format!(
            "; skipped {} of {}",
            report.skipped.len(),
            report.entries_seen
        ));
    }

    line
}

/// Display a finished run to the user.
///
/// Skipped entries are always reported, even in quiet mode.
pub fn display_run_report(formatter: &OutputFormatter, report: &RunReport) {
    for entry in &report.skipped {
        formatter.warning(&skip_message(entry));
    }

    if !formatter.should_print() {
        return;
    }

    if !report.written {
        formatter.section("Dry run: nothing was written");
        for (index, entry) in report.merged.iter().enumerate() {
            formatter.list_item(
                index + 1,
                &format!("{} ({})", entry.name, plural(entry.page_count, "page")),
            );
        }
        formatter.blank_line();
    }

    if report.merged.is_empty() && report.written {
        formatter.warning("No entry could be opened; wrote a document with no pages");
    }

    formatter.success(&summary_line(report));

    if formatter.is_verbose() {
        formatter.section("Statistics");
        formatter.detail("Archive", &report.archive.display().to_string());
        formatter.detail("PDF entries", &report.entries_seen.to_string());
        formatter.detail("Ignored entries", &report.entries_ignored.to_string());
        formatter.detail("Merged entries", &report.merged.len().to_string());
        formatter.detail("Skipped entries", &report.skipped.len().to_string());
        formatter.detail("Total pages", &report.total_pages.to_string());
        formatter.detail("Decode time", &format_duration(report.timings.decode));
        formatter.detail("Merge time", &format_duration(report.timings.merge));
        formatter.detail("Write time", &format_duration(report.timings.write));
        formatter.detail("Total time", &format_duration(report.timings.total));
    }
}
