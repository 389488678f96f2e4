//! User-facing output for the command-line tool.
//!
//! - [`OutputFormatter`] prints leveled messages honoring quiet/verbose
//! - [`ProgressBoard`] follows queued conversions
//! - the `display_*` helpers print summaries of finished work
//!
//! # Examples
//!
//! ```no_run
//! use pdfbind::config::MergeConfig;
//! use pdfbind::output::OutputFormatter;
//!
//! # fn example(config: MergeConfig) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Binding 3 documents");
//! formatter.success("Wrote book.pdf");
//! # }
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter, event_line, format_table, level_for, task_line};
pub use progress::{ProgressBoard, format_duration, progress_bar};

use std::path::{Path, PathBuf};

use crate::compose::MergeOutcome;
use crate::io::LoadStatistics;
use crate::queue::ConversionTask;

/// Print what loading the sources cost.
pub fn display_load_statistics(formatter: &OutputFormatter, stats: &LoadStatistics) {
    if stats.failure_count > 0 {
        formatter.warning(&format!("{} file(s) failed to load", stats.failure_count));
    }

    formatter.debug(&format!(
        "Loaded {} file(s) in {:.2}s: {} pages, {}",
        stats.success_count,
        stats.total_time.as_secs_f64(),
        stats.total_pages,
        stats.format_total_size()
    ));
}

/// Print the summary of a merge.
pub fn display_merge_summary(formatter: &OutputFormatter, outcome: &MergeOutcome, output: &Path) {
    let stats = &outcome.statistics;

    if stats.files_skipped > 0 {
        formatter.warning(&format!("Skipped {} unreadable file(s)", stats.files_skipped));
    }

    for (index, path) in outcome.merged_files.iter().enumerate() {
        formatter.detail(&format!("source {}", index + 1), &path.display().to_string());
    }

    let pages = if stats.toc_pages > 0 {
        format!(
            "{} pages ({} contents + {} from sources)",
            stats.total_pages, stats.toc_pages, stats.source_pages
        )
    } else {
        format!("{} pages", stats.total_pages)
    };

    if outcome.written {
        formatter.success(&format!(
            "Bound {} file(s) into {}: {pages}, {}",
            stats.files_merged,
            output.display(),
            stats.format_output_size()
        ));
    } else {
        formatter.info(&format!(
            "Dry run: would bind {} file(s) into {}: {pages}, {}",
            stats.files_merged,
            output.display(),
            stats.format_output_size()
        ));
    }

    if stats.bookmarks_added > 0 {
        formatter.debug(&format!("Added {} bookmark(s)", stats.bookmarks_added));
    }
    formatter.debug(&format!(
        "Load {}ms, compose {}ms, input {}",
        stats.load_time.as_millis(),
        stats.compose_time.as_millis(),
        stats.format_input_size()
    ));
}

/// Print one line per finished conversion. Returns the number of tasks
/// that did not complete.
pub fn display_task_outcomes(formatter: &OutputFormatter, outcomes: &[(PathBuf, ConversionTask)]) -> usize {
    let mut unsuccessful = 0;
    for (input, task) in outcomes {
        let level = level_for(task.status);
        if level != MessageLevel::Success {
            unsuccessful += 1;
        }
        formatter.emit(level, &task_line(input, task));
    }
    unsuccessful
}
