//! Document composition.
//!
//! This module assembles source documents into one output with:
//! - An optional generated table of contents in front
//! - Rotation carried over per page
//! - "page i of N" footers stamped after assembly
//! - Optional outline items per source
//! - Info dictionary metadata
//!
//! # Examples
//!
//! ```no_run
//! use pdfbind::compose::merge_documents;
//! use pdfbind::config::MergeConfig;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = MergeConfig::new(
//!     vec![PathBuf::from("intro.pdf"), PathBuf::from("methods.pdf")],
//!     "book.pdf",
//! );
//! config.include_toc = true;
//!
//! let outcome = merge_documents(&config).await?;
//! println!("wrote {} pages", outcome.statistics.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod bookmarks;
pub mod composer;
pub mod footer;
pub mod metadata;
pub mod pages;

pub use composer::{AssembledDocument, ComposeOptions, DocumentComposer};
pub use pages::RotationPolicy;

use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::{CompressionLevel, MergeConfig};
use crate::error::{PdfBindError, Result};
use crate::io::{PdfWriter, SourceReader};
use crate::toc::{PlannedSource, TocLayoutEngine, default_title, plan_toc};
use crate::utils::format_file_size;

/// Numbers about one merge.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Sources that made it into the output.
    pub files_merged: usize,
    /// Inputs skipped because they could not be read.
    pub files_skipped: usize,
    /// Pages taken from sources.
    pub source_pages: usize,
    /// Generated TOC pages.
    pub toc_pages: usize,
    /// Pages in the output.
    pub total_pages: usize,
    /// Outline items written.
    pub bookmarks_added: usize,
    /// Time spent loading sources.
    pub load_time: Duration,
    /// Time spent planning and composing.
    pub compose_time: Duration,
    /// Combined size of the inputs.
    pub input_size: u64,
    /// Size of the output.
    pub output_size: u64,
    /// Whether streams were compressed.
    pub compressed: bool,
}

impl MergeStatistics {
    /// Input size as a human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }

    /// Output size as a human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

/// Result of [`merge_documents`].
#[derive(Debug)]
pub struct MergeOutcome {
    /// The assembled document.
    pub document: AssembledDocument,
    /// Numbers about the merge.
    pub statistics: MergeStatistics,
    /// Inputs that were merged, in order.
    pub merged_files: Vec<PathBuf>,
    /// Whether the output file was written (false on dry runs).
    pub written: bool,
}

/// Load, plan, compose and write according to `config`.
///
/// Sources load in parallel but keep their input order. With
/// `continue_on_error`, unreadable inputs are skipped with a warning;
/// otherwise the first failure aborts the merge. A dry run does everything
/// except write the output.
///
/// # Errors
///
/// Returns configuration errors, the first load failure (unless skipped),
/// [`PdfBindError::NoDocuments`] if nothing could be loaded, and
/// composition or write failures.
pub async fn merge_documents(config: &MergeConfig) -> Result<MergeOutcome> {
    config.validate()?;

    let load_start = Instant::now();
    let (results, load_stats) = SourceReader::new()
        .load_all(&config.inputs, config.effective_jobs())
        .await;
    let load_time = load_start.elapsed();

    let mut sources = Vec::new();
    let mut titles = Vec::new();
    let mut merged_files = Vec::new();
    let mut skipped = 0;

    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(loaded) => {
                let title = config
                    .toc_titles
                    .get(index)
                    .filter(|t| !t.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| default_title(&loaded.path));
                titles.push(title);
                merged_files.push(loaded.path);
                sources.push(loaded.source);
            }
            Err(err) if config.continue_on_error && err.is_recoverable() => {
                warn!(error = %err, "skipping unreadable input");
                skipped += 1;
            }
            Err(err) => return Err(err.into_source_unreadable()),
        }
    }

    if sources.is_empty() {
        return Err(PdfBindError::NoDocuments);
    }

    let compose_start = Instant::now();
    let mut options = ComposeOptions::from(config);
    options.titles = titles;

    let document = tokio::task::spawn_blocking(move || {
        let toc_pages = if options.include_toc {
            let planned: Vec<PlannedSource> = sources
                .iter()
                .zip(&options.titles)
                .map(|(source, title)| PlannedSource::new(title.clone(), source.page_count() as u32))
                .collect();
            plan_toc(&planned, &TocLayoutEngine::new(), &options.geometry)?.pages
        } else {
            Vec::new()
        };

        DocumentComposer::new().compose(sources, &toc_pages, &options)
    })
    .await
    .map_err(|e| PdfBindError::other(format!("Compose task failed: {e}")))??;
    let compose_time = compose_start.elapsed();

    let written = if config.dry_run {
        false
    } else {
        PdfWriter::new().write(&document.bytes, &config.output).await?;
        true
    };

    let statistics = MergeStatistics {
        files_merged: merged_files.len(),
        files_skipped: skipped,
        source_pages: document.source_pages(),
        toc_pages: document.toc_page_count,
        total_pages: document.page_count,
        bookmarks_added: document.bookmarks_added,
        load_time,
        compose_time,
        input_size: load_stats.total_size,
        output_size: document.bytes.len() as u64,
        compressed: config.compression != CompressionLevel::None,
    };

    info!(
        files = statistics.files_merged,
        pages = statistics.total_pages,
        output = %config.output.display(),
        written,
        "merge finished"
    );

    Ok(MergeOutcome {
        document,
        statistics,
        merged_files,
        written,
    })
}
