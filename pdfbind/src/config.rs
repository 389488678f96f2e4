//! Configuration module for pdfbind.
//!
//! Every operation takes its configuration as an explicit value owned by
//! the caller. There is no process-wide "current settings" state:
//! - [`MergeConfig`] drives document composition
//! - [`QueueConfig`] sizes the conversion task queue
//! - [`ConvertConfig`] decides where converted files are written

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr};

use crate::error::{PdfBindError, Result};
use crate::toc::PageGeometry;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No compression - preserves exact stream contents.
    None,
    /// Compress streams that are not compressed yet.
    #[default]
    Standard,
    /// Compress streams and drop unreachable objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PdfBindError;

    /// Parse compression level from string.
    ///
    /// Accepts "none", "standard", or "maximum" in any case.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfBindError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a merge operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeConfig {
    /// Input PDF file paths (in merge order).
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Insert a generated table of contents before the first source page.
    pub include_toc: bool,

    /// TOC titles supplied by the caller, matched to inputs by position.
    ///
    /// Inputs without a title here fall back to their file name.
    pub toc_titles: Vec<String>,

    /// Write each page's rotation back as an explicit canonical angle.
    pub normalize_rotation: bool,

    /// Stamp "page i of N" on every page of the output.
    pub page_footers: bool,

    /// Add an outline entry for each source document.
    pub bookmarks: bool,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Metadata to set on output document.
    pub metadata: Metadata,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Number of parallel loads (None = auto-detect).
    pub jobs: Option<usize>,

    /// Skip unreadable inputs instead of failing the merge.
    pub continue_on_error: bool,

    /// Page geometry used for generated TOC pages.
    pub geometry: PageGeometry,

    /// Validate and plan without writing output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: PathBuf::from("merged.pdf"),
            include_toc: false,
            toc_titles: Vec::new(),
            normalize_rotation: true,
            page_footers: true,
            bookmarks: false,
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
            overwrite_mode: OverwriteMode::default(),
            jobs: None,
            continue_on_error: false,
            geometry: PageGeometry::default(),
            dry_run: false,
            verbose: false,
            quiet: false,
        }
    }
}

impl MergeConfig {
    /// Create a configuration for the given inputs and output with defaults.
    pub fn new(inputs: Vec<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            inputs,
            output: output.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output path is also an input
    /// - The page geometry is invalid
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(PdfBindError::NoDocuments);
        }

        if self.verbose && self.quiet {
            return Err(PdfBindError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(PdfBindError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        if self.inputs.iter().any(|input| input == &self.output) {
            return Err(PdfBindError::invalid_config(format!(
                "Output file cannot be the same as an input file: {}",
                self.output.display()
            )));
        }

        self.geometry.validate()?;

        Ok(())
    }

    /// Get the effective number of parallel loads.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}

/// Default number of conversion tasks allowed to run at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 2;

/// Configuration for a [`ConversionQueue`](crate::queue::ConversionQueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    /// Concurrency budget `K`.
    pub max_concurrent: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

impl QueueConfig {
    /// Create a configuration with the given budget.
    pub fn with_max_concurrent(max_concurrent: usize) -> Self {
        Self { max_concurrent }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the budget is zero, since nothing could ever run.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(PdfBindError::invalid_config(
                "Queue concurrency must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Configuration for format conversions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertConfig {
    /// Directory receiving converted files.
    pub output_dir: PathBuf,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
        }
    }
}
