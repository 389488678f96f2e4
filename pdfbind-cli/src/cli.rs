//! Command-line arguments for pdfbind.
//!
//! Three subcommands:
//!
//! - `merge`: bind PDFs into one document, optionally behind a table of contents
//! - `convert`: run single-file conversions through the task queue
//! - `formats`: list the supported conversions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use pdfbind::config::{
    CompressionLevel, ConvertConfig, DEFAULT_MAX_CONCURRENT, MergeConfig, Metadata, OverwriteMode,
    QueueConfig,
};
use pdfbind::convert::FormatKind;
use pdfbind::error::{PdfBindError, Result};
use pdfbind::utils::expand_inputs;

/// Bind PDF documents behind a generated table of contents and run queued
/// format conversions.
#[derive(Parser, Debug)]
#[command(name = "pdfbind")]
#[command(version)]
#[command(about = "Bind PDF documents behind a generated table of contents", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Verbose output, including debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bind PDF files into a single document
    Merge(MergeArgs),
    /// Convert files between formats using a bounded task queue
    Convert(ConvertArgs),
    /// List supported conversions
    Formats {
        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Arguments of `pdfbind merge`.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Input PDF files, glob patterns or directories (in order)
    ///
    /// Directories contribute every *.pdf below them, sorted by name.
    ///
    /// Examples:
    ///   pdfbind merge intro.pdf body.pdf -o book.pdf
    ///   pdfbind merge 'chapters/*.pdf' --toc -o book.pdf
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Insert a table of contents before the first page
    #[arg(long)]
    pub toc: bool,

    /// Title of a table of contents entry, by input position (repeatable)
    ///
    /// Inputs without a title use their file name.
    #[arg(long = "toc-title", value_name = "NAME")]
    pub toc_titles: Vec<String>,

    /// Copy page rotation as found instead of writing canonical angles
    #[arg(long)]
    pub no_rotation_normalize: bool,

    /// Do not stamp "page i of N" footers
    #[arg(long)]
    pub no_footers: bool,

    /// Add a bookmark for each source document
    #[arg(short, long)]
    pub bookmarks: bool,

    /// Compression level for the output
    ///
    /// - none: no compression
    /// - standard: compress streams (default)
    /// - maximum: compress and drop empty streams
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Title metadata
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Author metadata
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Subject metadata
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Keywords metadata (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Overwrite an existing output without asking
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Number of sources loaded in parallel (default: CPU cores)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Skip unreadable inputs with a warning instead of failing
    #[arg(long)]
    pub continue_on_error: bool,

    /// Load and compose without writing the output
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl MergeArgs {
    /// Build a validated merge configuration.
    ///
    /// Inputs are expanded (globs, directories) here.
    ///
    /// # Errors
    ///
    /// Returns an error for bad globs, an invalid compression level, or a
    /// configuration that fails validation.
    pub fn to_config(&self, verbose: bool, quiet: bool) -> Result<MergeConfig> {
        let inputs = expand_inputs(&self.inputs)?;
        if inputs.is_empty() {
            return Err(PdfBindError::NoDocuments);
        }

        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let mut config = MergeConfig::new(inputs, self.output.clone());
        config.include_toc = self.toc;
        config.toc_titles = self.toc_titles.clone();
        config.normalize_rotation = !self.no_rotation_normalize;
        config.page_footers = !self.no_footers;
        config.bookmarks = self.bookmarks;
        config.compression = compression;
        config.metadata = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );
        config.overwrite_mode = overwrite_mode;
        config.jobs = self.jobs;
        config.continue_on_error = self.continue_on_error;
        config.dry_run = self.dry_run;
        config.verbose = verbose;
        config.quiet = quiet;

        config.validate()?;
        Ok(config)
    }
}

/// Arguments of `pdfbind convert`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Files to convert
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Target format (pdf, png, jpg, webp, md, txt, docx)
    #[arg(short, long = "to", value_name = "FORMAT", value_parser = parse_format)]
    pub to: FormatKind,

    /// Directory receiving converted files
    #[arg(long, value_name = "DIR", default_value = "outputs")]
    pub out_dir: PathBuf,

    /// Conversions allowed to run at once
    #[arg(long, value_name = "K", default_value_t = DEFAULT_MAX_CONCURRENT)]
    pub max_concurrent: usize,

    /// Print final task snapshots as JSON instead of progress and summary lines
    #[arg(long)]
    pub json: bool,
}

impl ConvertArgs {
    /// Queue settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the concurrency budget is zero.
    pub fn queue_config(&self) -> Result<QueueConfig> {
        let config = QueueConfig::with_max_concurrent(self.max_concurrent);
        config.validate()?;
        Ok(config)
    }

    /// Output settings.
    pub fn convert_config(&self) -> ConvertConfig {
        ConvertConfig {
            output_dir: self.out_dir.clone(),
        }
    }
}

fn parse_format(value: &str) -> std::result::Result<FormatKind, String> {
    FormatKind::from_str(value).map_err(|e| e.to_string())
}
