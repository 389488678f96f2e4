//! pdfbind - Bind PDF documents behind a generated table of contents.
//!
//! The library has two independent halves:
//!
//! - **Composition**: load source documents ([`source`]), lay out a
//!   paginated table of contents ([`toc`]), and assemble everything into one
//!   document with footers, bookmarks and metadata ([`compose`])
//! - **Conversion**: a bounded FIFO task queue ([`queue`]) running
//!   single-file format conversions picked by a routing table ([`convert`])
//!
//! # Examples
//!
//! ## Binding documents
//!
//! ```no_run
//! use pdfbind::compose::merge_documents;
//! use pdfbind::config::MergeConfig;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = MergeConfig::new(
//!     vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
//!     "bound.pdf",
//! );
//! config.include_toc = true;
//! config.bookmarks = true;
//!
//! let outcome = merge_documents(&config).await?;
//! println!("Created {} page document", outcome.statistics.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Laying out a table of contents by hand
//!
//! ```
//! use pdfbind::toc::{PageGeometry, TocEntry, TocLayoutEngine};
//!
//! let entries = vec![
//!     TocEntry::new("Introduction", 2).unwrap(),
//!     TocEntry::new("Methods", 5).unwrap(),
//! ];
//! let pages = TocLayoutEngine::new()
//!     .layout(&entries, &PageGeometry::a4())
//!     .unwrap();
//! assert_eq!(pages.len(), 1);
//! ```
//!
//! ## Queued conversions
//!
//! ```no_run
//! use pdfbind::config::{ConvertConfig, QueueConfig};
//! use pdfbind::convert::{FormatKind, submit_conversion};
//! use pdfbind::queue::ConversionQueue;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = ConversionQueue::new(QueueConfig::default())?;
//! let id = submit_conversion(&queue, "notes.md", FormatKind::Pdf, &ConvertConfig::default());
//! if let Some(task) = queue.wait(&id).await {
//!     println!("{}: {}", task.id, task.status);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compose;
pub mod config;
pub mod convert;
pub mod error;
pub mod io;
pub mod output;
pub mod queue;
pub mod source;
pub mod toc;
pub mod utils;

// Re-export commonly used types
pub use compose::{DocumentComposer, MergeOutcome, MergeStatistics, merge_documents};
pub use config::{ConvertConfig, MergeConfig, QueueConfig};
pub use convert::{Dispatcher, FormatKind};
pub use error::{PdfBindError, Result};
pub use queue::{ConversionQueue, ConversionTask, TaskId, TaskStatus};
pub use source::PageSource;
pub use toc::TocLayoutEngine;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
