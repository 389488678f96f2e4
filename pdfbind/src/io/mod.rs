//! File input and output.
//!
//! - [`SourceReader`] loads source documents with ordered, bounded parallelism
//! - [`PdfWriter`] writes finished documents atomically

pub mod reader;
pub mod writer;

pub use reader::{LoadResult, LoadStatistics, LoadedSource, SourceReader};
pub use writer::{PdfWriter, WriteStatistics};
