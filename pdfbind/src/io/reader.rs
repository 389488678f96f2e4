//! Loading source documents from disk.
//!
//! Loads run with bounded parallelism but results always come back in
//! input order, since the order of sources is the order of the assembled
//! document.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbind::io::SourceReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = SourceReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let (results, stats) = reader.load_all(&paths, 4).await;
//! println!("loaded {} of {} files", stats.success_count, results.len());
//! # Ok(())
//! # }
//! ```

use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::Result;
use crate::source::PageSource;
use crate::utils::format_file_size;

/// Batches at or below this size load one file at a time.
const SEQUENTIAL_THRESHOLD: usize = 3;

/// A source loaded from disk.
#[derive(Debug)]
pub struct LoadedSource {
    /// The parsed document.
    pub source: PageSource,
    /// Path the document was read from.
    pub path: PathBuf,
    /// Time spent reading and parsing.
    pub load_time: Duration,
}

impl LoadedSource {
    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.source.page_count()
    }

    /// Size of the file in bytes.
    pub fn file_size(&self) -> u64 {
        self.source.byte_len()
    }
}

/// Outcome of loading one file.
pub type LoadResult = Result<LoadedSource>;

/// Aggregate numbers for a batch load.
#[derive(Debug, Clone, Default)]
pub struct LoadStatistics {
    /// Files loaded.
    pub success_count: usize,
    /// Files that failed.
    pub failure_count: usize,
    /// Wall time for the batch.
    pub total_time: Duration,
    /// Mean per-file load time of the successful loads.
    pub average_time: Duration,
    /// Combined size of loaded files.
    pub total_size: u64,
    /// Combined page count of loaded files.
    pub total_pages: usize,
}

impl LoadStatistics {
    fn from_results(results: &[LoadResult], total_time: Duration) -> Self {
        let mut stats = Self {
            total_time,
            ..Self::default()
        };
        let mut load_time = Duration::ZERO;

        for result in results {
            match result {
                Ok(loaded) => {
                    stats.success_count += 1;
                    stats.total_size += loaded.file_size();
                    stats.total_pages += loaded.page_count();
                    load_time += loaded.load_time;
                }
                Err(_) => stats.failure_count += 1,
            }
        }

        if stats.success_count > 0 {
            stats.average_time = load_time / stats.success_count as u32;
        }
        stats
    }

    /// Total size as a human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Reads source documents.
///
/// Documents without pages load fine; they contribute nothing to the
/// assembled output.
#[derive(Debug, Clone, Default)]
pub struct SourceReader;

impl SourceReader {
    /// Create a reader.
    pub fn new() -> Self {
        Self
    }

    /// Load one file.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`PageSource::open`].
    pub async fn load(&self, path: &Path) -> LoadResult {
        let start = Instant::now();
        let source = PageSource::open(path).await?;

        let load_time = start.elapsed();
        debug!(path = %path.display(), pages = source.page_count(), ?load_time, "loaded source");

        Ok(LoadedSource {
            source,
            path: path.to_path_buf(),
            load_time,
        })
    }

    /// Load files one after another.
    pub async fn load_sequential(&self, paths: &[PathBuf]) -> Vec<LoadResult> {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            results.push(self.load(path).await);
        }
        results
    }

    /// Load files with up to `workers` loads in flight.
    ///
    /// Results are in the same order as `paths`.
    pub async fn load_parallel(&self, paths: &[PathBuf], workers: usize) -> Vec<LoadResult> {
        let workers = workers.max(1);

        let tasks = paths.iter().map(|path| {
            let reader = self.clone();
            let path = path.clone();
            async move { reader.load(&path).await }
        });

        stream::iter(tasks).buffered(workers).collect().await
    }

    /// Load files, choosing sequential or parallel loading by batch size.
    pub async fn load_all(
        &self,
        paths: &[PathBuf],
        max_workers: usize,
    ) -> (Vec<LoadResult>, LoadStatistics) {
        let start = Instant::now();

        let results = if paths.len() <= SEQUENTIAL_THRESHOLD {
            self.load_sequential(paths).await
        } else {
            self.load_parallel(paths, max_workers).await
        };

        let stats = LoadStatistics::from_results(&results, start.elapsed());
        (results, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PdfBindError;
    use crate::source::test_support::{create_multi_page_pdf, to_bytes};
    use tempfile::TempDir;

    fn write_pdf(dir: &TempDir, name: &str, pages: usize) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, to_bytes(&mut create_multi_page_pdf(pages))).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_single() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "one.pdf", 3);

        let loaded = SourceReader::new().load(&path).await.unwrap();
        assert_eq!(loaded.page_count(), 3);
        assert_eq!(loaded.path, path);
        assert!(loaded.file_size() > 0);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = SourceReader::new()
            .load(Path::new("/nonexistent/missing.pdf"))
            .await;
        assert!(matches!(result, Err(PdfBindError::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let result = SourceReader::new().load(&path).await;
        assert!(matches!(result, Err(PdfBindError::UnreadableDocument { .. })));
    }

    #[tokio::test]
    async fn test_load_document_without_pages() {
        let dir = TempDir::new().unwrap();
        let path = write_pdf(&dir, "empty.pdf", 0);

        let loaded = SourceReader::new().load(&path).await.unwrap();
        assert_eq!(loaded.page_count(), 0);
    }

    #[tokio::test]
    async fn test_parallel_keeps_order() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (1..=6)
            .map(|n| write_pdf(&dir, &format!("doc{n}.pdf"), n))
            .collect();

        let results = SourceReader::new().load_parallel(&paths, 4).await;
        let counts: Vec<usize> = results
            .into_iter()
            .map(|r| r.unwrap().page_count())
            .collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_load_all_statistics() {
        let dir = TempDir::new().unwrap();
        let mut paths: Vec<PathBuf> = (1..=4)
            .map(|n| write_pdf(&dir, &format!("doc{n}.pdf"), 2))
            .collect();
        paths.push(dir.path().join("missing.pdf"));

        let (results, stats) = SourceReader::new().load_all(&paths, 2).await;
        assert_eq!(results.len(), 5);
        assert_eq!(stats.success_count, 4);
        assert_eq!(stats.failure_count, 1);
        assert_eq!(stats.total_pages, 8);
        assert!(stats.total_size > 0);
    }
}
