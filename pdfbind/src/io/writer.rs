//! Writing assembled documents to disk.
//!
//! Writes are atomic by default: the bytes go to a sibling temporary file
//! which is then renamed over the destination, so a failed write never
//! leaves a truncated PDF behind.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{PdfBindError, Result};
use crate::utils::format_file_size;

/// Numbers about one write.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time spent writing.
    pub write_time: Duration,
    /// Bytes written.
    pub file_size: u64,
    /// Final location of the file.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// File size as a human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writes PDF bytes to files.
#[derive(Debug, Clone)]
pub struct PdfWriter {
    atomic: bool,
}

impl PdfWriter {
    /// Create a writer with atomic writes.
    pub fn new() -> Self {
        Self { atomic: true }
    }

    /// Create a writer that writes directly to the destination.
    pub fn non_atomic() -> Self {
        Self { atomic: false }
    }

    /// Write `bytes` to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::FailedToCreateOutput`] if the file cannot be
    /// created and [`PdfBindError::FailedToWrite`] if writing or renaming
    /// fails. A partially written temporary file is removed.
    pub async fn write(&self, bytes: &[u8], path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();
        let target = if self.atomic {
            temp_path_for(path)
        } else {
            path.to_path_buf()
        };

        if let Err(e) = tokio::fs::write(&target, bytes).await {
            let _ = tokio::fs::remove_file(&target).await;
            return Err(match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    PdfBindError::FailedToCreateOutput {
                        path: path.to_path_buf(),
                        source: e,
                    }
                }
                _ => PdfBindError::FailedToWrite {
                    path: path.to_path_buf(),
                    source: e,
                },
            });
        }

        if self.atomic
            && let Err(e) = tokio::fs::rename(&target, path).await
        {
            let _ = tokio::fs::remove_file(&target).await;
            return Err(PdfBindError::FailedToWrite {
                path: path.to_path_buf(),
                source: e,
            });
        }

        let stats = WriteStatistics {
            write_time: start.elapsed(),
            file_size: bytes.len() as u64,
            output_path: path.to_path_buf(),
        };
        debug!(path = %path.display(), bytes = stats.file_size, "wrote output");
        Ok(stats)
    }

    /// Check that the parent directory of `path` exists and is writable.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::InvalidConfig`] if the directory is missing or
    /// read-only.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        let metadata = tokio::fs::metadata(parent).await.map_err(|_| {
            PdfBindError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            ))
        })?;

        if metadata.permissions().readonly() {
            return Err(PdfBindError::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }
        Ok(())
    }

    /// Whether something exists at `path`.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }

    /// Remove `path` if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::FailedToWrite`] if removal fails.
    pub async fn remove_if_exists(&self, path: &Path) -> Result<()> {
        if self.exists(path).await {
            tokio::fs::remove_file(path)
                .await
                .map_err(|e| PdfBindError::FailedToWrite {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
