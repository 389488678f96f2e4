//! Input path expansion and small formatting helpers.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{PdfBindError, Result};

/// Expand command-line inputs into file paths.
///
/// Each input is handled by its shape:
/// - an existing directory contributes every `*.pdf` below it, sorted
/// - a string containing glob metacharacters is expanded with `glob`
/// - anything else is kept as-is, so a missing file is reported later by
///   the loader with a proper error
///
/// The relative order of inputs is preserved.
///
/// # Errors
///
/// Returns [`PdfBindError::Other`] for a malformed glob pattern or an
/// unreadable directory entry.
pub fn expand_inputs<T>(inputs: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        let path = Path::new(input);

        if path.is_dir() {
            resolved.extend(pdfs_in_directory(path)?);
        } else if is_glob_pattern(input) {
            resolved.extend(expand_pattern(input)?);
        } else {
            resolved.push(path.to_path_buf());
        }
    }

    Ok(resolved)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|err| PdfBindError::other(err.to_string()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| PdfBindError::other(err.to_string()))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    Ok(paths)
}

fn pdfs_in_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|err| PdfBindError::other(err.to_string()))?;
        if entry.file_type().is_file() && has_pdf_extension(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

/// Whether `path` ends in `.pdf`, ignoring case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Format a byte count as a human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
