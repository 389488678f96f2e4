//! File format kinds recognised by the converter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{PdfBindError, Result};

/// A file format, identified by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// Portable Document Format.
    Pdf,
    /// PNG image.
    Png,
    /// JPEG image (`.jpg` or `.jpeg`).
    Jpeg,
    /// WebP image.
    Webp,
    /// Markdown text (`.md` or `.markdown`).
    Markdown,
    /// Plain text.
    Text,
    /// Word document.
    Docx,
}

impl FormatKind {
    /// Every known format.
    pub const ALL: [FormatKind; 7] = [
        Self::Pdf,
        Self::Png,
        Self::Jpeg,
        Self::Webp,
        Self::Markdown,
        Self::Text,
        Self::Docx,
    ];

    /// Parse a file extension, with or without the leading dot.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::UnknownFormat`] for unrecognised extensions.
    pub fn from_extension(ext: &str) -> Result<Self> {
        let ext = ext.trim().trim_start_matches('.');
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            "md" | "markdown" => Ok(Self::Markdown),
            "txt" | "text" => Ok(Self::Text),
            "docx" => Ok(Self::Docx),
            _ => Err(PdfBindError::UnknownFormat {
                name: ext.to_string(),
            }),
        }
    }

    /// Format of a file, from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::UnknownFormat`] if the path has no extension
    /// or an unrecognised one.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| PdfBindError::UnknownFormat {
                name: path.display().to_string(),
            })?;
        Self::from_extension(ext)
    }

    /// Extension written on output files.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Markdown => "md",
            Self::Text => "txt",
            Self::Docx => "docx",
        }
    }

    /// Whether this is a raster image format.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Png | Self::Jpeg | Self::Webp)
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FormatKind {
    type Err = PdfBindError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s)
    }
}
