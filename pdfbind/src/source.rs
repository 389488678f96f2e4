//! Input documents and their pages.
//!
//! A [`PageSource`] wraps one parsed PDF and exposes its page count and an
//! ordered list of [`SourcePage`]s, each carrying the rotation it had in
//! the original file (including rotation inherited from the page tree).
//!
//! # Examples
//!
//! ```no_run
//! use pdfbind::source::PageSource;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = PageSource::open(Path::new("chapter1.pdf")).await?;
//! for page in source.pages() {
//!     println!("page {} rotated {}", page.number, page.rotation.as_degrees());
//! }
//! # Ok(())
//! # }
//! ```

use lopdf::{Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{PdfBindError, Result};

/// Maximum depth followed when walking `/Parent` links.
const MAX_TREE_DEPTH: usize = 64;

/// Page rotation angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRotation {
    /// No rotation.
    #[default]
    None,
    /// Rotate 90 degrees clockwise.
    Clockwise90,
    /// Rotate 180 degrees.
    Rotate180,
    /// Rotate 270 degrees clockwise.
    Clockwise270,
}

impl PageRotation {
    /// Map a raw `/Rotate` value onto a canonical angle.
    ///
    /// Negative and out-of-range multiples of 90 are folded into
    /// `0..360`, so `-90` becomes 270 and `450` becomes 90. Returns `None`
    /// for angles that are not a multiple of 90.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::None),
            90 => Some(Self::Clockwise90),
            180 => Some(Self::Rotate180),
            270 => Some(Self::Clockwise270),
            _ => None,
        }
    }

    /// Get rotation as degrees.
    pub fn as_degrees(&self) -> i64 {
        match self {
            Self::None => 0,
            Self::Clockwise90 => 90,
            Self::Rotate180 => 180,
            Self::Clockwise270 => 270,
        }
    }
}

/// One page of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePage {
    /// 1-based position inside the source document.
    pub number: u32,
    /// Object id of the page dictionary in the source document.
    pub id: ObjectId,
    /// The `/Rotate` value exactly as stored, if any.
    pub raw_rotation: Option<i64>,
    /// Canonical rotation of the page.
    pub rotation: PageRotation,
}

/// A parsed input document.
#[derive(Debug, Clone)]
pub struct PageSource {
    label: String,
    path: Option<PathBuf>,
    byte_len: u64,
    document: Document,
}

impl PageSource {
    /// Parse a PDF held in memory.
    ///
    /// `label` identifies the input in error messages and default TOC titles.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::UnreadableDocument`] if the bytes are not a
    /// PDF lopdf can parse, or [`PdfBindError::EncryptedDocument`] if the
    /// file needs a password.
    pub fn from_bytes(label: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let label = label.into();
        let document = Document::load_mem(bytes).map_err(|e| classify_load_error(&label, e))?;
        debug!(source = %label, pages = document.get_pages().len(), "parsed document");

        Ok(Self {
            label,
            path: None,
            byte_len: bytes.len() as u64,
            document,
        })
    }

    /// Wrap an already-built document.
    pub fn from_document(label: impl Into<String>, document: Document) -> Self {
        Self {
            label: label.into(),
            path: None,
            byte_len: 0,
            document,
        }
    }

    /// Read and parse a PDF file.
    ///
    /// Parsing runs on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::FileNotFound`] if the path does not exist, or
    /// the same errors as [`PageSource::from_bytes`].
    pub async fn open(path: &Path) -> Result<Self> {
        let path_buf = path.to_path_buf();

        let bytes = tokio::fs::read(&path_buf).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PdfBindError::file_not_found(path_buf.clone()),
            _ => PdfBindError::FileNotAccessible {
                path: path_buf.clone(),
                source: e,
            },
        })?;

        let label = path_buf.display().to_string();
        let mut source = tokio::task::spawn_blocking(move || Self::from_bytes(label, &bytes))
            .await
            .map_err(|e| PdfBindError::other(format!("Load task failed: {e}")))??;
        source.path = Some(path_buf);

        Ok(source)
    }

    /// Label used in messages (the file path when opened from disk).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Path the document was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Size of the parsed input in bytes (0 for in-memory documents).
    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Pages in document order, each with its original rotation.
    pub fn pages(&self) -> Vec<SourcePage> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, id)| {
                let raw_rotation =
                    inherited_attribute(&self.document, id, b"Rotate").and_then(object_as_degrees);
                let rotation = match raw_rotation {
                    Some(degrees) => PageRotation::from_degrees(degrees).unwrap_or_else(|| {
                        warn!(
                            source = %self.label,
                            page = number,
                            degrees,
                            "page rotation is not a multiple of 90, treating as 0"
                        );
                        PageRotation::None
                    }),
                    None => PageRotation::None,
                };

                SourcePage {
                    number,
                    id,
                    raw_rotation,
                    rotation,
                }
            })
            .collect()
    }

    /// Borrow the parsed document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take ownership of the parsed document.
    pub fn into_document(self) -> Document {
        self.document
    }
}

fn classify_load_error(label: &str, err: lopdf::Error) -> PdfBindError {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    if lowered.contains("encrypt") || lowered.contains("password") {
        PdfBindError::EncryptedDocument {
            label: label.to_string(),
        }
    } else {
        PdfBindError::unreadable_document(label, message)
    }
}

/// Look up a page attribute, following `/Parent` links for inheritable keys.
///
/// Returns the first value found walking from the page towards the root,
/// with indirect references resolved.
pub(crate) fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(resolve(doc, value).clone());
        }
        let parent_id = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent_id).ok()?;
    }

    None
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn object_as_degrees(object: Object) -> Option<i64> {
    match object {
        Object::Integer(value) => Some(value),
        Object::Real(value) => Some(value.round() as i64),
        _ => None,
    }
}
