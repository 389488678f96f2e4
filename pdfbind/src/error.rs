//! Error types for pdfbind.
//!
//! This module defines all error types that can occur while loading,
//! composing, and converting documents, and while scheduling conversion
//! tasks. Errors are designed to be informative and actionable.
//!
//! # Error Categories
//!
//! - **File Errors**: File not found, permission denied, etc.
//! - **Input Errors**: Unreadable documents, empty TOC titles, bad geometry
//! - **Composition Errors**: Problems assembling or serializing the output
//! - **Scheduling Errors**: Unknown task ids and illegal state transitions
//! - **Conversion Errors**: Unsupported format pairs and strategy failures

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::queue::{TaskId, TaskStatus};

/// Result type alias for pdfbind operations.
pub type Result<T> = std::result::Result<T, PdfBindError>;

/// Main error type for pdfbind operations.
#[derive(Debug, Error)]
pub enum PdfBindError {
    // ========================================================================
    // File errors
    // ========================================================================
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file is not accessible (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {source}", path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    // ========================================================================
    // Input errors
    // ========================================================================
    /// The bytes are not a readable PDF document.
    #[error("Unreadable document: {label}\n  Reason: {reason}")]
    UnreadableDocument {
        /// File path or other label identifying the input.
        label: String,
        /// Parser message.
        reason: String,
    },

    /// PDF file is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {label}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools"
    )]
    EncryptedDocument {
        /// File path or other label identifying the input.
        label: String,
    },

    /// No documents were provided for merging.
    #[error("No input documents specified for merging")]
    NoDocuments,

    /// A TOC entry title was empty or whitespace.
    #[error("TOC entry title must not be empty")]
    EmptyEntryTitle,

    /// A TOC entry pointed at page zero.
    #[error("TOC entry '{title}' has invalid target page {page}; pages start at 1")]
    InvalidTargetPage {
        /// Title of the offending entry.
        title: String,
        /// Requested target page.
        page: u32,
    },

    /// Page geometry leaves no room for content.
    #[error("Invalid page geometry: {reason}")]
    InvalidGeometry {
        /// What is wrong with the geometry.
        reason: String,
    },

    // ========================================================================
    // Composition errors
    // ========================================================================
    /// A source document could not be read during composition.
    #[error("Source document unreadable: {label}\n  Reason: {reason}")]
    SourceUnreadable {
        /// File path or other label identifying the source.
        label: String,
        /// Underlying reason.
        reason: String,
    },

    /// Assembling or serializing the merged document failed.
    #[error("Failed to assemble output document: {reason}")]
    CompositionIo {
        /// Description of what went wrong.
        reason: String,
    },

    // ========================================================================
    // Scheduling errors
    // ========================================================================
    /// No task exists with the given id.
    #[error("Task not found: {id}")]
    TaskNotFound {
        /// The unknown id.
        id: TaskId,
    },

    /// The requested state change is not allowed from the current state.
    #[error("Task {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Task the transition was requested for.
        id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    // ========================================================================
    // Conversion errors
    // ========================================================================
    /// No strategy converts between the two formats.
    #[error("Unsupported conversion from {source_kind} to {target_kind}")]
    UnsupportedConversion {
        /// Source format name.
        source_kind: String,
        /// Target format name.
        target_kind: String,
    },

    /// The file extension does not name a known format.
    #[error("Unknown format: {name}")]
    UnknownFormat {
        /// The extension or name that was not recognised.
        name: String,
    },

    /// A conversion strategy failed.
    #[error("Conversion failed for {}\n  Reason: {reason}", path.display())]
    ConversionFailed {
        /// Input file being converted.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    // ========================================================================
    // Configuration and generic errors
    // ========================================================================
    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfBindError {
    fn from(err: lopdf::Error) -> Self {
        Self::CompositionIo {
            reason: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for PdfBindError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(format!("{err:#}"))
    }
}

impl PdfBindError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create an UnreadableDocument error.
    pub fn unreadable_document(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnreadableDocument {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a CompositionIo error.
    pub fn composition_io(reason: impl Into<String>) -> Self {
        Self::CompositionIo {
            reason: reason.into(),
        }
    }

    /// Create an InvalidGeometry error.
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Create an UnsupportedConversion error.
    pub fn unsupported_conversion(source: impl ToString, target: impl ToString) -> Self {
        Self::UnsupportedConversion {
            source_kind: source.to_string(),
            target_kind: target.to_string(),
        }
    }

    /// Create a ConversionFailed error.
    pub fn conversion_failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::ConversionFailed {
            path,
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Re-label a PageSource failure as a composition input failure.
    ///
    /// Anything that is not an input error passes through unchanged.
    pub fn into_source_unreadable(self) -> Self {
        match self {
            Self::UnreadableDocument { label, reason } => Self::SourceUnreadable { label, reason },
            Self::EncryptedDocument { label } => Self::SourceUnreadable {
                label,
                reason: "document is encrypted".to_string(),
            },
            Self::FileNotFound { path } => Self::SourceUnreadable {
                label: path.display().to_string(),
                reason: "file not found".to_string(),
            },
            other => other,
        }
    }

    /// Check if this error is recoverable (operation can continue).
    ///
    /// Returns true for errors that might be acceptable in continue-on-error mode.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnreadableDocument { .. }
                | Self::EncryptedDocument { .. }
                | Self::SourceUnreadable { .. }
                | Self::FileNotFound { .. }
        )
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::UnreadableDocument { .. } => 3,
            Self::EncryptedDocument { .. } => 3,
            Self::SourceUnreadable { .. } => 3,
            Self::NoDocuments => 1,
            Self::EmptyEntryTitle => 1,
            Self::InvalidTargetPage { .. } => 1,
            Self::InvalidGeometry { .. } => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::CompositionIo { .. } => 6,
            Self::TaskNotFound { .. } => 7,
            Self::InvalidTransition { .. } => 7,
            Self::UnsupportedConversion { .. } => 8,
            Self::UnknownFormat { .. } => 8,
            Self::ConversionFailed { .. } => 8,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130,
            Self::Io(_) => 5,
            Self::Other { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_file_not_found_display() {
        let err = PdfBindError::file_not_found(PathBuf::from("/tmp/missing.pdf"));
        let msg = format!("{err}");
        assert!(msg.contains("File not found"));
        assert!(msg.contains("missing.pdf"));
    }

    #[test]
    fn test_unreadable_document_display() {
        let err = PdfBindError::unreadable_document("bad.pdf", "Invalid file header");
        let msg = format!("{err}");
        assert!(msg.contains("Unreadable document"));
        assert!(msg.contains("bad.pdf"));
        assert!(msg.contains("Invalid file header"));
    }

    #[test]
    fn test_output_exists_display() {
        let err = PdfBindError::output_exists(PathBuf::from("existing.pdf"));
        let msg = format!("{err}");
        assert!(msg.contains("already exists"));
        assert!(msg.contains("--force"));
    }

    #[test]
    fn test_invalid_transition_display() {
        let id = TaskId::new();
        let err = PdfBindError::InvalidTransition {
            id,
            from: TaskStatus::Completed,
            to: TaskStatus::Cancelled,
        };
        let msg = format!("{err}");
        assert!(msg.contains(&id.to_string()));
        assert!(msg.contains("completed"));
        assert!(msg.contains("cancelled"));
    }

    #[test]
    fn test_unsupported_conversion_display() {
        let err = PdfBindError::unsupported_conversion("pdf", "webp");
        assert_eq!(format!("{err}"), "Unsupported conversion from pdf to webp");
    }

    #[test]
    fn test_into_source_unreadable() {
        let err = PdfBindError::unreadable_document("a.pdf", "truncated").into_source_unreadable();
        assert!(matches!(err, PdfBindError::SourceUnreadable { ref label, .. } if label == "a.pdf"));

        let err = PdfBindError::Cancelled.into_source_unreadable();
        assert!(matches!(err, PdfBindError::Cancelled));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(PdfBindError::unreadable_document("bad.pdf", "error").is_recoverable());
        assert!(!PdfBindError::NoDocuments.is_recoverable());
        assert!(!PdfBindError::composition_io("disk full").is_recoverable());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(PdfBindError::file_not_found(PathBuf::from("x")).exit_code(), 2);
        assert_eq!(PdfBindError::unreadable_document("x", "e").exit_code(), 3);
        assert_eq!(PdfBindError::NoDocuments.exit_code(), 1);
        assert_eq!(PdfBindError::output_exists(PathBuf::from("x")).exit_code(), 4);
        assert_eq!(PdfBindError::Cancelled.exit_code(), 130);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "not found");
        let err: PdfBindError = io_err.into();
        assert!(matches!(err, PdfBindError::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_source() {
        let err = PdfBindError::FileNotAccessible {
            path: PathBuf::from("test.pdf"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(PdfBindError::NoDocuments.source().is_none());
    }
}
