//! Failure modes and edge cases across the library.

use std::path::PathBuf;

use pdfbind::compose::merge_documents;
use pdfbind::config::{MergeConfig, QueueConfig};
use pdfbind::error::PdfBindError;
use pdfbind::queue::{ConversionQueue, TaskId};
use pdfbind::source::PageSource;
use pdfbind::toc::{PageGeometry, TocEntry, TocLayoutEngine};
use tempfile::TempDir;

use crate::common::write_pdf;

#[tokio::test]
async fn test_error_nonexistent_input() {
    let dir = TempDir::new().unwrap();
    let config = MergeConfig::new(
        vec![PathBuf::from("/nonexistent/file.pdf")],
        dir.path().join("out.pdf"),
    );

    let err = merge_documents(&config).await.unwrap_err();
    assert!(matches!(err, PdfBindError::SourceUnreadable { .. }));
    assert!(!dir.path().join("out.pdf").exists());
}

#[tokio::test]
async fn test_error_empty_input_list() {
    let config = MergeConfig::new(Vec::new(), "out.pdf");
    assert!(matches!(
        merge_documents(&config).await,
        Err(PdfBindError::NoDocuments)
    ));
}

#[tokio::test]
async fn test_error_corrupted_pdf() {
    let dir = TempDir::new().unwrap();
    let corrupted = dir.path().join("corrupted.pdf");
    std::fs::write(&corrupted, b"this is not a pdf").unwrap();

    let config = MergeConfig::new(vec![corrupted], dir.path().join("out.pdf"));
    let err = merge_documents(&config).await.unwrap_err();
    assert!(matches!(err, PdfBindError::SourceUnreadable { .. }));
}

#[tokio::test]
async fn test_continue_on_error_skips_bad_inputs() {
    let dir = TempDir::new().unwrap();
    let good = write_pdf(dir.path(), "good.pdf", 2);
    let missing = dir.path().join("missing.pdf");

    let mut config = MergeConfig::new(vec![missing, good.clone()], dir.path().join("out.pdf"));
    config.continue_on_error = true;
    config.include_toc = true;

    let outcome = merge_documents(&config).await.unwrap();
    assert_eq!(outcome.statistics.files_merged, 1);
    assert_eq!(outcome.statistics.files_skipped, 1);
    assert_eq!(outcome.merged_files, vec![good]);
    assert_eq!(outcome.statistics.total_pages, 3);
}

#[tokio::test]
async fn test_all_inputs_failing_with_continue() {
    let dir = TempDir::new().unwrap();
    let mut config = MergeConfig::new(
        vec![dir.path().join("a.pdf"), dir.path().join("b.pdf")],
        dir.path().join("out.pdf"),
    );
    config.continue_on_error = true;

    assert!(matches!(
        merge_documents(&config).await,
        Err(PdfBindError::NoDocuments)
    ));
}

#[tokio::test]
async fn test_error_output_same_as_input() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "same.pdf", 1);
    let config = MergeConfig::new(vec![input.clone()], input);

    assert!(matches!(
        merge_documents(&config).await,
        Err(PdfBindError::InvalidConfig { .. })
    ));
}

#[tokio::test]
async fn test_error_output_directory_missing() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "in.pdf", 1);
    let config = MergeConfig::new(vec![input], dir.path().join("no/such/dir/out.pdf"));

    let err = merge_documents(&config).await.unwrap_err();
    assert!(matches!(err, PdfBindError::FailedToCreateOutput { .. }));
}

#[tokio::test]
async fn test_error_zero_jobs() {
    let dir = TempDir::new().unwrap();
    let input = write_pdf(dir.path(), "in.pdf", 1);
    let mut config = MergeConfig::new(vec![input], dir.path().join("out.pdf"));
    config.jobs = Some(0);

    assert!(matches!(
        merge_documents(&config).await,
        Err(PdfBindError::InvalidConfig { .. })
    ));
}

#[test]
fn test_error_garbage_bytes_as_source() {
    let err = PageSource::from_bytes("garbage", b"\x00\x01\x02").unwrap_err();
    assert!(matches!(err, PdfBindError::UnreadableDocument { .. }));
}

#[test]
fn test_error_toc_entry_validation() {
    assert!(matches!(
        TocEntry::new("", 1),
        Err(PdfBindError::EmptyEntryTitle)
    ));
    assert!(matches!(
        TocEntry::new("Intro", 0),
        Err(PdfBindError::InvalidTargetPage { .. })
    ));
}

#[test]
fn test_error_bad_geometry() {
    let geometry = PageGeometry::a4().with_margin(500.0);
    let entries = vec![TocEntry::new("Intro", 2).unwrap()];
    assert!(matches!(
        TocLayoutEngine::new().layout(&entries, &geometry),
        Err(PdfBindError::InvalidGeometry { .. })
    ));
}

#[test]
fn test_error_queue_without_runtime() {
    assert!(ConversionQueue::new(QueueConfig::default()).is_err());
}

#[tokio::test]
async fn test_error_unknown_task() {
    let queue = ConversionQueue::new(QueueConfig::default()).unwrap();
    let unknown = TaskId::new();

    assert!(queue.status(&unknown).is_none());
    assert!(!queue.cancel(&unknown));
    assert!(matches!(
        queue.try_cancel(&unknown),
        Err(PdfBindError::TaskNotFound { .. })
    ));
    assert!(queue.wait(&unknown).await.is_none());
}

#[test]
fn test_exit_codes_are_distinct_for_common_failures() {
    let not_found = PdfBindError::file_not_found(PathBuf::from("x.pdf"));
    let invalid = PdfBindError::invalid_config("bad");
    assert_ne!(not_found.exit_code(), 0);
    assert_ne!(invalid.exit_code(), 0);
    assert_ne!(not_found.exit_code(), invalid.exit_code());
    assert_eq!(PdfBindError::Cancelled.exit_code(), 130);
}
