//! Running one conversion, directly or as a queued task.

use anyhow::Context;
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::dispatcher::Dispatcher;
use super::format::FormatKind;
use crate::config::ConvertConfig;
use crate::error::{PdfBindError, Result};
use crate::queue::{ConversionQueue, TaskId};

/// Suffixed names tried after the plain one is taken.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Output location for converting `input` into `target`:
/// `<output_dir>/<stem>_<unix-millis>.<ext>`.
///
/// Two conversions can land on the same name; [`convert_file`] then adds
/// a `_<n>` suffix rather than overwrite.
pub fn output_path_for(input: &Path, target: FormatKind, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "output".to_string());
    let millis = Utc::now().timestamp_millis();
    output_dir.join(format!("{stem}_{millis}.{}", target.extension()))
}

/// Convert `input` into `target`, writing below `config.output_dir`.
///
/// `progress` receives coarse percentages as the conversion advances.
///
/// # Errors
///
/// - [`PdfBindError::FileNotFound`] if the input does not exist
/// - [`PdfBindError::UnknownFormat`] if the input extension is unknown
/// - [`PdfBindError::UnsupportedConversion`] if no strategy exists
/// - [`PdfBindError::ConversionFailed`] if the strategy fails
pub async fn convert_file<P>(
    input: &Path,
    target: FormatKind,
    config: &ConvertConfig,
    progress: P,
) -> Result<PathBuf>
where
    P: Fn(u8) + Send + Sync,
{
    if !tokio::fs::try_exists(input).await.unwrap_or(false) {
        return Err(PdfBindError::file_not_found(input.to_path_buf()));
    }

    let source = FormatKind::from_path(input)?;
    let strategy = Dispatcher::route(source, target)?;
    debug!(input = %input.display(), %strategy, "converting");
    progress(10);

    let bytes = tokio::fs::read(input).await?;
    progress(30);

    let path = input.to_path_buf();
    let output = tokio::task::spawn_blocking(move || strategy.apply(&bytes))
        .await
        .map_err(|e| PdfBindError::other(format!("Conversion task failed: {e}")))?
        .map_err(|e| PdfBindError::conversion_failed(path, e.to_string()))?;
    progress(80);

    tokio::fs::create_dir_all(&config.output_dir).await?;
    let destination =
        write_new_file(&output_path_for(input, target, &config.output_dir), &output).await?;
    progress(95);

    Ok(destination)
}

/// `path` with `_<attempt>` appended to its stem; attempt 0 is `path` itself.
fn numbered(path: &Path, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{attempt}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{attempt}"),
    };
    path.with_file_name(name)
}

/// Write `bytes` to `path`, or to the first free `_<n>` variant of it.
///
/// Existing files are never replaced. Returns the path written.
pub(crate) async fn write_new_file(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    for attempt in 0..=MAX_NAME_ATTEMPTS {
        let candidate = numbered(path, attempt);
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(source) => {
                return Err(PdfBindError::FailedToWrite {
                    path: candidate,
                    source,
                });
            }
        };

        let written = async {
            file.write_all(bytes).await?;
            file.flush().await
        }
        .await;
        if let Err(source) = written {
            let _ = tokio::fs::remove_file(&candidate).await;
            return Err(PdfBindError::FailedToWrite {
                path: candidate,
                source,
            });
        }

        if attempt > 0 {
            debug!(path = %candidate.display(), "output name taken, used suffix");
        }
        return Ok(candidate);
    }

    Err(PdfBindError::FailedToWrite {
        path: path.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{MAX_NAME_ATTEMPTS} suffixed names already taken"),
        ),
    })
}

/// Queue a conversion of `input` into `target`.
///
/// Routing happens when the task runs, so an unsupported pair is admitted
/// and then fails. Callers wanting an early answer can check
/// [`Dispatcher::route`] first.
pub fn submit_conversion(
    queue: &ConversionQueue,
    input: impl Into<PathBuf>,
    target: FormatKind,
    config: &ConvertConfig,
) -> TaskId {
    let input = input.into();
    let config = config.clone();

    queue.submit(move |reporter| async move {
        let path = convert_file(&input, target, &config, |p| {
            reporter.report(p);
        })
        .await
        .with_context(|| format!("{} -> {target}", input.display()))?;
        Ok(path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueueConfig;
    use crate::queue::TaskStatus;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> ConvertConfig {
        ConvertConfig {
            output_dir: dir.path().join("outputs"),
        }
    }

    #[test]
    fn test_output_path_shape() {
        let path = output_path_for(
            Path::new("/data/notes.md"),
            FormatKind::Pdf,
            Path::new("outputs"),
        );
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(path.starts_with("outputs"));
        assert!(name.starts_with("notes_"));
        assert!(name.ends_with(".pdf"));
        let millis = &name["notes_".len()..name.len() - ".pdf".len()];
        assert!(millis.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn test_write_new_file_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes_1700000000000.txt");

        let first = write_new_file(&path, b"first").await.unwrap();
        let second = write_new_file(&path, b"second").await.unwrap();
        let third = write_new_file(&path, b"third").await.unwrap();

        assert_eq!(first, path);
        assert_eq!(second, dir.path().join("notes_1700000000000_1.txt"));
        assert_eq!(third, dir.path().join("notes_1700000000000_2.txt"));
        assert_eq!(std::fs::read(&first).unwrap(), b"first");
        assert_eq!(std::fs::read(&second).unwrap(), b"second");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_same_stem_conversions_keep_both_outputs() {
        let dir = TempDir::new().unwrap();
        let mut inputs = Vec::new();
        for (sub, text) in [("a", "from a"), ("b", "from b")] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
            let input = dir.path().join(sub).join("notes.md");
            std::fs::write(&input, text).unwrap();
            inputs.push(input);
        }
        let queue = ConversionQueue::new(QueueConfig::with_max_concurrent(2)).unwrap();
        let config = config_in(&dir);

        let ids: Vec<_> = inputs
            .iter()
            .map(|input| submit_conversion(&queue, input, FormatKind::Text, &config))
            .collect();
        queue.wait_all().await;

        let outputs: Vec<PathBuf> = ids
            .iter()
            .map(|id| queue.status(id).unwrap().result.unwrap())
            .collect();
        assert_ne!(outputs[0], outputs[1]);

        let mut contents: Vec<String> = outputs
            .iter()
            .map(|p| std::fs::read_to_string(p).unwrap())
            .collect();
        contents.sort();
        assert_eq!(contents, vec!["from a", "from b"]);
    }

    #[tokio::test]
    async fn test_convert_file_markdown_to_text() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("readme.md");
        std::fs::write(&input, "# Title\n\n**bold** text").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let output = convert_file(&input, FormatKind::Text, &config_in(&dir), move |p| {
            sink.lock().unwrap().push(p)
        })
        .await
        .unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "Title\n\nbold text");
        assert_eq!(output.extension().unwrap(), "txt");
        let seen = seen.lock().unwrap();
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_convert_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = convert_file(
            &dir.path().join("nope.txt"),
            FormatKind::Pdf,
            &config_in(&dir),
            |_| {},
        )
        .await;
        assert!(matches!(result, Err(PdfBindError::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_unsupported_pair_fails_task_not_admission() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("paper.pdf");
        std::fs::write(&input, b"%PDF-1.7").unwrap();
        let queue = ConversionQueue::new(QueueConfig::default()).unwrap();

        let id = submit_conversion(&queue, &input, FormatKind::Docx, &config_in(&dir));
        let task = queue.wait(&id).await.unwrap();

        assert_eq!(task.status, TaskStatus::Failed);
        let error = task.error.unwrap();
        assert!(error.contains("Unsupported conversion"), "{error}");
        assert!(!dir.path().join("outputs").exists());
    }

    #[tokio::test]
    async fn test_queued_text_to_pdf() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, "first line\nsecond line").unwrap();
        let queue = ConversionQueue::new(QueueConfig::default()).unwrap();

        let id = submit_conversion(&queue, input, FormatKind::Pdf, &config_in(&dir));
        let task = queue.wait(&id).await.unwrap();

        assert_eq!(task.status, TaskStatus::Completed);
        let output = task.result.unwrap();
        let doc = lopdf::Document::load_mem(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
