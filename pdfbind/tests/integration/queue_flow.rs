//! The task queue driving real conversions.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use pdfbind::config::{ConvertConfig, QueueConfig};
use pdfbind::convert::{FormatKind, submit_conversion};
use pdfbind::queue::{ConversionQueue, EventKind, QueueEvent, TaskId, TaskStatus};
use tempfile::TempDir;
use tokio::sync::oneshot;

fn write_text(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn blocker(queue: &ConversionQueue) -> (TaskId, oneshot::Sender<()>) {
    let (tx, rx) = oneshot::channel::<()>();
    let id = queue.submit(move |_| async move {
        let _ = rx.await;
        Ok(PathBuf::from("blocker"))
    });
    (id, tx)
}

#[tokio::test]
async fn test_batch_of_conversions_completes() {
    let dir = TempDir::new().unwrap();
    let config = ConvertConfig {
        output_dir: dir.path().join("out"),
    };
    let queue = ConversionQueue::new(QueueConfig::with_max_concurrent(2)).unwrap();

    let inputs = [
        write_text(&dir, "one.txt", "first file"),
        write_text(&dir, "two.md", "# Two\n\nSome *text*."),
        write_text(&dir, "three.txt", "third\n\nfile"),
    ];
    let ids: Vec<TaskId> = inputs
        .iter()
        .map(|input| submit_conversion(&queue, input.clone(), FormatKind::Pdf, &config))
        .collect();

    let tasks = queue.wait_all().await;
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), ids);

    for task in &tasks {
        assert_eq!(task.status, TaskStatus::Completed, "{:?}", task.error);
        assert_eq!(task.progress, 100);
        let result = task.result.as_ref().unwrap();
        assert!(result.starts_with(dir.path().join("out")));
        let bytes = std::fs::read(result).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(task.completed_at.is_some());
    }
}

#[tokio::test]
async fn test_events_arrive_in_order_for_each_task() {
    let dir = TempDir::new().unwrap();
    let config = ConvertConfig {
        output_dir: dir.path().join("out"),
    };
    let queue = ConversionQueue::new(QueueConfig::default()).unwrap();

    let seen: Arc<Mutex<Vec<(TaskId, QueueEvent)>>> = Arc::new(Mutex::new(Vec::new()));
    for kind in [EventKind::Progress, EventKind::Completed, EventKind::Failed] {
        let seen = Arc::clone(&seen);
        queue.on(kind, move |id, event| {
            seen.lock().unwrap().push((*id, event.clone()));
        });
    }

    let good = submit_conversion(
        &queue,
        write_text(&dir, "ok.txt", "hello"),
        FormatKind::Pdf,
        &config,
    );
    let bad = submit_conversion(&queue, dir.path().join("absent.txt"), FormatKind::Pdf, &config);
    queue.wait_all().await;

    let seen = seen.lock().unwrap();
    let for_good: Vec<&QueueEvent> = seen.iter().filter(|(id, _)| *id == good).map(|(_, e)| e).collect();
    let progress: Vec<u8> = for_good
        .iter()
        .filter_map(|e| match e {
            QueueEvent::Progress { progress } => Some(*progress),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![10, 30, 80, 95]);
    assert!(matches!(for_good.last(), Some(QueueEvent::Completed { .. })));

    let for_bad: Vec<&QueueEvent> = seen.iter().filter(|(id, _)| *id == bad).map(|(_, e)| e).collect();
    assert_eq!(for_bad.len(), 1);
    match for_bad[0] {
        QueueEvent::Failed { error } => assert!(error.contains("absent.txt")),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_cancelled_pending_conversion_never_runs() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    let config = ConvertConfig {
        output_dir: out.clone(),
    };
    let queue = ConversionQueue::new(QueueConfig::with_max_concurrent(1)).unwrap();

    let (first, release) = blocker(&queue);
    let waiting = submit_conversion(
        &queue,
        write_text(&dir, "later.txt", "never converted"),
        FormatKind::Pdf,
        &config,
    );
    assert_eq!(queue.status(&waiting).unwrap().status, TaskStatus::Pending);

    assert!(queue.cancel(&waiting));
    assert!(!queue.cancel(&waiting));
    release.send(()).unwrap();

    let tasks = queue.wait_all().await;
    assert_eq!(tasks[0].id, first);
    assert_eq!(tasks[0].status, TaskStatus::Completed);
    assert_eq!(tasks[1].status, TaskStatus::Cancelled);
    assert!(!out.exists());
}

#[tokio::test]
async fn test_unsupported_pair_is_admitted_then_fails() {
    let dir = TempDir::new().unwrap();
    let config = ConvertConfig {
        output_dir: dir.path().join("out"),
    };
    let queue = ConversionQueue::new(QueueConfig::default()).unwrap();

    let id = submit_conversion(
        &queue,
        write_text(&dir, "notes.txt", "text"),
        FormatKind::Png,
        &config,
    );
    let task = queue.wait(&id).await.unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert!(task.error.unwrap().contains("Unsupported conversion"));
    assert!(task.result.is_none());
}

#[tokio::test]
async fn test_purge_after_batch() {
    let dir = TempDir::new().unwrap();
    let config = ConvertConfig {
        output_dir: dir.path().join("out"),
    };
    let queue = ConversionQueue::new(QueueConfig::default()).unwrap();

    let (blocked, release) = blocker(&queue);
    submit_conversion(&queue, write_text(&dir, "a.txt", "a"), FormatKind::Pdf, &config);
    let b = submit_conversion(&queue, write_text(&dir, "b.txt", "b"), FormatKind::Pdf, &config);
    queue.wait(&b).await;

    // The blocker is still running, so it survives the purge.
    assert!(queue.purge_finished() >= 1);
    assert!(queue.status(&blocked).is_some());

    release.send(()).unwrap();
    queue.wait_all().await;
    assert_eq!(queue.purge_finished(), 1);
    assert!(queue.tasks().is_empty());
}
