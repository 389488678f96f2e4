//! Bounded FIFO scheduler for conversion work.

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use super::events::{EventKind, Listener, ListenerRegistry, QueueEvent, dispatch, panic_message};
use super::task::{ConversionTask, TaskId, TaskStatus};
use crate::config::QueueConfig;
use crate::error::{PdfBindError, Result};

/// Error message recorded on cancelled tasks.
pub const CANCELLED_MESSAGE: &str = "cancelled by user";

/// Future returned by a work unit.
pub type WorkFuture = BoxFuture<'static, anyhow::Result<PathBuf>>;

/// A deferred computation producing an output location.
pub type WorkUnit = Box<dyn FnOnce(ProgressReporter) -> WorkFuture + Send>;

struct Entry {
    task: ConversionTask,
    work: Option<WorkUnit>,
}

#[derive(Default)]
struct State {
    entries: HashMap<TaskId, Entry>,
    admission: Vec<TaskId>,
    pending: VecDeque<TaskId>,
    /// Work units started and not yet returned.
    running: usize,
}

struct Inner {
    max_concurrent: usize,
    state: Mutex<State>,
    listeners: Mutex<ListenerRegistry>,
    finished: Notify,
    runtime: Handle,
}

/// Handle given to a work unit for reporting progress.
#[derive(Clone)]
pub struct ProgressReporter {
    inner: Arc<Inner>,
    id: TaskId,
}

impl ProgressReporter {
    /// Id of the task this reporter belongs to.
    pub fn task_id(&self) -> TaskId {
        self.id
    }

    /// Record progress in percent. Values above 100 are clamped.
    ///
    /// Reports are accepted only while the task is processing; anything
    /// else is dropped. Returns whether the report was accepted.
    pub fn report(&self, progress: u8) -> bool {
        self.inner.report(self.id, progress.min(100))
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("id", &self.id)
            .finish()
    }
}

/// Task queue running at most `max_concurrent` work units at a time.
///
/// Tasks start in admission order. Snapshots, cancellation and listener
/// registration work from any thread; work units run on the tokio runtime
/// the queue was created on. Cloning yields another handle to the same
/// queue.
#[derive(Clone)]
pub struct ConversionQueue {
    inner: Arc<Inner>,
}

impl ConversionQueue {
    /// Create a queue on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or no tokio
    /// runtime is running.
    pub fn new(config: QueueConfig) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|e| {
            PdfBindError::other(format!("Conversion queue needs a tokio runtime: {e}"))
        })?;

        Ok(Self {
            inner: Arc::new(Inner {
                max_concurrent: config.max_concurrent,
                state: Mutex::new(State::default()),
                listeners: Mutex::new(ListenerRegistry::default()),
                finished: Notify::new(),
                runtime,
            }),
        })
    }

    /// Concurrency budget.
    pub fn max_concurrent(&self) -> usize {
        self.inner.max_concurrent
    }

    /// Admit a work unit with priority 0.
    pub fn submit<F, Fut>(&self, work: F) -> TaskId
    where
        F: FnOnce(ProgressReporter) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<PathBuf>> + Send + 'static,
    {
        self.submit_with_priority(work, 0)
    }

    /// Admit a work unit. The priority is recorded on the task but does
    /// not affect ordering.
    pub fn submit_with_priority<F, Fut>(&self, work: F, priority: i32) -> TaskId
    where
        F: FnOnce(ProgressReporter) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<PathBuf>> + Send + 'static,
    {
        let unit: WorkUnit = Box::new(move |reporter| work(reporter).boxed());
        let id = TaskId::new();

        {
            let mut state = self.inner.state.lock();
            state.entries.insert(
                id,
                Entry {
                    task: ConversionTask::new(id, priority),
                    work: Some(unit),
                },
            );
            state.admission.push(id);
            state.pending.push_back(id);
            debug!(task_id = %id, priority, queued = state.pending.len(), "task admitted");
        }

        self.inner.pump();
        id
    }

    /// Snapshot of one task.
    pub fn status(&self, id: &TaskId) -> Option<ConversionTask> {
        self.inner
            .state
            .lock()
            .entries
            .get(id)
            .map(|entry| entry.task.clone())
    }

    /// Snapshots of all tasks in admission order.
    pub fn tasks(&self) -> Vec<ConversionTask> {
        let state = self.inner.state.lock();
        state
            .admission
            .iter()
            .filter_map(|id| state.entries.get(id))
            .map(|entry| entry.task.clone())
            .collect()
    }

    /// Number of tasks currently marked processing.
    pub fn processing_count(&self) -> usize {
        self.count_with(TaskStatus::Processing)
    }

    /// Number of tasks waiting for a slot.
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Number of work units started and not yet returned.
    ///
    /// This can exceed [`processing_count`](Self::processing_count) while a
    /// cancelled task's work unit is still running.
    pub fn running_work_units(&self) -> usize {
        self.inner.state.lock().running
    }

    fn count_with(&self, status: TaskStatus) -> usize {
        self.inner
            .state
            .lock()
            .entries
            .values()
            .filter(|entry| entry.task.status == status)
            .count()
    }

    /// Cancel a pending or processing task. Returns `false` if the task is
    /// unknown or already finished.
    pub fn cancel(&self, id: &TaskId) -> bool {
        self.try_cancel(id).is_ok()
    }

    /// Cancel a pending or processing task.
    ///
    /// A pending task never starts. A processing task is marked cancelled
    /// at once; its work unit keeps running, its result is discarded, and
    /// its slot frees up only when it returns.
    ///
    /// # Errors
    ///
    /// [`PdfBindError::TaskNotFound`] for an unknown id and
    /// [`PdfBindError::InvalidTransition`] for a finished task.
    pub fn try_cancel(&self, id: &TaskId) -> Result<()> {
        let was = {
            let mut state = self.inner.state.lock();
            let entry = state
                .entries
                .get_mut(id)
                .ok_or(PdfBindError::TaskNotFound { id: *id })?;

            let was = entry.task.status;
            entry.task.transition(TaskStatus::Cancelled)?;
            entry.task.error = Some(CANCELLED_MESSAGE.to_string());
            entry.work = None;

            if was == TaskStatus::Pending {
                state.pending.retain(|pending| pending != id);
            }
            was
        };

        info!(task_id = %id, was = %was, "task cancelled");
        self.inner.emit(id, QueueEvent::Cancelled);
        self.inner.pump();
        self.inner.finished.notify_waiters();
        Ok(())
    }

    /// Drop finished tasks from the table. Returns how many were removed.
    pub fn purge_finished(&self) -> usize {
        let mut state = self.inner.state.lock();
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.task.is_finished());
        let State {
            entries, admission, ..
        } = &mut *state;
        admission.retain(|id| entries.contains_key(id));
        let removed = before - state.entries.len();
        if removed > 0 {
            debug!(removed, "purged finished tasks");
        }
        removed
    }

    /// Register a listener for one kind of event.
    ///
    /// Listeners run on whichever thread produced the event, outside the
    /// queue's locks, so they may call back into the queue.
    pub fn on<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&TaskId, &QueueEvent) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(listener);
        self.inner.listeners.lock().add(kind, listener);
    }

    /// Wait until the task reaches a terminal status and return its final
    /// snapshot, or `None` if the id is unknown.
    pub async fn wait(&self, id: &TaskId) -> Option<ConversionTask> {
        loop {
            let notified = self.inner.finished.notified();
            let mut notified = std::pin::pin!(notified);
            notified.as_mut().enable();

            match self.status(id) {
                None => return None,
                Some(task) if task.is_finished() => return Some(task),
                Some(_) => {}
            }

            notified.await;
        }
    }

    /// Wait until every known task is finished and return all snapshots.
    pub async fn wait_all(&self) -> Vec<ConversionTask> {
        loop {
            let notified = self.inner.finished.notified();
            let mut notified = std::pin::pin!(notified);
            notified.as_mut().enable();

            let tasks = self.tasks();
            if tasks.iter().all(ConversionTask::is_finished) {
                return tasks;
            }

            notified.await;
        }
    }
}

impl std::fmt::Debug for ConversionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ConversionQueue")
            .field("max_concurrent", &self.inner.max_concurrent)
            .field("tasks", &state.entries.len())
            .field("pending", &state.pending.len())
            .field("running", &state.running)
            .finish()
    }
}

impl Inner {
    /// Start pending tasks in FIFO order while slots are free.
    fn pump(self: &Arc<Self>) {
        let started = {
            let mut state = self.state.lock();
            let mut started = Vec::new();

            while state.running < self.max_concurrent {
                let Some(id) = state.pending.pop_front() else {
                    break;
                };
                let Some(entry) = state.entries.get_mut(&id) else {
                    continue;
                };
                if entry.task.transition(TaskStatus::Processing).is_err() {
                    continue;
                }
                let Some(work) = entry.work.take() else {
                    continue;
                };
                state.running += 1;
                started.push((id, work));
            }
            started
        };

        for (id, work) in started {
            info!(task_id = %id, "task started");
            self.start(id, work);
        }
    }

    fn start(self: &Arc<Self>, id: TaskId, work: WorkUnit) {
        let reporter = ProgressReporter {
            inner: Arc::clone(self),
            id,
        };
        let inner = Arc::clone(self);

        // Building the future runs caller code too.
        let future = match catch_unwind(AssertUnwindSafe(|| work(reporter))) {
            Ok(future) => future,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                async move { Err(anyhow::anyhow!("work unit panicked: {message}")) }.boxed()
            }
        };

        self.runtime.spawn(async move {
            let outcome = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(payload) => Err(anyhow::anyhow!(
                    "work unit panicked: {}",
                    panic_message(payload.as_ref())
                )),
            };
            inner.finish(id, outcome);
        });
    }

    fn finish(self: &Arc<Self>, id: TaskId, outcome: anyhow::Result<PathBuf>) {
        let event = {
            let mut state = self.state.lock();
            state.running = state.running.saturating_sub(1);

            match state.entries.get_mut(&id) {
                Some(entry) if entry.task.status == TaskStatus::Processing => match outcome {
                    Ok(path) => {
                        if entry.task.transition(TaskStatus::Completed).is_ok() {
                            entry.task.progress = 100;
                            entry.task.result = Some(path.clone());
                        }
                        Some(QueueEvent::Completed { result: path })
                    }
                    Err(err) => {
                        let error = format!("{err:#}");
                        if entry.task.transition(TaskStatus::Failed).is_ok() {
                            entry.task.error = Some(error.clone());
                        }
                        Some(QueueEvent::Failed { error })
                    }
                },
                Some(entry) => {
                    debug!(task_id = %id, status = %entry.task.status, "discarding late result");
                    None
                }
                None => {
                    debug!(task_id = %id, "discarding result of purged task");
                    None
                }
            }
        };

        match &event {
            Some(QueueEvent::Completed { result }) => {
                info!(task_id = %id, result = %result.display(), "task completed");
            }
            Some(QueueEvent::Failed { error }) => {
                warn!(task_id = %id, error = %error, "task failed");
            }
            _ => {}
        }

        if let Some(event) = event {
            self.emit(&id, event);
        }
        self.pump();
        self.finished.notify_waiters();
    }

    fn report(&self, id: TaskId, progress: u8) -> bool {
        let accepted = {
            let mut state = self.state.lock();
            match state.entries.get_mut(&id) {
                Some(entry) if entry.task.status == TaskStatus::Processing => {
                    entry.task.progress = progress;
                    true
                }
                _ => false,
            }
        };

        if accepted {
            self.emit(&id, QueueEvent::Progress { progress });
        }
        accepted
    }

    fn emit(&self, id: &TaskId, event: QueueEvent) {
        let listeners = self.listeners.lock().for_kind(event.kind());
        dispatch(&listeners, id, &event);
    }
}
