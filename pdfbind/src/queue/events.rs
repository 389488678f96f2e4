//! Queue notifications.
//!
//! Listeners are registered per [`EventKind`] and called outside the
//! queue's locks. A panicking listener is logged and skipped; it cannot
//! affect other listeners or the scheduler.

use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use super::task::TaskId;

/// Kinds of queue events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A running task reported progress.
    Progress,
    /// A task finished with a result.
    Completed,
    /// A task finished with an error.
    Failed,
    /// A task was cancelled.
    Cancelled,
}

/// Payload delivered to listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QueueEvent {
    /// Progress update in percent.
    Progress {
        /// New progress value.
        progress: u8,
    },
    /// Output location of a completed task.
    Completed {
        /// Where the result was written.
        result: PathBuf,
    },
    /// Error message of a failed task.
    Failed {
        /// Human-readable failure.
        error: String,
    },
    /// The task was cancelled.
    Cancelled,
}

impl QueueEvent {
    /// Kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Progress { .. } => EventKind::Progress,
            Self::Completed { .. } => EventKind::Completed,
            Self::Failed { .. } => EventKind::Failed,
            Self::Cancelled => EventKind::Cancelled,
        }
    }
}

/// A registered callback.
pub type Listener = Arc<dyn Fn(&TaskId, &QueueEvent) + Send + Sync>;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: HashMap<EventKind, Vec<Listener>>,
}

impl ListenerRegistry {
    pub(crate) fn add(&mut self, kind: EventKind, listener: Listener) {
        self.listeners.entry(kind).or_default().push(listener);
    }

    pub(crate) fn for_kind(&self, kind: EventKind) -> Vec<Listener> {
        self.listeners.get(&kind).cloned().unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }
}

/// Call every listener, isolating panics.
pub(crate) fn dispatch(listeners: &[Listener], id: &TaskId, event: &QueueEvent) {
    for listener in listeners {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener(id, event))) {
            warn!(
                task_id = %id,
                kind = ?event.kind(),
                panic = %panic_message(payload.as_ref()),
                "queue listener panicked"
            );
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
