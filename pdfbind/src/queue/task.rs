//! Task identity, status and snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{PdfBindError, Result};

/// Opaque identifier assigned at admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TaskId {
    type Err = PdfBindError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| PdfBindError::other(format!("Invalid task id '{s}': {e}")))
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Admitted, waiting for a slot.
    Pending,
    /// Work unit running.
    Processing,
    /// Finished with a result.
    Completed,
    /// Finished with an error.
    Failed,
    /// Cancelled by the caller.
    Cancelled,
}

impl TaskStatus {
    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Cancelled)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
                | (Self::Processing, Self::Cancelled)
        )
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionTask {
    /// Task id.
    pub id: TaskId,
    /// Current status.
    pub status: TaskStatus,
    /// Progress in percent.
    pub progress: u8,
    /// Output location, set once completed.
    pub result: Option<PathBuf>,
    /// Error message, set once failed or cancelled.
    pub error: Option<String>,
    /// Priority given at admission. Recorded only; scheduling is FIFO.
    pub priority: i32,
    /// Admission time.
    pub created_at: DateTime<Utc>,
    /// Time the terminal status was reached.
    pub completed_at: Option<DateTime<Utc>>,
}

impl ConversionTask {
    pub(crate) fn new(id: TaskId, priority: i32) -> Self {
        Self {
            id,
            status: TaskStatus::Pending,
            progress: 0,
            result: None,
            error: None,
            priority,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Move to `next`, stamping the completion time on terminal states.
    ///
    /// # Errors
    ///
    /// Returns [`PdfBindError::InvalidTransition`] if the move is illegal;
    /// the task is left unchanged.
    pub(crate) fn transition(&mut self, next: TaskStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(PdfBindError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Whether the task has reached a terminal status.
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
