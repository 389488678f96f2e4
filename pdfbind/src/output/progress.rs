//! Progress display for queued conversions.
//!
//! A [`ProgressBoard`] follows several tasks at once and renders either a
//! single redrawn status line (on a terminal) or nothing at all, leaving
//! per-event lines to the caller.

use std::collections::HashMap;
use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use crate::queue::{QueueEvent, TaskId};

const BAR_WIDTH: usize = 20;

/// Render `percent` as `[=====>    ]`.
pub fn progress_bar(percent: u8, width: usize) -> String {
    let percent = usize::from(percent.min(100));
    let filled = width * percent / 100;
    let head = if filled > 0 && filled < width { ">" } else { "" };
    let body = if head.is_empty() { filled } else { filled - 1 };
    format!(
        "[{}{head}{}]",
        "=".repeat(body),
        " ".repeat(width - body - head.len())
    )
}

/// Format a duration as `30s`, `1m 30s` or `1h 1m`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[derive(Debug, Clone)]
struct Row {
    label: String,
    percent: u8,
    finished: bool,
}

/// Progress of a set of tasks.
#[derive(Debug)]
pub struct ProgressBoard {
    rows: HashMap<TaskId, Row>,
    order: Vec<TaskId>,
    started: Instant,
    live: bool,
}

impl ProgressBoard {
    /// Board that redraws a status line when stdout is a terminal.
    pub fn new() -> Self {
        Self::with_live(io::stdout().is_terminal())
    }

    /// Board that never draws.
    pub fn hidden() -> Self {
        Self::with_live(false)
    }

    fn with_live(live: bool) -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
            started: Instant::now(),
            live,
        }
    }

    /// Whether the board draws to the terminal.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Start following `id` under `label`.
    ///
    /// If events for `id` already arrived, its row keeps their state and
    /// only takes the new label.
    pub fn track(&mut self, id: TaskId, label: impl Into<String>) {
        let label = label.into();
        match self.rows.get_mut(&id) {
            Some(row) => row.label = label,
            None => self.insert_row(id, label),
        }
    }

    fn insert_row(&mut self, id: TaskId, label: String) {
        self.order.push(id);
        self.rows.insert(
            id,
            Row {
                label,
                percent: 0,
                finished: false,
            },
        );
    }

    /// Label of a followed task.
    pub fn label(&self, id: &TaskId) -> Option<&str> {
        self.rows.get(id).map(|row| row.label.as_str())
    }

    /// Apply a queue event.
    ///
    /// An id seen for the first time gets a row labelled with the id, to be
    /// renamed by a later [`track`](Self::track).
    pub fn apply(&mut self, id: &TaskId, event: &QueueEvent) {
        if !self.rows.contains_key(id) {
            self.insert_row(*id, id.to_string());
        }
        let Some(row) = self.rows.get_mut(id) else {
            return;
        };
        match event {
            QueueEvent::Progress { progress } => row.percent = *progress,
            QueueEvent::Completed { .. } => {
                row.percent = 100;
                row.finished = true;
            }
            QueueEvent::Failed { .. } | QueueEvent::Cancelled => row.finished = true,
        }
        self.redraw();
    }

    /// `(finished, total)` task counts.
    pub fn counts(&self) -> (usize, usize) {
        let finished = self.rows.values().filter(|row| row.finished).count();
        (finished, self.rows.len())
    }

    /// Average progress over all followed tasks.
    pub fn overall_percent(&self) -> u8 {
        if self.rows.is_empty() {
            return 0;
        }
        let sum: usize = self.rows.values().map(|row| usize::from(row.percent)).sum();
        (sum / self.rows.len()) as u8
    }

    /// The status line: overall bar, counts, elapsed time and the first
    /// unfinished task.
    pub fn status_line(&self) -> String {
        let (finished, total) = self.counts();
        let percent = self.overall_percent();
        let mut line = format!(
            "{} {percent:>3}% {finished}/{total} {}",
            progress_bar(percent, BAR_WIDTH),
            format_duration(self.started.elapsed())
        );

        let current = self
            .order
            .iter()
            .filter_map(|id| self.rows.get(id))
            .find(|row| !row.finished);
        if let Some(row) = current {
            line.push_str(&format!(" {}", row.label));
        }
        line
    }

    fn redraw(&self) {
        if self.live {
            print!("\r\x1b[K{}", self.status_line());
            io::stdout().flush().ok();
        }
    }

    /// Leave the status line in place and move to a fresh line.
    pub fn finish(&self) {
        if self.live {
            println!();
        }
    }
}

impl Default for ProgressBoard {
    fn default() -> Self {
        Self::new()
    }
}
