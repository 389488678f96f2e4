//! Conversion task queue.
//!
//! [`ConversionQueue`] accepts deferred work units, runs at most
//! `max_concurrent` of them at once in admission order, and tracks each
//! one through `pending -> processing -> completed | failed`, with
//! `cancelled` reachable from both non-terminal states.
//!
//! # Examples
//!
//! ```no_run
//! use pdfbind::config::QueueConfig;
//! use pdfbind::queue::{ConversionQueue, EventKind};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = ConversionQueue::new(QueueConfig::default())?;
//! queue.on(EventKind::Completed, |id, event| println!("{id}: {event:?}"));
//!
//! let id = queue.submit(|progress| async move {
//!     progress.report(50);
//!     Ok(PathBuf::from("outputs/report.pdf"))
//! });
//!
//! let task = queue.wait(&id).await;
//! # Ok(())
//! # }
//! ```

pub mod events;
pub mod scheduler;
pub mod task;

pub use events::{EventKind, Listener, QueueEvent};
pub use scheduler::{
    CANCELLED_MESSAGE, ConversionQueue, ProgressReporter, WorkFuture, WorkUnit,
};
pub use task::{ConversionTask, TaskId, TaskStatus};
