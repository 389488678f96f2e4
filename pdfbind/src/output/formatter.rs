//! User-facing messages with quiet and verbose modes.
//!
//! Messages are rendered to strings first and printed second, so the
//! rendering can be tested without a terminal.

use std::io::IsTerminal;
use std::path::Path;

use crate::config::MergeConfig;
use crate::convert::{FormatKind, Strategy};
use crate::queue::{ConversionTask, QueueEvent, TaskId, TaskStatus};

/// Level of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Plain information.
    Info,
    /// Something finished well.
    Success,
    /// Something was skipped or degraded.
    Warning,
    /// Something failed.
    Error,
    /// Verbose detail.
    Debug,
}

impl MessageLevel {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Error => "✗ ",
            Self::Debug => "→ ",
        }
    }

    fn color(&self) -> Option<&'static str> {
        match self {
            Self::Info => None,
            Self::Success => Some("\x1b[32m"),
            Self::Warning => Some("\x1b[33m"),
            Self::Error => Some("\x1b[31m"),
            Self::Debug => Some("\x1b[36m"),
        }
    }
}

/// Prints messages according to quiet/verbose settings.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl OutputFormatter {
    /// Create a formatter. Color is used only on a terminal with `TERM` set.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: std::io::stdout().is_terminal() && std::env::var_os("TERM").is_some(),
        }
    }

    /// Formatter for a merge run.
    pub fn from_config(config: &MergeConfig) -> Self {
        Self::new(!config.should_print(), config.verbose)
    }

    /// Disable color regardless of the terminal.
    pub fn plain(mut self) -> Self {
        self.colored = false;
        self
    }

    /// Whether informational output is suppressed.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Whether verbose output is shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Whether a message of `level` would be printed.
    pub fn shows(&self, level: MessageLevel) -> bool {
        match level {
            MessageLevel::Info | MessageLevel::Success => !self.quiet,
            MessageLevel::Warning | MessageLevel::Error => true,
            MessageLevel::Debug => self.verbose && !self.quiet,
        }
    }

    /// Render `message` with the prefix and color for `level`.
    pub fn render(&self, level: MessageLevel, message: &str) -> String {
        let prefix = level.prefix();
        match level.color() {
            Some(color) if self.colored => format!("{color}{prefix}{message}\x1b[0m"),
            _ => format!("{prefix}{message}"),
        }
    }

    /// Print `message` at `level` if the mode allows it.
    pub fn emit(&self, level: MessageLevel, message: &str) {
        if !self.shows(level) {
            return;
        }
        let line = self.render(level, message);
        match level {
            MessageLevel::Warning | MessageLevel::Error => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }

    /// Informational message.
    pub fn info(&self, message: &str) {
        self.emit(MessageLevel::Info, message);
    }

    /// Success message.
    pub fn success(&self, message: &str) {
        self.emit(MessageLevel::Success, message);
    }

    /// Warning, shown even in quiet mode.
    pub fn warning(&self, message: &str) {
        self.emit(MessageLevel::Warning, message);
    }

    /// Error, always shown.
    pub fn error(&self, message: &str) {
        self.emit(MessageLevel::Error, message);
    }

    /// Verbose-only detail.
    pub fn debug(&self, message: &str) {
        self.emit(MessageLevel::Debug, message);
    }

    /// Verbose-only `label: value` line.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose && !self.quiet {
            println!("  {label}: {value}");
        }
    }

    /// Numbered list entry.
    pub fn list_item(&self, index: usize, message: &str) {
        if !self.quiet {
            println!("  {index}. {message}");
        }
    }
}

/// Level matching a task's status.
pub fn level_for(status: TaskStatus) -> MessageLevel {
    match status {
        TaskStatus::Completed => MessageLevel::Success,
        TaskStatus::Failed => MessageLevel::Error,
        TaskStatus::Cancelled => MessageLevel::Warning,
        TaskStatus::Pending | TaskStatus::Processing => MessageLevel::Info,
    }
}

/// One line describing a task snapshot for `input`.
pub fn task_line(input: &Path, task: &ConversionTask) -> String {
    let name = input.display();
    match task.status {
        TaskStatus::Completed => match &task.result {
            Some(result) => format!("{name} -> {}", result.display()),
            None => format!("{name}: completed"),
        },
        TaskStatus::Failed | TaskStatus::Cancelled => format!(
            "{name}: {} ({})",
            task.status,
            task.error.as_deref().unwrap_or("no message")
        ),
        TaskStatus::Pending | TaskStatus::Processing => {
            format!("{name}: {} {}%", task.status, task.progress)
        }
    }
}

/// One line describing a queue event, labelled with `name`.
pub fn event_line(name: &str, id: &TaskId, event: &QueueEvent) -> String {
    let short = id.to_string();
    let short = short.get(..8).unwrap_or(&short);
    match event {
        QueueEvent::Progress { progress } => format!("[{short}] {name} {progress}%"),
        QueueEvent::Completed { result } => format!("[{short}] {name} done: {}", result.display()),
        QueueEvent::Failed { error } => format!("[{short}] {name} failed: {error}"),
        QueueEvent::Cancelled => format!("[{short}] {name} cancelled"),
    }
}

/// Routing table as aligned text rows.
pub fn format_table(pairs: &[(FormatKind, FormatKind, Strategy)]) -> Vec<String> {
    let mut rows = vec![format!("{:<8} {:<8} {}", "FROM", "TO", "STRATEGY")];
    rows.extend(pairs.iter().map(|(source, target, strategy)| {
        format!("{:<8} {:<8} {strategy}", source.to_string(), target.to_string())
    }));
    rows
}
