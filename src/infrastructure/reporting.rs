//! Reporting scopes
//!
//! Human-facing run output goes through a [`Reporter`]. Each tool
//! invocation runs inside a labeled group; the concrete reporter decides
//! how a group is rendered.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Sink for grouped, human-facing run output
pub trait Reporter: Send + Sync {
    /// Prints an informational line
    fn info(&self, message: &str);

    /// Opens a labeled group
    fn start_group(&self, label: &str);

    /// Closes the innermost group
    fn end_group(&self);

    /// Reports the error that failed the run
    fn error(&self, message: &str);
}

/// Runs `f` inside a group labeled `label`
///
/// The group is closed whether `f` succeeds or fails.
///
/// # Errors
///
/// Returns whatever `f` returns.
pub fn group<T, E>(
    reporter: &dyn Reporter,
    label: &str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    reporter.start_group(label);
    let result = f();
    reporter.end_group();
    result
}

/// Plain console output for local runs
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn start_group(&self, label: &str) {
        println!("==> {label}");
    }

    fn end_group(&self) {}

    fn error(&self, message: &str) {
        eprintln!("Error: {message}");
    }
}

/// Event captured by [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "text")]
pub enum ReportEvent {
    /// An informational line
    Info(String),
    /// A group was opened
    GroupStarted(String),
    /// A group was closed
    GroupEnded,
    /// The run failed
    Error(String),
}

/// Reporter that records events instead of printing them
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    /// Creates an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    #[must_use]
    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().clone()
    }

    /// Labels of every group opened, in order
    #[must_use]
    pub fn group_labels(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ReportEvent::GroupStarted(label) => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    /// Non-empty informational lines, in order
    #[must_use]
    pub fn info_lines(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ReportEvent::Info(line) if !line.is_empty() => Some(line.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ReportEvent) {
        self.events.lock().push(event);
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push(ReportEvent::Info(message.to_string()));
    }

    fn start_group(&self, label: &str) {
        self.push(ReportEvent::GroupStarted(label.to_string()));
    }

    fn end_group(&self) {
        self.push(ReportEvent::GroupEnded);
    }

    fn error(&self, message: &str) {
        self.push(ReportEvent::Error(message.to_string()));
    }
}
