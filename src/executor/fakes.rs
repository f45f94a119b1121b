//! In-memory [`ToolRunner`] for tests
//!
//! Records every argument list instead of spawning a process.

use super::traits::{ToolOutput, ToolRunner};
use crate::pipeline::PipelineError;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Runner that records invocations and answers from canned responses
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Vec<String>>>,
    stdout: HashMap<String, String>,
    failures: HashMap<String, i32>,
}

impl RecordingRunner {
    /// Creates a runner where every invocation succeeds with empty output
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers invocations whose first argument is `subcommand` with `stdout`
    #[must_use]
    pub fn with_stdout(mut self, subcommand: &str, stdout: &str) -> Self {
        self.stdout.insert(subcommand.to_string(), stdout.to_string());
        self
    }

    /// Fails invocations whose first argument is `subcommand` with `code`
    #[must_use]
    pub fn fail_on(mut self, subcommand: &str, code: i32) -> Self {
        self.failures.insert(subcommand.to_string(), code);
        self
    }

    /// Every argument list received, in order
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    /// First argument of every invocation, in order
    #[must_use]
    pub fn subcommands(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|args| args.first().cloned())
            .collect()
    }

    fn respond(&self, args: &[String]) -> Result<ToolOutput, PipelineError> {
        self.calls.lock().push(args.to_vec());

        let subcommand = args.first().map(String::as_str).unwrap_or_default();
        if let Some(&code) = self.failures.get(subcommand) {
            let mut command = vec!["dotnet".to_string()];
            command.extend_from_slice(args);
            return Err(PipelineError::ExternalTool {
                command: shell_words::join(command),
                code,
            });
        }

        Ok(ToolOutput::success(
            self.stdout.get(subcommand).cloned().unwrap_or_default(),
        ))
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&self, args: &[String]) -> Result<ToolOutput, PipelineError> {
        self.respond(args)
    }

    fn capture(&self, args: &[String]) -> Result<ToolOutput, PipelineError> {
        self.respond(args)
    }
}
