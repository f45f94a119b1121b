//! Tool execution traits
//!
//! The pipeline never spawns processes directly; it goes through a
//! [`ToolRunner`] so tests can substitute a recording fake.

use crate::pipeline::PipelineError;
use std::time::Duration;

/// Runs the external build tool with a prepared argument list
pub trait ToolRunner: Send + Sync {
    /// Runs the tool, streaming its output to the console
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ExternalTool`] on a non-zero exit status and
    /// [`PipelineError::Spawn`] if the process cannot be started.
    fn run(&self, args: &[String]) -> Result<ToolOutput, PipelineError>;

    /// Runs the tool silently and captures its output
    ///
    /// # Errors
    ///
    /// Same as [`ToolRunner::run`].
    fn capture(&self, args: &[String]) -> Result<ToolOutput, PipelineError>;
}

/// Output of a finished tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Standard output
    pub stdout: String,

    /// Standard error
    pub stderr: String,

    /// Exit code
    pub exit_code: i32,

    /// Duration of execution
    pub duration: Duration,
}

impl ToolOutput {
    /// Output of a successful invocation that printed `stdout`
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    /// Returns true if the tool exited with code 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

impl<T: ToolRunner + ?Sized> ToolRunner for std::sync::Arc<T> {
    fn run(&self, args: &[String]) -> Result<ToolOutput, PipelineError> {
        (**self).run(args)
    }

    fn capture(&self, args: &[String]) -> Result<ToolOutput, PipelineError> {
        (**self).capture(args)
    }
}
