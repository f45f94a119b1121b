//! Process execution
//!
//! [`ProcessRunner`] spawns the real build tool. Streaming invocations echo
//! every line as it arrives while also capturing it; captured invocations
//! stay silent.

use super::traits::{ToolOutput, ToolRunner};
use crate::pipeline::PipelineError;
use std::collections::HashMap;
use std::io::{self, BufRead, Read};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::Instant;

/// Process runner configuration
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Program to execute
    pub program: String,

    /// Working directory
    pub cwd: PathBuf,

    /// Extra environment variables
    pub env: HashMap<String, String>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            program: "dotnet".to_string(),
            cwd: std::env::current_dir().unwrap_or_default(),
            env: HashMap::new(),
        }
    }
}

/// [`ToolRunner`] spawning a child process per invocation
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    config: ProcessConfig,
}

impl ProcessRunner {
    /// Creates a runner for `program`
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            config: ProcessConfig {
                program: program.into(),
                ..ProcessConfig::default()
            },
        }
    }

    /// Sets the working directory
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.config.cwd = cwd.into();
        self
    }

    /// Adds an environment variable
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.env.insert(key.into(), value.into());
        self
    }

    /// Runner configuration
    #[must_use]
    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// Renders the full command line for logs and error messages
    #[must_use]
    pub fn render(&self, args: &[String]) -> String {
        let words = std::iter::once(self.config.program.as_str())
            .chain(args.iter().map(String::as_str));
        shell_words::join(words)
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(args);
        cmd.current_dir(&self.config.cwd);
        cmd.envs(&self.config.env);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    fn spawn_error(&self, err: &io::Error) -> PipelineError {
        PipelineError::Spawn {
            program: self.config.program.clone(),
            message: err.to_string(),
        }
    }

    fn finish(
        &self,
        args: &[String],
        status: ExitStatus,
        stdout: String,
        stderr: String,
        started: Instant,
    ) -> Result<ToolOutput, PipelineError> {
        let exit_code = status.code().unwrap_or(-1);
        let duration = started.elapsed();

        tracing::debug!(
            command = %self.render(args),
            exit_code,
            duration_ms = duration.as_millis(),
            "Process finished"
        );

        if exit_code != 0 {
            return Err(PipelineError::ExternalTool {
                command: self.render(args),
                code: exit_code,
            });
        }

        Ok(ToolOutput {
            stdout,
            stderr,
            exit_code,
            duration,
        })
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, args: &[String]) -> Result<ToolOutput, PipelineError> {
        tracing::debug!(command = %self.render(args), cwd = %self.config.cwd.display(), "Running");
        let started = Instant::now();

        let mut child = self
            .command(args)
            .spawn()
            .map_err(|e| self.spawn_error(&e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| PipelineError::Io("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| PipelineError::Io("stderr was not captured".to_string()))?;

        let stdout_thread = forward_lines(stdout, |line: &str| println!("{line}"));
        let stderr_thread = forward_lines(stderr, |line: &str| eprintln!("{line}"));

        let status = child.wait()?;
        let stdout = stdout_thread.join().unwrap_or_default();
        let stderr = stderr_thread.join().unwrap_or_default();

        self.finish(args, status, stdout, stderr, started)
    }

    fn capture(&self, args: &[String]) -> Result<ToolOutput, PipelineError> {
        tracing::debug!(command = %self.render(args), "Capturing");
        let started = Instant::now();

        let output = self
            .command(args)
            .output()
            .map_err(|e| self.spawn_error(&e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        self.finish(args, output.status, stdout, stderr, started)
    }
}

/// Echoes each line of `pipe` through `echo` and returns everything read
fn forward_lines<R>(pipe: R, echo: fn(&str)) -> JoinHandle<String>
where
    R: Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut reader = io::BufReader::new(pipe);
        let mut captured = String::new();
        let mut raw = Vec::new();
        // Read to EOF so the child never writes into a closed pipe.
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw) {
                Ok(0) => break,
                Ok(_) => {
                    let decoded = String::from_utf8_lossy(&raw);
                    let line = decoded.trim_end_matches(['\n', '\r']);
                    echo(line);
                    captured.push_str(line);
                    captured.push('\n');
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Output pipe read failed");
                    break;
                }
            }
        }
        captured
    })
}
