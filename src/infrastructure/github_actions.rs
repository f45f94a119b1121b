//! GitHub Actions reporter
//!
//! Renders reporting scopes as workflow commands so the runner folds each
//! tool invocation into a collapsible group.

use super::reporting::Reporter;

/// Reporter emitting GitHub Actions workflow commands on stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubActionsReporter;

impl GitHubActionsReporter {
    /// Creates a new GitHub Actions reporter
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns true when running inside a GitHub Actions job
    #[must_use]
    pub fn detected() -> bool {
        std::env::var("GITHUB_ACTIONS").is_ok_and(|value| value == "true")
    }
}

impl Reporter for GitHubActionsReporter {
    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn start_group(&self, label: &str) {
        println!("{}", workflow_command("group", label));
    }

    fn end_group(&self) {
        println!("::endgroup::");
    }

    fn error(&self, message: &str) {
        println!("{}", workflow_command("error", message));
    }
}

/// Formats `::<command>::<data>` with the data escaped
#[must_use]
pub fn workflow_command(command: &str, data: &str) -> String {
    format!("::{command}::{}", escape_data(data))
}

/// Escapes characters that would terminate a workflow command early
fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
