//! Infrastructure layer
//!
//! This module contains configuration, logging, reporting and the
//! first-run bootstrap.

mod bootstrap;
mod config;
mod github_actions;
mod logging;
mod reporting;

pub use bootstrap::{EnvironmentBootstrap, SENTINEL_DIR, SENTINEL_SUFFIX};
pub use config::{Config, parse_flag};
pub use github_actions::{GitHubActionsReporter, workflow_command};
pub use logging::init_logging;
pub use reporting::{ConsoleReporter, RecordingReporter, ReportEvent, Reporter, group};
