//! # dotnet-ci - A CI pipeline for .NET repositories
//!
//! Discovers a solution and its test and packaging projects by glob
//! pattern, then drives the `dotnet` CLI through a fixed sequence of
//! phases:
//!
//! 1. restore the solution into a local package cache
//! 2. build the solution
//! 3. run every unit test project
//! 4. publish every integration test project
//! 5. pack every packaging project
//!
//! The first failure stops the run. Progress is reported through a
//! [`Reporter`](infrastructure::Reporter), which renders collapsible groups
//! when running on GitHub Actions.
//!
//! ## Quick Start
//!
//! ```no_run
//! use dotnet_ci::{Config, GitHubActionsReporter, GlobMatcher, PipelineOrchestrator, ProcessRunner};
//! use std::sync::Arc;
//!
//! let config = Config::from_env();
//! let root = config.resolve_working_directory()?;
//! let orchestrator = PipelineOrchestrator::new(
//!     config.patterns(),
//!     config.build_configuration(),
//!     Arc::new(GlobMatcher::new(root.clone())),
//!     Arc::new(ProcessRunner::new(config.dotnet_path.clone()).with_cwd(root)),
//!     Arc::new(GitHubActionsReporter::new()),
//! );
//!
//! let report = orchestrator.run();
//! assert!(report.is_success());
//! # Ok::<(), dotnet_ci::PipelineError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod executor;
pub mod infrastructure;
pub mod pipeline;

// Re-export commonly used types
pub use executor::{DotnetCli, DotnetCommand, ProcessRunner, ToolOutput, ToolRunner};
pub use infrastructure::{
    Config, ConsoleReporter, EnvironmentBootstrap, GitHubActionsReporter, Reporter, init_logging,
};
pub use pipeline::{
    BuildConfiguration, DiscoveredProjects, DiscoveryError, DiscoveryPatterns, GlobMatcher,
    PatternMatcher, Phase, PipelineError, PipelineOrchestrator, PipelineState, PlannedStep,
    ProjectReference, Role, RunReport, RunStatus,
};

/// Version of the dotnet-ci crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
