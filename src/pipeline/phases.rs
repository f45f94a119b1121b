//! Pipeline phases
//!
//! The phase order is data: [`Phase::ALL`] lists the phases in execution
//! order, and each phase knows which project set it iterates and which
//! `dotnet` command it issues for a project.

use super::types::{BuildConfiguration, DiscoveredProjects, ProjectReference, Role};
use crate::executor::{
    BuildOptions, DotnetCommand, PackOptions, PublishOptions, RestoreOptions, TestOptions,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Local package cache used by restore
pub const PACKAGES_DIR: &str = "packages";

/// Test logger format
pub const TEST_LOGGER: &str = "trx";

/// Directory receiving test result files
pub const TEST_RESULTS_DIR: &str = "TestResults";

/// Shared output directory for packages
pub const ARTIFACTS_DIR: &str = "artifacts";

/// Root of the per-project publish output for integration tests
pub const TEST_ARTIFACTS_DIR: &str = "artifacts/tests";

/// One ordered step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Restore the solution's dependencies
    Restore,
    /// Build the solution
    Build,
    /// Run each unit test project
    UnitTest,
    /// Publish each integration test project
    IntegrationPublish,
    /// Pack each packaging project
    Pack,
}

impl Phase {
    /// Phases in execution order
    pub const ALL: [Phase; 5] = [
        Phase::Restore,
        Phase::Build,
        Phase::UnitTest,
        Phase::IntegrationPublish,
        Phase::Pack,
    ];

    /// Phase name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Restore => "restore",
            Self::Build => "build",
            Self::UnitTest => "unit-test",
            Self::IntegrationPublish => "integration-publish",
            Self::Pack => "pack",
        }
    }

    /// Role whose discovery set this phase iterates
    #[must_use]
    pub fn role(self) -> Role {
        match self {
            Self::Restore | Self::Build => Role::Solution,
            Self::UnitTest => Role::UnitTestProject,
            Self::IntegrationPublish => Role::IntegrationTestProject,
            Self::Pack => Role::PackagingProject,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::Restore => "Restoring",
            Self::Build => "Building",
            Self::UnitTest => "Testing",
            Self::IntegrationPublish => "Publishing",
            Self::Pack => "Packing",
        }
    }

    /// Label of the reporting scope wrapping the step for `project`
    #[must_use]
    pub fn label(self, project: &ProjectReference) -> String {
        format!("{} \"{}\"...", self.verb(), project)
    }

    /// Command this phase issues for `project`
    #[must_use]
    pub fn command(self, project: &ProjectReference, build: &BuildConfiguration) -> DotnetCommand {
        let configuration = build.name().map(str::to_string);
        let project_arg = project.as_arg();

        match self {
            Self::Restore => DotnetCommand::Restore {
                project: project_arg,
                options: RestoreOptions {
                    packages: Some(PACKAGES_DIR.to_string()),
                },
            },
            Self::Build => DotnetCommand::Build {
                project: project_arg,
                options: BuildOptions { configuration },
            },
            Self::UnitTest => DotnetCommand::Test {
                project: project_arg,
                options: TestOptions {
                    configuration,
                    logger: Some(TEST_LOGGER.to_string()),
                    results_directory: Some(TEST_RESULTS_DIR.to_string()),
                },
            },
            Self::IntegrationPublish => DotnetCommand::Publish {
                project: project_arg,
                options: PublishOptions {
                    configuration,
                    output: Some(publish_output(project)),
                },
            },
            Self::Pack => DotnetCommand::Pack {
                project: project_arg,
                options: PackOptions {
                    configuration,
                    output: Some(ARTIFACTS_DIR.to_string()),
                    include_symbols: build.include_symbols,
                },
            },
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Publish output directory for an integration test project
#[must_use]
pub fn publish_output(project: &ProjectReference) -> String {
    Path::new(TEST_ARTIFACTS_DIR)
        .join(project.name())
        .to_string_lossy()
        .into_owned()
}

/// A step the pipeline will execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedStep {
    /// Phase the step belongs to
    pub phase: Phase,
    /// Project the step runs on
    pub project: ProjectReference,
    /// Reporting scope label
    pub label: String,
    /// Command to run
    pub command: DotnetCommand,
}

impl PlannedStep {
    /// Argument list of the command
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        self.command.args()
    }
}

/// Every step of a run, in execution order
#[must_use]
pub fn plan(discovered: &DiscoveredProjects, build: &BuildConfiguration) -> Vec<PlannedStep> {
    Phase::ALL
        .iter()
        .flat_map(|&phase| {
            discovered
                .for_role(phase.role())
                .iter()
                .map(move |project| PlannedStep {
                    phase,
                    project: project.clone(),
                    label: phase.label(project),
                    command: phase.command(project, build),
                })
        })
        .collect()
}
