//! Core pipeline types
//!
//! Roles, cardinality policies and the immutable values produced by
//! discovery and consumed by the phases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::errors::PipelineError;
use super::phases::Phase;

/// Functional category a discovered project plays in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The single solution that is restored and built
    Solution,
    /// A project whose tests run in the unit test phase
    UnitTestProject,
    /// A project published for later integration testing
    IntegrationTestProject,
    /// A project packed into a NuGet package
    PackagingProject,
}

impl Role {
    /// All roles in discovery order
    pub const ALL: [Role; 4] = [
        Role::Solution,
        Role::UnitTestProject,
        Role::IntegrationTestProject,
        Role::PackagingProject,
    ];

    /// Cardinality policy enforced when discovering this role
    #[must_use]
    pub fn policy(self) -> Cardinality {
        match self {
            Self::Solution => Cardinality::ExactlyOne,
            Self::PackagingProject => Cardinality::AtLeastOne,
            Self::UnitTestProject | Self::IntegrationTestProject => Cardinality::ZeroOrMore,
        }
    }

    /// Configuration input holding the pattern for this role
    #[must_use]
    pub fn input_name(self) -> &'static str {
        match self {
            Self::Solution => "SOLUTION",
            Self::UnitTestProject => "PROJECTS_TO_UNIT_TESTING",
            Self::IntegrationTestProject => "PROJECTS_TO_INTEGRATION_TESTING",
            Self::PackagingProject => "PROJECTS_TO_PACKING",
        }
    }

    /// What the discovered files are used for, as printed in listings
    #[must_use]
    pub fn purpose(self) -> &'static str {
        match self {
            Self::Solution => "restoring and building",
            Self::UnitTestProject => "unit testing",
            Self::IntegrationTestProject => "integration testing",
            Self::PackagingProject => "packing",
        }
    }

    /// Singular or plural noun for this role's files
    #[must_use]
    pub fn noun(self, plural: bool) -> &'static str {
        match (self, plural) {
            (Self::Solution, false) => "solution",
            (Self::Solution, true) => "solutions",
            (_, false) => "project",
            (_, true) => "projects",
        }
    }

    /// Header line of the discovery listing for `count` matches
    #[must_use]
    pub fn listing_header(self, count: usize) -> String {
        format!("{} to {}:", capitalize(self.noun(count > 1)), self.purpose())
    }

    /// Message used when nothing matched
    #[must_use]
    pub fn none_found_message(self) -> String {
        // Only the solution is named in the singular here.
        let plural = !matches!(self, Self::Solution);
        format!("No {} to {} found.", self.noun(plural), self.purpose())
    }

    /// Message used when more than one file matched
    #[must_use]
    pub fn multiple_found_message(self) -> String {
        format!("Multiple {} to {} found.", self.noun(true), self.purpose())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solution => write!(f, "solution"),
            Self::UnitTestProject => write!(f, "unit test project"),
            Self::IntegrationTestProject => write!(f, "integration test project"),
            Self::PackagingProject => write!(f, "packaging project"),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// How many matches a discovery step may yield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// Exactly one match is required
    ExactlyOne,
    /// One or more matches are required
    AtLeastOne,
    /// Any number of matches, including none
    ZeroOrMore,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactlyOne => write!(f, "exactly one"),
            Self::AtLeastOne => write!(f, "at least one"),
            Self::ZeroOrMore => write!(f, "zero or more"),
        }
    }
}

/// A discovered file tagged with its role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectReference {
    path: PathBuf,
    role: Role,
}

impl ProjectReference {
    /// Creates a reference from an already normalized relative path
    pub fn new(path: impl Into<PathBuf>, role: Role) -> Self {
        Self {
            path: path.into(),
            role,
        }
    }

    /// Normalized path relative to the working directory
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Role this project plays
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// File name without its extension, e.g. `Tests.Integration` for
    /// `test/Tests.Integration.csproj`
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path as passed on the tool command line
    #[must_use]
    pub fn as_arg(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl fmt::Display for ProjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Projects sharing one role, validated against its cardinality policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySet {
    role: Role,
    policy: Cardinality,
    projects: Vec<ProjectReference>,
}

impl DiscoverySet {
    pub(crate) fn new(role: Role, policy: Cardinality, projects: Vec<ProjectReference>) -> Self {
        Self {
            role,
            policy,
            projects,
        }
    }

    /// Role shared by every member
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Policy the set was validated against
    #[must_use]
    pub fn policy(&self) -> Cardinality {
        self.policy
    }

    /// Members in match order
    #[must_use]
    pub fn projects(&self) -> &[ProjectReference] {
        &self.projects
    }

    /// Number of members
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Returns true if nothing was discovered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Iterates over members in match order
    pub fn iter(&self) -> std::slice::Iter<'_, ProjectReference> {
        self.projects.iter()
    }
}

impl<'a> IntoIterator for &'a DiscoverySet {
    type Item = &'a ProjectReference;
    type IntoIter = std::slice::Iter<'a, ProjectReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.projects.iter()
    }
}

/// Result of the discovery step: one set per role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredProjects {
    /// The solution (always exactly one member)
    pub solution: DiscoverySet,
    /// Unit test projects
    pub unit_tests: DiscoverySet,
    /// Integration test projects
    pub integration_tests: DiscoverySet,
    /// Packaging projects (at least one member)
    pub packages: DiscoverySet,
}

impl DiscoveredProjects {
    /// Returns the set discovered for `role`
    #[must_use]
    pub fn for_role(&self, role: Role) -> &DiscoverySet {
        match role {
            Role::Solution => &self.solution,
            Role::UnitTestProject => &self.unit_tests,
            Role::IntegrationTestProject => &self.integration_tests,
            Role::PackagingProject => &self.packages,
        }
    }
}

/// Build settings supplied once per run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    /// Configuration name, e.g. `Release`; empty means the tool default
    pub name: String,
    /// Produce symbol packages when packing
    pub include_symbols: bool,
}

impl BuildConfiguration {
    /// Creates a build configuration
    pub fn new(name: impl Into<String>, include_symbols: bool) -> Self {
        Self {
            name: name.into(),
            include_symbols,
        }
    }

    /// Configuration name, or `None` when the tool default applies
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }
}

/// States a pipeline run moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Writing the first-use sentinel
    Bootstrap,
    /// Resolving every project set
    DiscoverAll,
    /// Executing a phase
    Phase(Phase),
    /// All phases completed
    Done,
    /// Stopped at the first error
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bootstrap => write!(f, "bootstrap"),
            Self::DiscoverAll => write!(f, "discover"),
            Self::Phase(phase) => write!(f, "{phase}"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Whether a single phase step succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum StepResult {
    /// The invocation succeeded
    Success,
    /// The invocation failed
    Failure {
        /// Error message
        message: String,
    },
}

/// Outcome of one phase step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOutcome {
    /// Phase the step belongs to
    pub phase: Phase,
    /// Project the step ran on
    pub project: Option<ProjectReference>,
    /// Success or failure
    pub result: StepResult,
    /// Wall time of the step
    pub duration: Duration,
}

impl PhaseOutcome {
    /// Returns true if the step succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.result, StepResult::Success)
    }
}

/// Terminal status of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunStatus {
    /// Every phase completed
    Done,
    /// The run stopped at the first error
    Failed {
        /// Message of the error that stopped the run
        message: String,
    },
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => write!(f, "DONE"),
            Self::Failed { .. } => write!(f, "FAILED"),
        }
    }
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier used to correlate log lines
    pub run_id: String,
    /// Terminal status
    pub status: RunStatus,
    /// States entered, in order
    pub states: Vec<PipelineState>,
    /// Outcome of every step that ran, including a failing one
    pub outcomes: Vec<PhaseOutcome>,
    /// Total wall time
    pub duration: Duration,
    /// Error that ended a failed run
    #[serde(skip)]
    pub error: Option<PipelineError>,
}

impl RunReport {
    /// Returns true if the run completed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Done
    }

    /// Error message if the run failed
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        match &self.status {
            RunStatus::Done => None,
            RunStatus::Failed { message } => Some(message),
        }
    }

    /// Returns true if the run entered `state`
    #[must_use]
    pub fn reached(&self, state: PipelineState) -> bool {
        self.states.contains(&state)
    }

    /// Outcomes recorded for `phase`
    pub fn outcomes_for(&self, phase: Phase) -> impl Iterator<Item = &PhaseOutcome> {
        self.outcomes.iter().filter(move |o| o.phase == phase)
    }
}
