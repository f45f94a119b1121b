//! Pipeline domain types and logic

pub mod discovery;
pub mod errors;
pub mod orchestrator;
pub mod pattern;
pub mod phases;
pub mod types;


pub use discovery::{DiscoveryPatterns, ProjectDiscovery};
pub use errors::{DiscoveryError, PipelineError};
pub use orchestrator::PipelineOrchestrator;
pub use pattern::{GlobMatcher, PatternMatcher, relative_to};
pub use phases::{
    ARTIFACTS_DIR, PACKAGES_DIR, Phase, PlannedStep, TEST_ARTIFACTS_DIR, TEST_LOGGER,
    TEST_RESULTS_DIR, plan, publish_output,
};
pub use types::{
    BuildConfiguration, Cardinality, DiscoveredProjects, DiscoverySet, PhaseOutcome,
    PipelineState, ProjectReference, Role, RunReport, RunStatus, StepResult,
};
