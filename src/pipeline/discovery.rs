//! Project discovery
//!
//! Wraps a [`PatternMatcher`] with the cardinality policy of each role and
//! prints the listing of what was found.

use super::errors::{DiscoveryError, PipelineError};
use super::pattern::PatternMatcher;
use super::types::{Cardinality, DiscoveredProjects, DiscoverySet, ProjectReference, Role};
use crate::infrastructure::Reporter;

/// Patterns for every role, as read from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryPatterns {
    /// `SOLUTION`
    pub solution: String,
    /// `PROJECTS_TO_UNIT_TESTING`
    pub unit_tests: String,
    /// `PROJECTS_TO_INTEGRATION_TESTING`
    pub integration_tests: String,
    /// `PROJECTS_TO_PACKING`
    pub packages: String,
}

impl DiscoveryPatterns {
    /// Pattern configured for `role`
    #[must_use]
    pub fn for_role(&self, role: Role) -> &str {
        match role {
            Role::Solution => &self.solution,
            Role::UnitTestProject => &self.unit_tests,
            Role::IntegrationTestProject => &self.integration_tests,
            Role::PackagingProject => &self.packages,
        }
    }
}

/// Applies role cardinality rules on top of pattern matching
pub struct ProjectDiscovery<'a> {
    matcher: &'a dyn PatternMatcher,
    reporter: &'a dyn Reporter,
}

impl<'a> ProjectDiscovery<'a> {
    /// Creates a discovery step over `matcher`, listing results on `reporter`
    pub fn new(matcher: &'a dyn PatternMatcher, reporter: &'a dyn Reporter) -> Self {
        Self { matcher, reporter }
    }

    /// Resolves `pattern`, tags the matches with `role` and checks `policy`
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] on a cardinality violation, or the
    /// matcher's error if the pattern cannot be resolved.
    pub fn discover(
        &self,
        pattern: &str,
        role: Role,
        policy: Cardinality,
    ) -> Result<DiscoverySet, PipelineError> {
        let projects: Vec<ProjectReference> = self
            .matcher
            .resolve(pattern)?
            .into_iter()
            .map(|path| ProjectReference::new(path, role))
            .collect();

        tracing::debug!(%role, %policy, count = projects.len(), "Discovered projects");

        if projects.is_empty() {
            return match policy {
                Cardinality::ZeroOrMore => Ok(DiscoverySet::new(role, policy, projects)),
                Cardinality::ExactlyOne | Cardinality::AtLeastOne => {
                    Err(DiscoveryError::NoneFound {
                        role,
                        pattern: pattern.to_string(),
                    }
                    .into())
                }
            };
        }

        // Listed before the cardinality check.
        self.list(role, &projects);

        if policy == Cardinality::ExactlyOne && projects.len() > 1 {
            return Err(DiscoveryError::MultipleFound {
                role,
                pattern: pattern.to_string(),
                count: projects.len(),
            }
            .into());
        }

        Ok(DiscoverySet::new(role, policy, projects))
    }

    /// Discovers every role in order, stopping at the first error
    ///
    /// # Errors
    ///
    /// Returns the first discovery error; later roles are not resolved.
    pub fn discover_all(
        &self,
        patterns: &DiscoveryPatterns,
    ) -> Result<DiscoveredProjects, PipelineError> {
        let discover = |role: Role| self.discover(patterns.for_role(role), role, role.policy());

        Ok(DiscoveredProjects {
            solution: discover(Role::Solution)?,
            unit_tests: discover(Role::UnitTestProject)?,
            integration_tests: discover(Role::IntegrationTestProject)?,
            packages: discover(Role::PackagingProject)?,
        })
    }

    fn list(&self, role: Role, projects: &[ProjectReference]) {
        self.reporter.info(&role.listing_header(projects.len()));
        for project in projects {
            self.reporter.info(&format!("    {project}"));
        }
        self.reporter.info("");
    }
}
