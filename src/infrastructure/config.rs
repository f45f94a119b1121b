//! Configuration management
//!
//! Inputs are read once per run. Each input `NAME` is looked up as
//! `INPUT_NAME` (how GitHub Actions passes `with:` values) and then as
//! `NAME`; the first non-empty value wins.

use crate::pipeline::{BuildConfiguration, DiscoveryPatterns, PipelineError, Role};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Pattern for the solution
    pub solution: String,
    /// Pattern for unit test projects
    pub projects_to_unit_testing: String,
    /// Pattern for integration test projects
    pub projects_to_integration_testing: String,
    /// Pattern for packaging projects
    pub projects_to_packing: String,
    /// Build configuration name
    pub configuration: String,
    /// Produce symbol packages
    pub include_symbols: bool,
    /// Do not write the first-use sentinel
    pub skip_bootstrap: bool,
    /// Build tool executable
    pub dotnet_path: String,
    /// Directory patterns and tool invocations are relative to
    pub working_directory: Option<PathBuf>,
    /// Base directory for the first-use sentinel
    pub dotnet_home: Option<PathBuf>,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solution: String::new(),
            projects_to_unit_testing: String::new(),
            projects_to_integration_testing: String::new(),
            projects_to_packing: String::new(),
            configuration: String::new(),
            include_symbols: false,
            skip_bootstrap: false,
            dotnet_path: "dotnet".to_string(),
            working_directory: None,
            dotnet_home: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let input = |name: &str| read_input(&lookup, name);
        let defaults = Self::default();

        Self {
            solution: input(Role::Solution.input_name()).unwrap_or_default(),
            projects_to_unit_testing: input(Role::UnitTestProject.input_name()).unwrap_or_default(),
            projects_to_integration_testing: input(Role::IntegrationTestProject.input_name())
                .unwrap_or_default(),
            projects_to_packing: input(Role::PackagingProject.input_name()).unwrap_or_default(),
            configuration: input("CONFIGURATION").unwrap_or_default(),
            include_symbols: input("INCLUDE_SYMBOLS").is_some_and(|v| parse_flag(&v)),
            skip_bootstrap: input("SKIP_BOOTSTRAP").is_some_and(|v| parse_flag(&v)),
            dotnet_path: input("DOTNET_PATH").unwrap_or(defaults.dotnet_path),
            working_directory: input("WORKING_DIRECTORY").map(PathBuf::from),
            dotnet_home: lookup("DOTNET_CLI_HOME")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            log_level: input("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    /// Discovery patterns for every role
    #[must_use]
    pub fn patterns(&self) -> DiscoveryPatterns {
        DiscoveryPatterns {
            solution: self.solution.clone(),
            unit_tests: self.projects_to_unit_testing.clone(),
            integration_tests: self.projects_to_integration_testing.clone(),
            packages: self.projects_to_packing.clone(),
        }
    }

    /// Build configuration passed to every phase
    #[must_use]
    pub fn build_configuration(&self) -> BuildConfiguration {
        BuildConfiguration::new(self.configuration.trim(), self.include_symbols)
    }

    /// Absolute working directory
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the current directory cannot be
    /// determined or the configured directory does not exist.
    pub fn resolve_working_directory(&self) -> Result<PathBuf, PipelineError> {
        let cwd = std::env::current_dir()
            .map_err(|e| PipelineError::Config(format!("cannot read current directory: {e}")))?;
        let dir = match &self.working_directory {
            Some(dir) => cwd.join(dir),
            None => cwd,
        };
        if !dir.is_dir() {
            return Err(PipelineError::Config(format!(
                "working directory '{}' does not exist",
                dir.display()
            )));
        }
        Ok(dir)
    }

    /// Base directory for the first-use sentinel
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if neither `DOTNET_CLI_HOME` nor a
    /// home directory is available.
    pub fn resolve_dotnet_home(&self) -> Result<PathBuf, PipelineError> {
        self.dotnet_home
            .clone()
            .or_else(dirs::home_dir)
            .ok_or_else(|| PipelineError::Config("cannot determine home directory".to_string()))
    }
}

/// Only the literal `true` enables a flag
#[must_use]
pub fn parse_flag(value: &str) -> bool {
    value.trim() == "true"
}

fn read_input(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    [format!("INPUT_{name}"), name.to_string()]
        .iter()
        .filter_map(|key| lookup(key.as_str()))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
