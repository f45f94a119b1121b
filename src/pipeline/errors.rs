//! Error types for pipeline domain

use super::types::Role;
use std::path::PathBuf;
use thiserror::Error;

/// Cardinality violations raised while discovering projects
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// Nothing matched a role that requires at least one file
    #[error("{}", .role.none_found_message())]
    NoneFound {
        /// Role being discovered
        role: Role,
        /// Pattern that matched nothing
        pattern: String,
    },

    /// More than one file matched a role that requires exactly one
    #[error("{}", .role.multiple_found_message())]
    MultipleFound {
        /// Role being discovered
        role: Role,
        /// Pattern that matched too much
        pattern: String,
        /// Number of matches
        count: usize,
    },
}

impl DiscoveryError {
    /// Role the violation occurred for
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::NoneFound { role, .. } | Self::MultipleFound { role, .. } => *role,
        }
    }
}

/// Errors that can occur during pipeline operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Project discovery failed
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// A glob pattern could not be parsed
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern line
        pattern: String,
        /// Parser message
        message: String,
    },

    /// The external tool exited with a non-zero status
    #[error("The process '{command}' failed with exit code {code}")]
    ExternalTool {
        /// Rendered command line
        command: String,
        /// Exit code returned by the process, -1 when killed by a signal
        code: i32,
    },

    /// The external tool could not be started
    #[error("Unable to start '{program}': {message}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// OS error message
        message: String,
    },

    /// Writing the first-use sentinel failed
    #[error("Failed to write first-use sentinel '{}': {message}", .path.display())]
    Bootstrap {
        /// Path being created or written
        path: PathBuf,
        /// OS error message
        message: String,
    },

    /// Invalid run configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
