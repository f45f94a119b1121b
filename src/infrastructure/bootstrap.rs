//! First-run bootstrap
//!
//! The `dotnet` CLI prints a welcome banner and telemetry notice the first
//! time each SDK version runs, unless a version-keyed sentinel file exists
//! under `<home>/.dotnet`.

use crate::executor::{DotnetCli, ToolRunner};
use crate::pipeline::PipelineError;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the home directory holding the sentinel
pub const SENTINEL_DIR: &str = ".dotnet";

/// Suffix appended to the SDK version to form the sentinel file name
pub const SENTINEL_SUFFIX: &str = ".dotnetFirstUseSentinel";

/// Writes the first-use sentinel for the installed SDK
#[derive(Debug, Clone)]
pub struct EnvironmentBootstrap {
    home: PathBuf,
}

impl EnvironmentBootstrap {
    /// Creates a bootstrap writing under `home`
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Base directory the sentinel directory is created in
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Sentinel path for SDK `version`
    #[must_use]
    pub fn sentinel_path(&self, version: &str) -> PathBuf {
        self.home
            .join(SENTINEL_DIR)
            .join(format!("{version}{SENTINEL_SUFFIX}"))
    }

    /// Queries the SDK version and writes an empty sentinel for it
    ///
    /// Existing sentinels are overwritten, so running this twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns the tool error if the version query fails, or
    /// [`PipelineError::Bootstrap`] if the directory or file cannot be written.
    pub fn skip_first_time_experience<R: ToolRunner>(
        &self,
        cli: &DotnetCli<R>,
    ) -> Result<PathBuf, PipelineError> {
        let version = cli.version()?;
        let sentinel = self.sentinel_path(&version);
        let dir = self.home.join(SENTINEL_DIR);

        fs::create_dir_all(&dir).map_err(|e| PipelineError::Bootstrap {
            path: dir.clone(),
            message: e.to_string(),
        })?;
        fs::write(&sentinel, "").map_err(|e| PipelineError::Bootstrap {
            path: sentinel.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!(version = %version, sentinel = %sentinel.display(), "First-use sentinel written");
        Ok(sentinel)
    }
}
