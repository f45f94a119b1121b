//! `dotnet` CLI commands
//!
//! Each command is a plain value; [`DotnetCommand::args`] turns it into the
//! argument list handed to a [`ToolRunner`]. Options only contribute flags
//! when they are set to a non-empty value.

use super::traits::{ToolOutput, ToolRunner};
use crate::pipeline::PipelineError;
use serde::{Deserialize, Serialize};

/// MSBuild properties that make `dotnet pack` emit a `.snupkg` next to the package
pub const SYMBOL_PROPERTIES: [&str; 2] = [
    "/property:IncludeSymbols=true",
    "/property:SymbolPackageFormat=snupkg",
];

/// Options for `dotnet restore`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreOptions {
    /// Directory for restored packages (`--packages`)
    pub packages: Option<String>,
}

/// Options for `dotnet build`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Build configuration (`--configuration`)
    pub configuration: Option<String>,
}

/// Options for `dotnet test`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOptions {
    /// Build configuration (`--configuration`)
    pub configuration: Option<String>,
    /// Test logger (`--logger`)
    pub logger: Option<String>,
    /// Directory for test results (`--results-directory`)
    pub results_directory: Option<String>,
}

/// Options for `dotnet publish`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOptions {
    /// Build configuration (`--configuration`)
    pub configuration: Option<String>,
    /// Output directory (`--output`)
    pub output: Option<String>,
}

/// Options for `dotnet pack`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackOptions {
    /// Build configuration (`--configuration`)
    pub configuration: Option<String>,
    /// Output directory (`--output`)
    pub output: Option<String>,
    /// Also produce a symbol package
    pub include_symbols: bool,
}

/// A single `dotnet` invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "command")]
pub enum DotnetCommand {
    /// `dotnet --version`
    Version,
    /// `dotnet restore`
    Restore {
        /// Project or solution path
        project: String,
        /// Options
        options: RestoreOptions,
    },
    /// `dotnet build`
    Build {
        /// Project or solution path
        project: String,
        /// Options
        options: BuildOptions,
    },
    /// `dotnet test`
    Test {
        /// Project path
        project: String,
        /// Options
        options: TestOptions,
    },
    /// `dotnet publish`
    Publish {
        /// Project path
        project: String,
        /// Options
        options: PublishOptions,
    },
    /// `dotnet pack`
    Pack {
        /// Project path
        project: String,
        /// Options
        options: PackOptions,
    },
}

impl DotnetCommand {
    /// Name of the `dotnet` subcommand
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Version => "--version",
            Self::Restore { .. } => "restore",
            Self::Build { .. } => "build",
            Self::Test { .. } => "test",
            Self::Publish { .. } => "publish",
            Self::Pack { .. } => "pack",
        }
    }

    /// Builds the argument list, without the program name
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = Args::new(self.name());

        match self {
            Self::Version => {}
            Self::Restore { project, options } => {
                args.push(project);
                args.option("--packages", options.packages.as_deref());
            }
            Self::Build { project, options } => {
                args.push(project);
                args.push("--nologo");
                args.push("--no-restore");
                args.option("--configuration", options.configuration.as_deref());
            }
            Self::Test { project, options } => {
                args.push(project);
                args.push("--nologo");
                args.push("--no-build");
                args.option("--configuration", options.configuration.as_deref());
                args.option("--logger", options.logger.as_deref());
                args.option("--results-directory", options.results_directory.as_deref());
            }
            Self::Publish { project, options } => {
                args.push(project);
                args.push("--nologo");
                args.push("--no-build");
                args.option("--configuration", options.configuration.as_deref());
                args.option("--output", options.output.as_deref());
            }
            Self::Pack { project, options } => {
                args.push(project);
                args.push("--nologo");
                args.push("--no-build");
                args.option("--configuration", options.configuration.as_deref());
                args.option("--output", options.output.as_deref());
                if options.include_symbols {
                    for property in SYMBOL_PROPERTIES {
                        args.push(property);
                    }
                }
            }
        }

        args.0
    }
}

struct Args(Vec<String>);

impl Args {
    fn new(first: &str) -> Self {
        Self(vec![first.to_string()])
    }

    fn push(&mut self, arg: &str) {
        self.0.push(arg.to_string());
    }

    fn option(&mut self, flag: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.push(flag);
            self.push(value);
        }
    }
}

/// Typed front end to the `dotnet` CLI
#[derive(Debug, Clone)]
pub struct DotnetCli<R> {
    runner: R,
}

impl<R: ToolRunner> DotnetCli<R> {
    /// Creates a CLI front end over `runner`
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Underlying runner
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs `command`, streaming output; `--version` is captured instead
    ///
    /// # Errors
    ///
    /// Returns the runner's error when the tool fails.
    pub fn execute(&self, command: &DotnetCommand) -> Result<ToolOutput, PipelineError> {
        let args = command.args();
        match command {
            DotnetCommand::Version => self.runner.capture(&args),
            _ => self.runner.run(&args),
        }
    }

    /// Installed SDK version, trimmed
    ///
    /// # Errors
    ///
    /// Returns the runner's error when the tool fails.
    pub fn version(&self) -> Result<String, PipelineError> {
        let output = self.execute(&DotnetCommand::Version)?;
        Ok(output.stdout.trim().to_string())
    }

    /// Restores `project`
    ///
    /// # Errors
    ///
    /// Returns the runner's error when the tool fails.
    pub fn restore(&self, project: &str, options: &RestoreOptions) -> Result<(), PipelineError> {
        self.execute(&DotnetCommand::Restore {
            project: project.to_string(),
            options: options.clone(),
        })
        .map(drop)
    }

    /// Builds `project` without restoring
    ///
    /// # Errors
    ///
    /// Returns the runner's error when the tool fails.
    pub fn build(&self, project: &str, options: &BuildOptions) -> Result<(), PipelineError> {
        self.execute(&DotnetCommand::Build {
            project: project.to_string(),
            options: options.clone(),
        })
        .map(drop)
    }

    /// Tests `project` without building
    ///
    /// # Errors
    ///
    /// Returns the runner's error when the tool fails.
    pub fn test(&self, project: &str, options: &TestOptions) -> Result<(), PipelineError> {
        self.execute(&DotnetCommand::Test {
            project: project.to_string(),
            options: options.clone(),
        })
        .map(drop)
    }

    /// Publishes `project` without building
    ///
    /// # Errors
    ///
    /// Returns the runner's error when the tool fails.
    pub fn publish(&self, project: &str, options: &PublishOptions) -> Result<(), PipelineError> {
        self.execute(&DotnetCommand::Publish {
            project: project.to_string(),
            options: options.clone(),
        })
        .map(drop)
    }

    /// Packs `project` without building
    ///
    /// # Errors
    ///
    /// Returns the runner's error when the tool fails.
    pub fn pack(&self, project: &str, options: &PackOptions) -> Result<(), PipelineError> {
        self.execute(&DotnetCommand::Pack {
            project: project.to_string(),
            options: options.clone(),
        })
        .map(drop)
    }
}
