//! Command-line interface for dotnet-ci
//!
//! - `run` (default): execute the pipeline
//! - `plan`: discover projects and print the steps a run would execute
//! - `completions`: generate shell completions
//!
//! Every input can come from the environment (`INPUT_<NAME>` or `<NAME>`)
//! or from the matching flag; flags win.

pub mod completions;
pub mod plan;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use dotnet_ci::{
    Config, ConsoleReporter, EnvironmentBootstrap, GitHubActionsReporter, GlobMatcher,
    PipelineError, PipelineOrchestrator, ProcessRunner, Reporter, RunReport, init_logging,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// CLI arguments for dotnet-ci
#[derive(Parser, Debug)]
#[command(name = "dotnet-ci")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    inputs: InputArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline (default)
    Run,

    /// Print the steps a run would execute without running them
    Plan {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = PlanFormat::Text)]
        format: PlanFormat,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Overrides for the environment-provided inputs
#[derive(clap::Args, Debug, Default)]
struct InputArgs {
    /// Pattern locating the solution
    #[arg(long, global = true)]
    solution: Option<String>,
    /// Pattern locating unit test projects
    #[arg(long, global = true)]
    projects_to_unit_testing: Option<String>,
    /// Pattern locating integration test projects
    #[arg(long, global = true)]
    projects_to_integration_testing: Option<String>,
    /// Pattern locating packaging projects
    #[arg(long, global = true)]
    projects_to_packing: Option<String>,
    /// Build configuration, e.g. Release
    #[arg(long, global = true)]
    configuration: Option<String>,
    /// Produce symbol packages
    #[arg(long, global = true)]
    include_symbols: bool,
    /// Do not write the first-use sentinel
    #[arg(long, global = true)]
    skip_bootstrap: bool,
    /// Path to the dotnet executable
    #[arg(long, global = true)]
    dotnet: Option<String>,
    /// Directory patterns and commands are relative to
    #[arg(long, global = true)]
    working_directory: Option<PathBuf>,
    /// Log level or filter directive
    #[arg(long, global = true)]
    log_level: Option<String>,
}

impl InputArgs {
    fn apply(self, config: &mut Config) {
        let overrides = [
            (self.solution, &mut config.solution),
            (self.projects_to_unit_testing, &mut config.projects_to_unit_testing),
            (
                self.projects_to_integration_testing,
                &mut config.projects_to_integration_testing,
            ),
            (self.projects_to_packing, &mut config.projects_to_packing),
            (self.configuration, &mut config.configuration),
            (self.dotnet, &mut config.dotnet_path),
            (self.log_level, &mut config.log_level),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }

        config.include_symbols |= self.include_symbols;
        config.skip_bootstrap |= self.skip_bootstrap;
        if self.working_directory.is_some() {
            config.working_directory = self.working_directory;
        }
    }
}

/// Output format of `plan`
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    /// Human-readable listing
    Text,
    /// JSON document
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    Args::command()
}

/// Parse and execute CLI arguments
pub fn run() -> Result<ExitCode> {
    let args = Args::parse();

    let mut config = Config::from_env();
    args.inputs.apply(&mut config);
    init_logging(&config.log_level);
    tracing::debug!(?config, "Configuration loaded");

    match args.command.unwrap_or(Command::Run) {
        Command::Run => Ok(run_pipeline(&config)),
        Command::Plan { format } => plan::print_plan(&config, format),
        Command::Completions { shell, output } => {
            use clap_complete::Shell;

            let shell_enum = match shell {
                ShellArg::Bash => Shell::Bash,
                ShellArg::Zsh => Shell::Zsh,
                ShellArg::Fish => Shell::Fish,
                ShellArg::PowerShell => Shell::PowerShell,
                ShellArg::Elvish => Shell::Elvish,
            };

            let completions = completions::generate_completions(shell_enum)?;

            if let Some(output_path) = output {
                completions::save_completions(&completions, &output_path)?;
            } else {
                print!("{completions}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn reporter() -> Arc<dyn Reporter> {
    if GitHubActionsReporter::detected() {
        Arc::new(GitHubActionsReporter::new())
    } else {
        Arc::new(ConsoleReporter)
    }
}

/// Wires the production collaborators for `config`
fn orchestrator(
    config: &Config,
    reporter: Arc<dyn Reporter>,
    bootstrap: bool,
) -> Result<PipelineOrchestrator, PipelineError> {
    let root = config.resolve_working_directory()?;
    let runner = ProcessRunner::new(config.dotnet_path.clone()).with_cwd(root.clone());

    let orchestrator = PipelineOrchestrator::new(
        config.patterns(),
        config.build_configuration(),
        Arc::new(GlobMatcher::new(root)),
        Arc::new(runner),
        reporter,
    );

    if bootstrap && !config.skip_bootstrap {
        let home = config.resolve_dotnet_home()?;
        Ok(orchestrator.with_bootstrap(EnvironmentBootstrap::new(home)))
    } else {
        Ok(orchestrator)
    }
}

fn run_pipeline(config: &Config) -> ExitCode {
    let reporter = reporter();

    let report = match orchestrator(config, reporter.clone(), true) {
        Ok(orchestrator) => orchestrator.run(),
        Err(e) => {
            reporter.error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        run_id = %report.run_id,
        status = %report.status,
        duration_ms = u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
        "Run finished"
    );

    conclude(&report, reporter.as_ref())
}

/// Reports a failed run and maps the report to the process exit code
fn conclude(report: &RunReport, reporter: &dyn Reporter) -> ExitCode {
    match report.failure_message() {
        None => ExitCode::SUCCESS,
        Some(message) => {
            reporter.error(message);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotnet_ci::infrastructure::{RecordingReporter, ReportEvent};
    use dotnet_ci::{PipelineState, RunStatus};
    use std::time::Duration;

    fn report(status: RunStatus) -> RunReport {
        RunReport {
            run_id: "run".to_string(),
            status,
            states: vec![PipelineState::Bootstrap, PipelineState::DiscoverAll],
            outcomes: Vec::new(),
            duration: Duration::from_millis(3),
            error: None,
        }
    }

    #[test]
    fn test_successful_run_exits_zero() {
        let reporter = RecordingReporter::new();

        let code = conclude(&report(RunStatus::Done), &reporter);

        assert_eq!(code, ExitCode::SUCCESS);
        assert!(reporter.events().is_empty());
    }

    #[test]
    fn test_failed_run_reports_and_exits_one() {
        let reporter = RecordingReporter::new();
        let failed = report(RunStatus::Failed {
            message: "No projects to packing found.".to_string(),
        });

        let code = conclude(&failed, &reporter);

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(
            reporter.events(),
            vec![ReportEvent::Error(
                "No projects to packing found.".to_string()
            )]
        );
    }

    #[test]
    fn test_flags_override_environment() {
        let mut config = Config::from_lookup(|key| match key {
            "INPUT_SOLUTION" => Some("*.sln".to_string()),
            "CONFIGURATION" => Some("Debug".to_string()),
            _ => None,
        });

        let args = Args::parse_from([
            "dotnet-ci",
            "--configuration",
            "Release",
            "--include-symbols",
            "--dotnet",
            "/opt/dotnet/dotnet",
        ]);
        args.inputs.apply(&mut config);

        assert_eq!(config.solution, "*.sln");
        assert_eq!(config.configuration, "Release");
        assert!(config.include_symbols);
        assert_eq!(config.dotnet_path, "/opt/dotnet/dotnet");
        assert!(!config.skip_bootstrap);
    }

    #[test]
    fn test_default_command_is_run() {
        let args = Args::parse_from(["dotnet-ci"]);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_inputs_after_subcommand() {
        let args = Args::parse_from([
            "dotnet-ci",
            "plan",
            "--format",
            "json",
            "--projects-to-packing",
            "src/**/*.csproj",
        ]);

        assert!(matches!(
            args.command,
            Some(Command::Plan {
                format: PlanFormat::Json
            })
        ));
        assert_eq!(
            args.inputs.projects_to_packing.as_deref(),
            Some("src/**/*.csproj")
        );
    }

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli().debug_assert();
    }
}
