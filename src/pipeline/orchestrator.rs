//! Pipeline orchestration
//!
//! Runs the state machine
//! `Bootstrap → DiscoverAll → Restore → Build → UnitTest* → IntegrationPublish* → Pack* → Done`
//! and stops at the first error. Nothing that already ran is undone.

use super::discovery::{DiscoveryPatterns, ProjectDiscovery};
use super::errors::PipelineError;
use super::pattern::PatternMatcher;
use super::phases::{PlannedStep, plan};
use super::types::{
    BuildConfiguration, DiscoveredProjects, PhaseOutcome, PipelineState, RunReport, RunStatus,
    StepResult,
};
use crate::executor::{DotnetCli, ToolRunner};
use crate::infrastructure::{EnvironmentBootstrap, Reporter, group};
use std::sync::Arc;
use std::time::Instant;

/// Drives discovery and the phases against injected collaborators
pub struct PipelineOrchestrator {
    patterns: DiscoveryPatterns,
    build: BuildConfiguration,
    matcher: Arc<dyn PatternMatcher>,
    cli: DotnetCli<Arc<dyn ToolRunner>>,
    reporter: Arc<dyn Reporter>,
    bootstrap: Option<EnvironmentBootstrap>,
}

impl PipelineOrchestrator {
    /// Creates an orchestrator; the bootstrap step is a no-op until
    /// [`with_bootstrap`](Self::with_bootstrap) is called
    pub fn new(
        patterns: DiscoveryPatterns,
        build: BuildConfiguration,
        matcher: Arc<dyn PatternMatcher>,
        runner: Arc<dyn ToolRunner>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            patterns,
            build,
            matcher,
            cli: DotnetCli::new(runner),
            reporter,
            bootstrap: None,
        }
    }

    /// Writes the first-use sentinel before discovery
    #[must_use]
    pub fn with_bootstrap(mut self, bootstrap: EnvironmentBootstrap) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }

    /// Build configuration of this run
    #[must_use]
    pub fn build_configuration(&self) -> &BuildConfiguration {
        &self.build
    }

    /// Resolves every project set, stopping at the first error
    ///
    /// # Errors
    ///
    /// Returns the first discovery or pattern error.
    pub fn discover(&self) -> Result<DiscoveredProjects, PipelineError> {
        ProjectDiscovery::new(self.matcher.as_ref(), self.reporter.as_ref())
            .discover_all(&self.patterns)
    }

    /// Steps a run over `discovered` would execute, in order
    #[must_use]
    pub fn plan(&self, discovered: &DiscoveredProjects) -> Vec<PlannedStep> {
        plan(discovered, &self.build)
    }

    /// Executes the whole pipeline
    ///
    /// Never fails itself: the first error ends the run and is reported in
    /// the returned [`RunReport`].
    pub fn run(&self) -> RunReport {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("pipeline", run_id = %run_id);
        let _guard = span.enter();

        let started = Instant::now();
        let mut run = RunTrace::default();

        let (status, error) = match self.execute(&mut run) {
            Ok(()) => {
                run.enter(PipelineState::Done);
                tracing::info!(steps = run.outcomes.len(), "Pipeline completed");
                (RunStatus::Done, None)
            }
            Err(err) => {
                run.enter(PipelineState::Failed);
                tracing::error!(error = %err, "Pipeline failed");
                (
                    RunStatus::Failed {
                        message: err.to_string(),
                    },
                    Some(err),
                )
            }
        };

        RunReport {
            run_id,
            status,
            states: run.states,
            outcomes: run.outcomes,
            duration: started.elapsed(),
            error,
        }
    }

    fn execute(&self, run: &mut RunTrace) -> Result<(), PipelineError> {
        run.enter(PipelineState::Bootstrap);
        match &self.bootstrap {
            Some(bootstrap) => {
                bootstrap.skip_first_time_experience(&self.cli)?;
            }
            None => tracing::debug!("Bootstrap disabled"),
        }

        run.enter(PipelineState::DiscoverAll);
        let discovered = self.discover()?;

        for step in self.plan(&discovered) {
            let state = PipelineState::Phase(step.phase);
            if run.current() != Some(state) {
                run.enter(state);
            }
            self.execute_step(&step, run)?;
        }

        Ok(())
    }

    fn execute_step(&self, step: &PlannedStep, run: &mut RunTrace) -> Result<(), PipelineError> {
        tracing::info!(phase = %step.phase, project = %step.project, "Executing step");
        let started = Instant::now();

        let result = group(self.reporter.as_ref(), &step.label, || {
            self.cli.execute(&step.command)
        });
        self.reporter.info("");

        run.outcomes.push(PhaseOutcome {
            phase: step.phase,
            project: Some(step.project.clone()),
            result: match &result {
                Ok(_) => StepResult::Success,
                Err(err) => StepResult::Failure {
                    message: err.to_string(),
                },
            },
            duration: started.elapsed(),
        });

        result.map(drop)
    }
}

/// States entered and outcomes recorded while a run progresses
#[derive(Debug, Default)]
struct RunTrace {
    states: Vec<PipelineState>,
    outcomes: Vec<PhaseOutcome>,
}

impl RunTrace {
    fn enter(&mut self, state: PipelineState) {
        tracing::debug!(state = %state, "Entering state");
        self.states.push(state);
    }

    fn current(&self) -> Option<PipelineState> {
        self.states.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::RecordingRunner;
    use crate::infrastructure::{RecordingReporter, ReportEvent};
    use crate::pipeline::errors::DiscoveryError;
    use crate::pipeline::phases::Phase;
    use crate::pipeline::types::Role;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::PathBuf;

    struct TableMatcher(HashMap<&'static str, Vec<&'static str>>);

    impl PatternMatcher for TableMatcher {
        fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>, PipelineError> {
            Ok(self
                .0
                .get(pattern)
                .map(|paths| paths.iter().map(PathBuf::from).collect())
                .unwrap_or_default())
        }
    }

    struct Harness {
        runner: Arc<RecordingRunner>,
        reporter: Arc<RecordingReporter>,
        orchestrator: PipelineOrchestrator,
    }

    fn harness(
        table: &[(&'static str, Vec<&'static str>)],
        runner: RecordingRunner,
        build: BuildConfiguration,
    ) -> Harness {
        let runner = Arc::new(runner);
        let reporter = Arc::new(RecordingReporter::new());
        let patterns = DiscoveryPatterns {
            solution: "sln".to_string(),
            unit_tests: "unit".to_string(),
            integration_tests: "integration".to_string(),
            packages: "pack".to_string(),
        };
        let orchestrator = PipelineOrchestrator::new(
            patterns,
            build,
            Arc::new(TableMatcher(table.iter().cloned().collect())),
            runner.clone(),
            reporter.clone(),
        );
        Harness {
            runner,
            reporter,
            orchestrator,
        }
    }

    #[test]
    fn test_full_run_executes_phases_in_order() {
        let h = harness(
            &[
                ("sln", vec!["App.sln"]),
                ("unit", vec!["test/A.Tests.csproj", "test/B.Tests.csproj"]),
                ("integration", vec!["test/Tests.Integration.csproj"]),
                ("pack", vec!["src/Lib.csproj"]),
            ],
            RecordingRunner::new(),
            BuildConfiguration::new("Release", false),
        );

        let report = h.orchestrator.run();

        assert!(report.is_success(), "{:?}", report.failure_message());
        assert_eq!(
            h.runner.subcommands(),
            vec!["restore", "build", "test", "test", "publish", "pack"]
        );
        assert_eq!(
            report.states,
            vec![
                PipelineState::Bootstrap,
                PipelineState::DiscoverAll,
                PipelineState::Phase(Phase::Restore),
                PipelineState::Phase(Phase::Build),
                PipelineState::Phase(Phase::UnitTest),
                PipelineState::Phase(Phase::IntegrationPublish),
                PipelineState::Phase(Phase::Pack),
                PipelineState::Done,
            ]
        );
        assert_eq!(report.outcomes.len(), 6);
        assert!(report.outcomes.iter().all(PhaseOutcome::is_success));
        assert_eq!(
            h.runner.calls()[4],
            vec![
                "publish",
                "test/Tests.Integration.csproj",
                "--nologo",
                "--no-build",
                "--configuration",
                "Release",
                "--output",
                "artifacts/tests/Tests.Integration"
            ]
        );
    }

    #[test]
    fn test_each_step_runs_in_its_own_group() {
        let h = harness(
            &[
                ("sln", vec!["App.sln"]),
                ("unit", vec!["U1.csproj", "U2.csproj"]),
                ("pack", vec!["Lib.csproj"]),
            ],
            RecordingRunner::new(),
            BuildConfiguration::default(),
        );

        h.orchestrator.run();

        assert_eq!(
            h.reporter.group_labels(),
            vec![
                "Restoring \"App.sln\"...",
                "Building \"App.sln\"...",
                "Testing \"U1.csproj\"...",
                "Testing \"U2.csproj\"...",
                "Packing \"Lib.csproj\"...",
            ]
        );
        let events = h.reporter.events();
        let opened = events
            .iter()
            .filter(|e| matches!(e, ReportEvent::GroupStarted(_)))
            .count();
        let closed = events
            .iter()
            .filter(|e| matches!(e, ReportEvent::GroupEnded))
            .count();
        assert_eq!(opened, closed);
    }

    #[test]
    fn test_empty_sets_skip_phases() {
        let h = harness(
            &[("sln", vec!["App.sln"]), ("pack", vec!["Lib.csproj"])],
            RecordingRunner::new(),
            BuildConfiguration::default(),
        );

        let report = h.orchestrator.run();

        assert!(report.is_success());
        assert!(!report.reached(PipelineState::Phase(Phase::UnitTest)));
        assert!(!report.reached(PipelineState::Phase(Phase::IntegrationPublish)));
        assert_eq!(h.runner.subcommands(), vec!["restore", "build", "pack"]);
    }

    #[test]
    fn test_discovery_failure_runs_nothing() {
        let h = harness(
            &[("sln", vec!["A.sln", "B.sln"]), ("pack", vec!["Lib.csproj"])],
            RecordingRunner::new(),
            BuildConfiguration::default(),
        );

        let report = h.orchestrator.run();

        assert_eq!(
            report.failure_message(),
            Some("Multiple solutions to restoring and building found.")
        );
        assert!(matches!(
            report.error,
            Some(PipelineError::Discovery(DiscoveryError::MultipleFound { .. }))
        ));
        assert!(h.runner.calls().is_empty());
        assert!(!report.reached(PipelineState::Phase(Phase::Restore)));
        assert_eq!(report.states.last(), Some(&PipelineState::Failed));
    }

    #[test]
    fn test_missing_packages_never_reach_restore() {
        let h = harness(
            &[("sln", vec!["App.sln"]), ("unit", vec!["U.csproj"])],
            RecordingRunner::new(),
            BuildConfiguration::default(),
        );

        let report = h.orchestrator.run();

        match report.error {
            Some(PipelineError::Discovery(DiscoveryError::NoneFound { role, .. })) => {
                assert_eq!(role, Role::PackagingProject);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(h.runner.calls().is_empty());
    }

    #[test]
    fn test_tool_failure_stops_the_run() {
        let h = harness(
            &[
                ("sln", vec!["App.sln"]),
                ("unit", vec!["U1.csproj", "U2.csproj"]),
                ("pack", vec!["Lib.csproj"]),
            ],
            RecordingRunner::new().fail_on("test", 1),
            BuildConfiguration::default(),
        );

        let report = h.orchestrator.run();

        assert!(!report.is_success());
        assert_eq!(h.runner.subcommands(), vec!["restore", "build", "test"]);
        let last = report.outcomes.last().unwrap();
        assert_eq!(last.phase, Phase::UnitTest);
        assert!(!last.is_success());
        assert_eq!(report.outcomes_for(Phase::UnitTest).count(), 1);
        assert!(!report.reached(PipelineState::Phase(Phase::Pack)));
        // The failing step's group is still closed.
        assert!(h.reporter.events().contains(&ReportEvent::GroupEnded));
    }

    #[test]
    fn test_bootstrap_runs_before_discovery() {
        let home = tempfile::tempdir().unwrap();
        let h = harness(
            &[("sln", vec!["App.sln"]), ("pack", vec!["Lib.csproj"])],
            RecordingRunner::new().with_stdout("--version", "8.0.100\n"),
            BuildConfiguration::default(),
        );
        let orchestrator = h
            .orchestrator
            .with_bootstrap(EnvironmentBootstrap::new(home.path()));

        let report = orchestrator.run();

        assert!(report.is_success());
        assert_eq!(h.runner.subcommands()[0], "--version");
        assert!(
            home.path()
                .join(".dotnet/8.0.100.dotnetFirstUseSentinel")
                .is_file()
        );
    }

    #[test]
    fn test_bootstrap_failure_aborts_before_discovery() {
        let home = tempfile::tempdir().unwrap();
        let h = harness(
            &[("sln", vec!["App.sln"]), ("pack", vec!["Lib.csproj"])],
            RecordingRunner::new().fail_on("--version", 1),
            BuildConfiguration::default(),
        );
        let orchestrator = h
            .orchestrator
            .with_bootstrap(EnvironmentBootstrap::new(home.path()));

        let report = orchestrator.run();

        assert!(!report.is_success());
        assert!(!report.reached(PipelineState::DiscoverAll));
        assert!(h.reporter.info_lines().is_empty());
    }

    #[test]
    fn test_plan_matches_execution() {
        let h = harness(
            &[
                ("sln", vec!["App.sln"]),
                ("integration", vec!["I.csproj"]),
                ("pack", vec!["Lib.csproj"]),
            ],
            RecordingRunner::new(),
            BuildConfiguration::new("Release", true),
        );

        let discovered = h.orchestrator.discover().unwrap();
        let planned: Vec<Vec<String>> = h
            .orchestrator
            .plan(&discovered)
            .iter()
            .map(PlannedStep::args)
            .collect();
        h.orchestrator.run();

        assert_eq!(planned, h.runner.calls());
    }
}
