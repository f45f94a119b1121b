//! End-to-end pipeline runs against a real directory tree
//!
//! Patterns resolve through the real glob matcher; the `dotnet` CLI is
//! replaced by a recording fake.

use dotnet_ci::executor::{RecordingRunner, SYMBOL_PROPERTIES};
use dotnet_ci::infrastructure::{RecordingReporter, ReportEvent};
use dotnet_ci::pipeline::{DiscoveryError, Phase, PipelineState, Role};
use dotnet_ci::{Config, EnvironmentBootstrap, GlobMatcher, PipelineError, PipelineOrchestrator};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn workspace(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for file in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
    }
    dir
}

fn config(inputs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = inputs
        .iter()
        .map(|(k, v)| (format!("INPUT_{k}"), (*v).to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

struct Run {
    runner: Arc<RecordingRunner>,
    reporter: Arc<RecordingReporter>,
    orchestrator: PipelineOrchestrator,
}

fn pipeline(root: &Path, config: &Config, runner: RecordingRunner) -> Run {
    let runner = Arc::new(runner);
    let reporter = Arc::new(RecordingReporter::new());
    let orchestrator = PipelineOrchestrator::new(
        config.patterns(),
        config.build_configuration(),
        Arc::new(GlobMatcher::new(root)),
        runner.clone(),
        reporter.clone(),
    );
    Run {
        runner,
        reporter,
        orchestrator,
    }
}

#[test]
fn test_solution_and_single_package_without_tests() {
    let dir = workspace(&["App.sln", "Lib.csproj"]);
    let config = config(&[
        ("SOLUTION", "*.sln"),
        ("PROJECTS_TO_PACKING", "*.csproj"),
        ("PROJECTS_TO_UNIT_TESTING", "test/**/*.Tests.csproj"),
        ("CONFIGURATION", "Release"),
    ]);
    let run = pipeline(dir.path(), &config, RecordingRunner::new());

    let report = run.orchestrator.run();

    assert!(report.is_success(), "{:?}", report.failure_message());
    assert_eq!(
        run.runner.calls(),
        vec![
            vec!["restore", "App.sln", "--packages", "packages"],
            vec!["build", "App.sln", "--nologo", "--no-restore", "--configuration", "Release"],
            vec![
                "pack",
                "Lib.csproj",
                "--nologo",
                "--no-build",
                "--configuration",
                "Release",
                "--output",
                "artifacts"
            ],
        ]
    );
    assert!(!report.reached(PipelineState::Phase(Phase::UnitTest)));
    assert_eq!(
        run.reporter.info_lines(),
        vec![
            "Solution to restoring and building:",
            "    App.sln",
            "Project to packing:",
            "    Lib.csproj",
        ]
    );
}

#[test]
fn test_multiple_solutions_fail_before_any_invocation() {
    let dir = workspace(&["A.sln", "B.sln", "Lib.csproj"]);
    let config = config(&[("SOLUTION", "*.sln"), ("PROJECTS_TO_PACKING", "*.csproj")]);
    let run = pipeline(dir.path(), &config, RecordingRunner::new());

    let report = run.orchestrator.run();

    assert_eq!(
        report.failure_message(),
        Some("Multiple solutions to restoring and building found.")
    );
    assert!(matches!(
        report.error,
        Some(PipelineError::Discovery(DiscoveryError::MultipleFound {
            role: Role::Solution,
            count: 2,
            ..
        }))
    ));
    assert!(run.runner.calls().is_empty());
    // Both candidates are listed before the failure.
    assert_eq!(
        run.reporter.info_lines(),
        vec!["Solutions to restoring and building:", "    A.sln", "    B.sln"]
    );
}

#[test]
fn test_missing_solution_fails() {
    let dir = workspace(&["Lib.csproj"]);
    let config = config(&[("SOLUTION", "*.sln"), ("PROJECTS_TO_PACKING", "*.csproj")]);
    let run = pipeline(dir.path(), &config, RecordingRunner::new());

    let report = run.orchestrator.run();

    assert_eq!(
        report.failure_message(),
        Some("No solution to restoring and building found.")
    );
    assert!(run.runner.calls().is_empty());
}

#[test]
fn test_no_packaging_projects_fail_before_restore() {
    let dir = workspace(&["App.sln", "test/U.Tests/U.Tests.csproj"]);
    let config = config(&[
        ("SOLUTION", "*.sln"),
        ("PROJECTS_TO_UNIT_TESTING", "test/**/*.Tests.csproj"),
        ("PROJECTS_TO_PACKING", "src/**/*.csproj"),
    ]);
    let run = pipeline(dir.path(), &config, RecordingRunner::new());

    let report = run.orchestrator.run();

    assert_eq!(report.failure_message(), Some("No projects to packing found."));
    assert!(matches!(
        report.error,
        Some(PipelineError::Discovery(DiscoveryError::NoneFound {
            role: Role::PackagingProject,
            ..
        }))
    ));
    assert!(!report.reached(PipelineState::Phase(Phase::Restore)));
    assert!(run.runner.calls().is_empty());
}

#[test]
fn test_integration_project_publishes_under_its_name() {
    let dir = workspace(&[
        "App.sln",
        "src/Lib/Lib.csproj",
        "test/Tests.Integration/Tests.Integration.csproj",
    ]);
    let config = config(&[
        ("SOLUTION", "App.sln"),
        ("PROJECTS_TO_INTEGRATION_TESTING", "test/**/*.Integration.csproj"),
        ("PROJECTS_TO_PACKING", "src/**/*.csproj"),
    ]);
    let run = pipeline(dir.path(), &config, RecordingRunner::new());

    let report = run.orchestrator.run();

    assert!(report.is_success());
    let publish: Vec<Vec<String>> = run
        .runner
        .calls()
        .into_iter()
        .filter(|call| call[0] == "publish")
        .collect();
    assert_eq!(
        publish,
        vec![vec![
            "publish",
            "test/Tests.Integration/Tests.Integration.csproj",
            "--nologo",
            "--no-build",
            "--output",
            "artifacts/tests/Tests.Integration"
        ]]
    );
}

#[test]
fn test_include_symbols_only_for_literal_true() {
    let dir = workspace(&["App.sln", "Lib.csproj"]);

    for (value, expected) in [("true", true), ("false", false), ("TRUE", false), ("", false)] {
        let config = config(&[
            ("SOLUTION", "*.sln"),
            ("PROJECTS_TO_PACKING", "*.csproj"),
            ("INCLUDE_SYMBOLS", value),
        ]);
        let run = pipeline(dir.path(), &config, RecordingRunner::new());

        assert!(run.orchestrator.run().is_success());

        for call in run.runner.calls() {
            for property in SYMBOL_PROPERTIES {
                let present = call.iter().any(|arg| arg == property);
                assert_eq!(
                    present,
                    expected && call[0] == "pack",
                    "INCLUDE_SYMBOLS={value:?}, call {call:?}"
                );
            }
        }
    }
}

#[test]
fn test_unit_tests_run_once_per_match_in_order() {
    let dir = workspace(&[
        "App.sln",
        "src/Lib/Lib.csproj",
        "test/A.Tests/A.Tests.csproj",
        "test/B.Tests/B.Tests.csproj",
        "test/C.Tests/C.Tests.csproj",
    ]);
    let config = config(&[
        ("SOLUTION", "*.sln"),
        (
            "PROJECTS_TO_UNIT_TESTING",
            "test/**/*.Tests.csproj\n!test/B.Tests/**",
        ),
        ("PROJECTS_TO_PACKING", "src/**/*.csproj"),
    ]);
    let run = pipeline(dir.path(), &config, RecordingRunner::new());

    let report = run.orchestrator.run();

    assert!(report.is_success());
    let tested: Vec<String> = run
        .runner
        .calls()
        .into_iter()
        .filter(|call| call[0] == "test")
        .map(|call| call[1].clone())
        .collect();
    assert_eq!(
        tested,
        vec!["test/A.Tests/A.Tests.csproj", "test/C.Tests/C.Tests.csproj"]
    );
    assert_eq!(report.outcomes_for(Phase::UnitTest).count(), 2);
}

#[test]
fn test_failing_build_stops_later_phases() {
    let dir = workspace(&["App.sln", "Lib.csproj", "test/U.Tests.csproj"]);
    let config = config(&[
        ("SOLUTION", "*.sln"),
        ("PROJECTS_TO_UNIT_TESTING", "test/*.csproj"),
        ("PROJECTS_TO_PACKING", "*.csproj"),
    ]);
    let run = pipeline(dir.path(), &config, RecordingRunner::new().fail_on("build", 1));

    let report = run.orchestrator.run();

    assert_eq!(run.runner.subcommands(), vec!["restore", "build"]);
    assert!(matches!(
        report.error,
        Some(PipelineError::ExternalTool { code: 1, .. })
    ));
    assert_eq!(
        report.states.last(),
        Some(&PipelineState::Failed)
    );
    let groups_closed = run
        .reporter
        .events()
        .iter()
        .filter(|e| matches!(e, ReportEvent::GroupEnded))
        .count();
    assert_eq!(groups_closed, 2);
}

#[test]
fn test_bootstrap_writes_sentinel_before_discovery() {
    let dir = workspace(&["App.sln", "Lib.csproj"]);
    let home = tempfile::tempdir().unwrap();
    let config = config(&[("SOLUTION", "*.sln"), ("PROJECTS_TO_PACKING", "*.csproj")]);
    let run = pipeline(
        dir.path(),
        &config,
        RecordingRunner::new().with_stdout("--version", "8.0.401\n"),
    );
    let orchestrator = run
        .orchestrator
        .with_bootstrap(EnvironmentBootstrap::new(home.path()));

    let report = orchestrator.run();

    assert!(report.is_success());
    assert_eq!(
        run.runner.subcommands(),
        vec!["--version", "restore", "build", "pack"]
    );
    let sentinel = home.path().join(".dotnet/8.0.401.dotnetFirstUseSentinel");
    assert_eq!(fs::read(sentinel).unwrap(), Vec::<u8>::new());
}
