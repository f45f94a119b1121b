//! `dotnet-ci plan` - Show what a run would execute
//!
//! Resolves every pattern and prints the resulting steps. Nothing is
//! executed and the first-use sentinel is not written.

use super::PlanFormat;
use anyhow::{Context, Result};
use dotnet_ci::infrastructure::RecordingReporter;
use dotnet_ci::pipeline::PlannedStep;
use dotnet_ci::{Config, ConsoleReporter, DiscoveredProjects, Reporter};
use serde::Serialize;
use std::fmt::Write as _;
use std::process::ExitCode;
use std::sync::Arc;

/// Document printed by `plan --format json`
#[derive(Debug, Serialize)]
pub struct PlanDocument<'a> {
    /// Executable the commands run with
    pub dotnet: &'a str,
    /// Discovered project sets
    pub projects: &'a DiscoveredProjects,
    /// Steps in execution order
    pub steps: &'a [PlannedStep],
}

pub fn print_plan(config: &Config, format: PlanFormat) -> Result<ExitCode> {
    // Discovery listings stay off stdout in JSON mode.
    let reporter: Arc<dyn Reporter> = match format {
        PlanFormat::Text => Arc::new(ConsoleReporter),
        PlanFormat::Json => Arc::new(RecordingReporter::new()),
    };

    let orchestrator = match super::orchestrator(config, reporter, false) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            ConsoleReporter.error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };
    let discovered = match orchestrator.discover() {
        Ok(discovered) => discovered,
        Err(e) => {
            ConsoleReporter.error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };
    let steps = orchestrator.plan(&discovered);

    match format {
        PlanFormat::Text => print!("{}", render_text(&config.dotnet_path, &steps)),
        PlanFormat::Json => {
            let document = PlanDocument {
                dotnet: &config.dotnet_path,
                projects: &discovered,
                steps: &steps,
            };
            let json = serde_json::to_string_pretty(&document)
                .context("Failed to serialize plan")?;
            println!("{json}");
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Numbered listing of `steps` with their full command lines
pub fn render_text(dotnet: &str, steps: &[PlannedStep]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Plan ({} steps):", steps.len());
    for (index, step) in steps.iter().enumerate() {
        let mut words = vec![dotnet.to_string()];
        words.extend(step.args());
        let _ = writeln!(out, "{:>3}. [{}] {}", index + 1, step.phase, step.label);
        let _ = writeln!(out, "     {}", shell_words::join(&words));
    }
    out
}
