//! dotnet-ci - CI pipeline for .NET repositories
//!
//! Restores, builds, tests, publishes and packs the projects matched by
//! the configured glob patterns.
//!
//! ## Commands
//!
//! - `dotnet-ci` / `dotnet-ci run` - Execute the pipeline
//! - `dotnet-ci plan` - Print the steps a run would execute
//! - `dotnet-ci completions` - Generate shell completions
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with inputs from the environment, as in a GitHub Actions step
//! INPUT_SOLUTION='*.sln' INPUT_PROJECTS_TO_PACKING='src/**/*.csproj' dotnet-ci
//!
//! # Preview the steps as JSON
//! dotnet-ci plan --solution '*.sln' --projects-to-packing 'src/**/*.csproj' --format json
//!
//! # Generate shell completions
//! dotnet-ci completions bash > /etc/bash_completion.d/dotnet-ci
//! ```

use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            if std::env::var("DOTNET_CI_VERBOSE").is_ok() {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}
