//! Completion scripts generated from the clap definition

use anyhow::{Context, Result};
use clap_complete::{Shell, generate};
use std::fs;
use std::path::Path;

const BIN_NAME: &str = "dotnet-ci";

/// Renders the completion script for `shell`
pub fn generate_completions(shell: Shell) -> Result<String> {
    let mut script = Vec::new();
    generate(shell, &mut super::build_cli(), BIN_NAME, &mut script);
    String::from_utf8(script).context("completion script is not valid UTF-8")
}

/// Writes a rendered script to `path`
pub fn save_completions(script: &str, path: &Path) -> Result<()> {
    fs::write(path, script)
        .with_context(|| format!("cannot write completions to {}", path.display()))
}
