//! Glob pattern resolution
//!
//! A pattern string holds one glob per line. Blank lines and lines starting
//! with `#` are ignored; lines starting with `!` exclude whatever they match.
//! Results are regular files, expressed relative to the working directory.

use super::errors::PipelineError;
use glob::{MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Resolves a pattern string to an ordered list of relative file paths
pub trait PatternMatcher: Send + Sync {
    /// Resolves `pattern`; no matches is an empty, successful result
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidPattern`] for malformed globs and
    /// [`PipelineError::Io`] when a matched entry cannot be read.
    fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>, PipelineError>;
}

/// [`PatternMatcher`] backed by the `glob` crate
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    root: PathBuf,
    options: MatchOptions,
}

impl GlobMatcher {
    /// Creates a matcher resolving relative patterns against `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: MatchOptions {
                case_sensitive: true,
                require_literal_separator: true,
                require_literal_leading_dot: false,
            },
        }
    }

    /// Working directory results are relative to
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Turns a pattern line into an absolute glob expression
    fn anchor(&self, line: &str) -> String {
        if Path::new(line).is_absolute() {
            return line.to_string();
        }
        let root = Pattern::escape(&self.root.to_string_lossy());
        let line = line.strip_prefix("./").unwrap_or(line);
        if root.ends_with('/') {
            format!("{root}{line}")
        } else {
            format!("{root}/{line}")
        }
    }

    fn compile(&self, line: &str) -> Result<Pattern, PipelineError> {
        Pattern::new(&self.anchor(line)).map_err(|e| PipelineError::InvalidPattern {
            pattern: line.to_string(),
            message: e.to_string(),
        })
    }
}

impl PatternMatcher for GlobMatcher {
    fn resolve(&self, pattern: &str) -> Result<Vec<PathBuf>, PipelineError> {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();

        for line in pattern.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.strip_prefix('!') {
                Some(negated) => excludes.push(self.compile(negated.trim())?),
                None => includes.push(line),
            }
        }

        let mut seen = HashSet::new();
        let mut matches = Vec::new();

        for line in includes {
            let expression = self.anchor(line);
            tracing::trace!(pattern = %line, expression = %expression, "Resolving pattern");

            let paths = glob::glob_with(&expression, self.options).map_err(|e| {
                PipelineError::InvalidPattern {
                    pattern: line.to_string(),
                    message: e.to_string(),
                }
            })?;

            for entry in paths {
                let path = entry.map_err(|e| PipelineError::Io(e.to_string()))?;
                if !path.is_file() {
                    continue;
                }
                if excludes
                    .iter()
                    .any(|exclude| exclude.matches_path_with(&path, self.options))
                {
                    continue;
                }
                let relative = relative_to(&path, &self.root);
                if seen.insert(relative.clone()) {
                    matches.push(relative);
                }
            }
        }

        tracing::debug!(pattern = %pattern.trim(), count = matches.len(), "Pattern resolved");
        Ok(matches)
    }
}

/// Expresses `path` relative to `base`, using `..` when it lies outside
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path = normalize(path);
    let base = normalize(base);

    if let Ok(stripped) = path.strip_prefix(&base) {
        return stripped.to_path_buf();
    }

    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part.as_os_str());
    }
    relative
}

/// Removes `.` components and folds `..` lexically
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
