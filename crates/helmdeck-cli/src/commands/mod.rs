//! CLI commands

pub mod apply;
pub mod lint;
pub mod plan;
pub mod releases;
pub mod resolve;
pub mod targets;
pub mod values;

use helmdeck_core::Project;
use std::path::Path;
use tracing::debug;

use crate::error::{CliError, Result};

/// Load the build file named on the command line
pub fn load_project(file: &Path) -> Result<Project> {
    debug!(file = %file.display(), "Loading build file");
    Project::load(file).map_err(CliError::from_load)
}

/// Fail with a "did you mean" hint when `name` is not a declared target
pub fn require_target(project: &Project, name: &str) -> Result<()> {
    if project.target(name).is_ok() {
        return Ok(());
    }
    let candidates: Vec<&str> = project.targets().map(|t| t.name()).collect();
    Err(CliError::usage_with_help(
        format!("Unknown release target: {}", name),
        suggestion(name, &candidates).or_else(|| Some(available(&candidates))),
    ))
}

/// Fail with a "did you mean" hint when `name` is not a declared release
pub fn require_release(project: &Project, name: &str) -> Result<()> {
    if project.release(name).is_ok() {
        return Ok(());
    }
    let candidates: Vec<&str> = project.releases().map(|r| r.name()).collect();
    Err(CliError::usage_with_help(
        format!("Unknown release: {}", name),
        suggestion(name, &candidates).or_else(|| Some(available(&candidates))),
    ))
}

/// Closest candidate by Jaro-Winkler similarity, if any is close enough
pub fn suggestion(name: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|c| (*c, strsim::jaro_winkler(name, c)))
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| format!("did you mean '{}'?", c))
}

fn available(candidates: &[&str]) -> String {
    if candidates.is_empty() {
        "nothing is declared".to_string()
    } else {
        format!("declared: {}", candidates.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_finds_close_names() {
        let candidates = ["local", "staging", "prod"];
        assert_eq!(
            suggestion("stagin", &candidates).as_deref(),
            Some("did you mean 'staging'?")
        );
        assert_eq!(suggestion("kubernetes", &candidates), None);
    }

    #[test]
    fn test_available_lists_candidates() {
        assert_eq!(available(&["a", "b"]), "declared: a, b");
        assert_eq!(available(&[]), "nothing is declared");
    }
}
