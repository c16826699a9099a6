//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Lint findings with grouped display
//! - Plan entries with the reason each release was selected

use console::style;
use helmdeck_core::{HelmCommand, PlanEntry, Selection};
use std::collections::BTreeMap;

/// Finding severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// A lint finding attached to one release
#[derive(Debug, Clone)]
pub struct LintIssue {
    pub severity: Severity,
    pub release: String,
    pub message: String,
    pub suggestion: Option<String>,
}

/// Lint findings grouped for display
#[derive(Debug, Default)]
pub struct LintReport {
    pub issues: Vec<LintIssue>,
}

impl LintReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error
    pub fn add_error(&mut self, release: &str, message: impl Into<String>) {
        self.issues.push(LintIssue {
            severity: Severity::Error,
            release: release.to_string(),
            message: message.into(),
            suggestion: None,
        });
    }

    /// Add a warning
    pub fn add_warning(
        &mut self,
        release: &str,
        message: impl Into<String>,
        suggestion: Option<String>,
    ) {
        self.issues.push(LintIssue {
            severity: Severity::Warning,
            release: release.to_string(),
            message: message.into(),
            suggestion,
        });
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Display issues grouped by release
    pub fn display(&self) {
        let mut by_release: BTreeMap<&str, Vec<&LintIssue>> = BTreeMap::new();
        for issue in &self.issues {
            by_release.entry(&issue.release).or_default().push(issue);
        }

        for (release, issues) in by_release {
            println!();
            println!("{}", style(release).cyan().bold());

            for issue in issues {
                let icon = match issue.severity {
                    Severity::Error => style("✗").red(),
                    Severity::Warning => style("⚠").yellow(),
                };
                println!("  {} {}", icon, issue.message);

                if let Some(suggestion) = &issue.suggestion {
                    println!("    {} {}", style("hint:").blue(), suggestion);
                }
            }
        }
    }
}

/// Short reason shown next to a plan entry
pub fn selection_label(selection: &Selection) -> String {
    match selection {
        Selection::Dependency { .. } => style(selection.to_string()).yellow().to_string(),
        _ => style(selection.to_string()).dim().to_string(),
    }
}

/// Print one plan step
pub fn plan_step(index: usize, entry: &PlanEntry, command: &HelmCommand) {
    println!(
        "{:>3}. {} {}",
        index + 1,
        style(&entry.release.name).bold(),
        selection_label(&entry.selection)
    );
    println!("     {}", command);
}
