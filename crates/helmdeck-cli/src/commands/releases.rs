//! Releases command - list declared releases, optionally against a target

use console::style;
use std::collections::HashSet;
use std::path::Path;

use crate::error::Result;

pub fn run(file: &Path, target: Option<&str>) -> Result<()> {
    let project = super::load_project(file)?;

    let selected: Option<HashSet<&str>> = match target {
        Some(name) => {
            super::require_target(&project, name)?;
            Some(
                project
                    .selected_releases(name, None)?
                    .into_iter()
                    .map(|r| r.name())
                    .collect(),
            )
        }
        None => None,
    };

    if let Some(name) = target {
        println!(
            "{} Releases for target {}",
            style("→").blue(),
            style(name).cyan()
        );
    }

    for release in project.releases() {
        let tags = if release.tags().is_empty() {
            "untagged".to_string()
        } else {
            release
                .tags()
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(",")
        };

        let marker = match &selected {
            Some(set) if set.contains(release.name()) => format!("{} ", style("✓").green()),
            Some(_) => format!("{} ", style("✗").dim()),
            None => String::new(),
        };

        println!(
            "{}{} [{}] {}",
            marker,
            style(release.name()).bold(),
            tags,
            style(&release.chart).dim()
        );
    }

    Ok(())
}
