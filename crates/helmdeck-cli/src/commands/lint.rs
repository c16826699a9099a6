//! Lint command - check a build file for mistakes the engine tolerates

use console::style;
use helmdeck_core::{CoreError, Operation, Project};
use std::path::Path;

use crate::display::LintReport;
use crate::error::{CliError, Result};

pub fn run(file: &Path, strict: bool) -> Result<()> {
    println!(
        "{} Linting build file {}",
        style("→").blue(),
        file.display()
    );

    let project = super::load_project(file)?;
    println!(
        "  {} build file is valid ({} target(s), {} release(s))",
        style("✓").green(),
        project.targets().count(),
        project.releases().count()
    );

    let report = check(&project);
    report.display();

    let errors = report.error_count();
    let warnings = report.warning_count();

    println!();
    if errors > 0 || (strict && warnings > 0) {
        return Err(CliError::lint_failed(errors, warnings));
    }

    if warnings > 0 {
        println!(
            "{} Lint passed with {} warning(s)",
            style("⚠").yellow(),
            warnings
        );
    } else {
        println!("{} Lint passed", style("✓").green().bold());
    }
    Ok(())
}

/// Collect findings for every release and target
pub fn check(project: &Project) -> LintReport {
    let mut report = LintReport::new();
    let target_names: Vec<&str> = project.targets().map(|t| t.name()).collect();
    let release_names: Vec<&str> = project.releases().map(|r| r.name()).collect();

    for unknown in project.unknown_keys() {
        report.add_warning(
            &unknown.section,
            format!("unknown key '{}' is ignored", unknown.key),
            super::suggestion(&unknown.key, &unknown.expected),
        );
    }

    for release in project.releases() {
        let name = release.name();

        for selector in release.target_selectors() {
            if let Some(target) = selector.target_name() {
                if !target_names.contains(&target) {
                    report.add_warning(
                        name,
                        format!("override '{}' names an unknown target", selector),
                        super::suggestion(target, &target_names),
                    );
                }
            }
        }

        for hint in release
            .must_install_after
            .iter()
            .chain(release.must_uninstall_after.iter())
        {
            if !release_names.contains(&hint.as_str()) {
                report.add_warning(
                    name,
                    format!("ordering hint names an unknown release '{}'", hint),
                    super::suggestion(hint, &release_names),
                );
            }
        }

        for dir in &release.values_dirs {
            if !release.base_dir().join(dir).is_dir() {
                report.add_warning(
                    name,
                    format!("values directory {} does not exist", dir.display()),
                    None,
                );
            }
        }

        for target in project.targets() {
            match release.resolve_for_target(target) {
                Ok(props) => {
                    if let Err(err) = props.chart_location() {
                        let hint = match &err {
                            CoreError::ChartNotFound { built_by, .. } if !built_by.is_empty() => {
                                Some(format!("produced by {}", built_by.join(", ")))
                            }
                            _ => None,
                        };
                        report.add_warning(
                            name,
                            format!("chart not available for target {}: {}", target.name(), err),
                            hint,
                        );
                    }
                }
                Err(err) => {
                    report.add_error(name, format!("target {}: {}", target.name(), err));
                }
            }
        }
    }

    for target in project.targets() {
        for operation in [Operation::Install, Operation::Uninstall] {
            if let Err(err @ CoreError::DependencyCycle { .. }) =
                project.plan(target.name(), operation, None)
            {
                report.add_error(
                    "(ordering)",
                    format!("{} on target {}: {}", operation, target.name(), err),
                );
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Severity;
    use tempfile::TempDir;

    fn project(yaml: &str, dir: &Path) -> Project {
        Project::from_yaml(yaml, dir).unwrap()
    }

    #[test]
    fn test_unknown_override_target_is_suggested() {
        let dir = TempDir::new().unwrap();
        let project = project(
            r#"
targets:
  local: {}
  staging: {}
releases:
  app:
    chart: charts/app
    forTargets:
      stagign: { wait: true }
      "!local": { atomic: true }
"#,
            dir.path(),
        );

        let report = check(&project);

        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 1);
        let issue = &report.issues[0];
        assert!(issue.message.contains("stagign"));
        assert_eq!(issue.suggestion.as_deref(), Some("did you mean 'staging'?"));
    }

    #[test]
    fn test_misspelled_keys_are_suggested() {
        let dir = TempDir::new().unwrap();
        let project = project(
            r#"
targets:
  prod: {}
releases:
  app:
    chart: charts/app
    forTargets:
      prod: { wiat: true }
"#,
            dir.path(),
        );

        let report = check(&project);

        assert_eq!(report.error_count(), 0);
        let issue = report
            .issues
            .iter()
            .find(|i| i.message.contains("'wiat'"))
            .unwrap();
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(issue.release, "releases.app.forTargets.prod");
        assert_eq!(issue.suggestion.as_deref(), Some("did you mean 'wait'?"));
    }

    #[test]
    fn test_missing_inputs_are_warnings() {
        let dir = TempDir::new().unwrap();
        let project = project(
            r#"
charts:
  app: {}
releases:
  app:
    chart: { chart: app }
    valuesDirs: [config/app]
    mustInstallAfter: [databse]
  database:
    chart: bitnami/postgresql
"#,
            dir.path(),
        );

        let report = check(&project);

        assert_eq!(report.error_count(), 0);
        let messages: Vec<&str> = report.issues.iter().map(|i| i.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("databse")));
        assert!(messages.iter().any(|m| m.contains("config/app")));
        assert!(messages.iter().any(|m| m.contains("chart not available")));
        assert!(report.issues.iter().all(|i| i.severity == Severity::Warning));
    }

    #[test]
    fn test_cycles_are_errors() {
        let dir = TempDir::new().unwrap();
        let project = project(
            r#"
releases:
  a:
    chart: charts/a
    dependsOn: [b]
  b:
    chart: charts/b
    dependsOn: [a]
"#,
            dir.path(),
        );

        let report = check(&project);
        assert!(report.error_count() >= 1);
        assert!(report.issues.iter().any(|i| i.message.contains("cycle")));
    }
}
