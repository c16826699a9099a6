//! Release selection and ordering per target
//!
//! A plan lists the releases to process on one target, already resolved and
//! ordered so that every release comes after the releases it must follow.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::project::Project;
use crate::release::Release;
use crate::resolved::ResolvedReleaseProperties;
use crate::tags::TagExpression;

/// Direction of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Install,
    Uninstall,
    Test,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::Test => "test",
        };
        write!(f, "{}", s)
    }
}

/// Why a release is part of a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The release has no tags
    Untagged,
    /// The release tags match the target selector
    Tags,
    /// Pulled in by another release's `dependsOn`
    Dependency { required_by: String },
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Untagged => write!(f, "untagged"),
            Self::Tags => write!(f, "tags match"),
            Self::Dependency { required_by } => write!(f, "required by {}", required_by),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub release: Arc<ResolvedReleaseProperties>,
    pub selection: Selection,
}

/// Ordered releases for one operation on one target
#[derive(Debug, Clone)]
pub struct Plan {
    pub target: String,
    pub operation: Operation,
    pub selector: TagExpression,
    pub entries: Vec<PlanEntry>,
}

impl Plan {
    /// Release declaration names in plan order
    pub fn release_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.release.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Project {
    /// Releases the target installs, in declaration order
    pub fn selected_releases(
        &self,
        target: &str,
        extra: Option<&TagExpression>,
    ) -> Result<Vec<&Release>> {
        let target = self.target(target)?;
        let selector = self.selector_for(target, extra);
        Ok(self
            .releases()
            .filter(|release| release.is_selected_by(&selector))
            .collect())
    }

    /// Build a plan for `operation` on `target`
    ///
    /// Installs pull in `dependsOn` releases even when the selector skips
    /// them; uninstalls and tests only cover selected releases. Tests follow
    /// install order and skip releases whose tests are disabled.
    pub fn plan(
        &self,
        target_name: &str,
        operation: Operation,
        extra: Option<&TagExpression>,
    ) -> Result<Plan> {
        let target = self.target(target_name)?;
        let selector = self.selector_for(target, extra);

        let mut members: Vec<(usize, PlanEntry)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut pending: VecDeque<(String, Selection)> = VecDeque::new();

        for release in self.releases() {
            if release.is_selected_by(&selector) {
                let selection = if release.tags().is_empty() {
                    Selection::Untagged
                } else {
                    Selection::Tags
                };
                seen.insert(release.name().to_string());
                pending.push_back((release.name().to_string(), selection));
            }
        }

        while let Some((name, selection)) = pending.pop_front() {
            let release = self.release(&name)?;
            let resolved = release.resolve_for_target(target)?;

            if operation == Operation::Install {
                for dependency in &resolved.install_depends_on {
                    if self.release_index(dependency).is_none() {
                        return Err(CoreError::UnknownRelease {
                            name: dependency.clone(),
                        });
                    }
                    if seen.insert(dependency.clone()) {
                        pending.push_back((
                            dependency.clone(),
                            Selection::Dependency {
                                required_by: name.clone(),
                            },
                        ));
                    }
                }
            }

            let index = self.release_index(&name).unwrap_or(usize::MAX);
            members.push((
                index,
                PlanEntry {
                    release: resolved,
                    selection,
                },
            ));
        }

        members.sort_by_key(|(index, _)| *index);
        let entries: Vec<PlanEntry> = members.into_iter().map(|(_, entry)| entry).collect();

        let mut ordered = order_entries(entries, operation)?;
        if operation == Operation::Test {
            ordered.retain(|entry| entry.release.test_enabled());
        }

        debug!(
            target = %target_name,
            operation = %operation,
            releases = ordered.len(),
            "Built plan"
        );

        Ok(Plan {
            target: target_name.to_string(),
            operation,
            selector,
            entries: ordered,
        })
    }
}

/// Edges `(before, after)` between plan members
fn ordering_edges(entries: &[PlanEntry], operation: Operation) -> Vec<(String, String)> {
    let members: HashSet<&str> = entries.iter().map(|e| e.release.name.as_str()).collect();
    let mut edges = Vec::new();

    for entry in entries {
        let props = &entry.release;
        let install_after: BTreeSet<&String> = props
            .install_depends_on
            .iter()
            .chain(props.must_install_after.iter())
            .collect();

        for other in install_after {
            if !members.contains(other.as_str()) {
                continue;
            }
            match operation {
                Operation::Install | Operation::Test => {
                    edges.push((other.clone(), props.name.clone()))
                }
                Operation::Uninstall => edges.push((props.name.clone(), other.clone())),
            }
        }

        if operation == Operation::Uninstall {
            for other in &props.must_uninstall_after {
                if members.contains(other.as_str()) {
                    edges.push((other.clone(), props.name.clone()));
                }
            }
        }
    }

    edges
}

/// Topological order that keeps declaration order where edges allow
fn order_entries(entries: Vec<PlanEntry>, operation: Operation) -> Result<Vec<PlanEntry>> {
    let edges = ordering_edges(&entries, operation);
    let position: HashMap<String, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.release.name.clone(), i))
        .collect();

    let mut before: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
    for (first, then) in &edges {
        if let (Some(&a), Some(&b)) = (position.get(first), position.get(then)) {
            before[b].push(a);
        }
    }
    for preds in &mut before {
        preds.sort_unstable();
        preds.dedup();
    }

    fn visit(
        node: usize,
        before: &[Vec<usize>],
        done: &mut Vec<bool>,
        stack: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> std::result::Result<(), Vec<usize>> {
        if done[node] {
            return Ok(());
        }
        if let Some(start) = stack.iter().position(|&n| n == node) {
            let mut cycle = stack[start..].to_vec();
            cycle.push(node);
            return Err(cycle);
        }

        stack.push(node);
        for &pred in &before[node] {
            visit(pred, before, done, stack, order)?;
        }
        stack.pop();

        done[node] = true;
        order.push(node);
        Ok(())
    }

    let mut done = vec![false; entries.len()];
    let mut order = Vec::with_capacity(entries.len());
    for node in 0..entries.len() {
        let mut stack = Vec::new();
        if let Err(cycle) = visit(node, &before, &mut done, &mut stack, &mut order) {
            return Err(CoreError::DependencyCycle {
                cycle: cycle
                    .into_iter()
                    .map(|i| entries[i].release.name.clone())
                    .collect(),
            });
        }
    }

    let mut slots: Vec<Option<PlanEntry>> = entries.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const BUILD_FILE: &str = r#"
targets:
  local:
    selectTags: "!prod-only"
  prod: {}

releases:
  frontend:
    chart: charts/frontend
    tags: [web]
    dependsOn: [backend]
  backend:
    chart: charts/backend
    tags: [core]
    mustInstallAfter: [database]
  database:
    chart: bitnami/postgresql
    tags: [prod-only]
  monitoring:
    chart: charts/monitoring
    mustUninstallAfter: [frontend]
    test:
      enabled: false
"#;

    fn project() -> Project {
        Project::from_yaml(BUILD_FILE, Path::new(".")).unwrap()
    }

    #[test]
    fn test_selection_by_tags() {
        let project = project();

        let local: Vec<&str> = project
            .selected_releases("local", None)
            .unwrap()
            .iter()
            .map(|r| r.name())
            .collect();
        assert_eq!(local, vec!["frontend", "backend", "monitoring"]);

        let core = TagExpression::parse("core").unwrap();
        let filtered: Vec<&str> = project
            .selected_releases("prod", Some(&core))
            .unwrap()
            .iter()
            .map(|r| r.name())
            .collect();
        assert_eq!(filtered, vec!["backend", "monitoring"]);
    }

    #[test]
    fn test_install_order_respects_dependencies() {
        let project = project();

        let plan = project.plan("prod", Operation::Install, None).unwrap();
        assert_eq!(
            plan.release_names(),
            vec!["database", "backend", "frontend", "monitoring"]
        );

        // database is filtered out locally, so mustInstallAfter does not apply
        let plan = project.plan("local", Operation::Install, None).unwrap();
        assert_eq!(plan.release_names(), vec!["backend", "frontend", "monitoring"]);
    }

    #[test]
    fn test_depends_on_pulls_in_releases() {
        let project = project();
        let web = TagExpression::parse("web").unwrap();

        let plan = project.plan("prod", Operation::Install, Some(&web)).unwrap();

        assert_eq!(plan.release_names(), vec!["backend", "frontend", "monitoring"]);
        let backend = &plan.entries[0];
        assert_eq!(
            backend.selection,
            Selection::Dependency {
                required_by: "frontend".into()
            }
        );
        assert_eq!(plan.entries[2].selection, Selection::Untagged);
    }

    #[test]
    fn test_uninstall_order_is_reversed() {
        let project = project();

        let plan = project.plan("prod", Operation::Uninstall, None).unwrap();
        let names = plan.release_names();
        let pos = |name: &str| names.iter().position(|n| *n == name).unwrap();

        assert!(pos("frontend") < pos("backend"));
        assert!(pos("backend") < pos("database"));
        assert!(pos("frontend") < pos("monitoring"));
    }

    #[test]
    fn test_test_plan_skips_disabled() {
        let project = project();

        let plan = project.plan("local", Operation::Test, None).unwrap();
        assert_eq!(plan.release_names(), vec!["backend", "frontend"]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let project = Project::from_yaml(
            r#"
releases:
  a:
    chart: charts/a
    mustInstallAfter: [b]
  b:
    chart: charts/b
    dependsOn: [a]
"#,
            Path::new("."),
        )
        .unwrap();

        let err = project
            .plan("default", Operation::Install, None)
            .unwrap_err();
        match err {
            CoreError::DependencyCycle { cycle } => {
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.contains(&"a".to_string()));
                assert!(cycle.contains(&"b".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_target() {
        let project = project();
        assert!(matches!(
            project.plan("staging", Operation::Install, None),
            Err(CoreError::UnknownTarget { .. })
        ));
    }
}
