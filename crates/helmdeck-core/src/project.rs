//! Build file loading
//!
//! A build file (`helmdeck.yaml`) declares build-wide defaults, charts,
//! release targets and releases:
//!
//! ```yaml
//! helm:
//!   namespace: apps
//!   remoteTimeout: 5m
//! charts:
//!   backend:
//!     packageFile: build/helm/charts/backend-1.0.0.tgz
//! targets:
//!   local:
//!     kubeContext: kind-local
//!     selectTags: "!prod-only"
//! releases:
//!   backend:
//!     chart: { chart: backend }
//!     tags: [core]
//!     forTargets:
//!       "!local": { values: { replicas: 3 } }
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::chart::ChartReference;
use crate::error::{CoreError, Result};
use crate::options::{
    InstallFromRepositoryOptions, InstallationOptions, Layered, ServerOperationOptions,
    TestOptions, ValueOptions,
};
use crate::release::Release;
use crate::resolved::ResolvedReleaseProperties;
use crate::tags::TagExpression;
use crate::target::ReleaseTarget;

/// Default build file name
pub const BUILD_FILE_NAME: &str = "helmdeck.yaml";

/// Name of the target created when none is declared
pub const DEFAULT_TARGET: &str = "default";

const SERVER_KEYS: &[&str] = &[
    "kubeConfig",
    "kubeContext",
    "namespace",
    "dryRun",
    "noHooks",
    "remoteTimeout",
];

const INSTALL_KEYS: &[&str] = &[
    "atomic",
    "createNamespace",
    "devel",
    "verify",
    "wait",
    "waitForJobs",
    "version",
    "skipCrds",
    "resetValues",
    "reuseValues",
];

const REPOSITORY_KEYS: &[&str] = &[
    "repository",
    "username",
    "password",
    "caFile",
    "certFile",
    "keyFile",
    "insecureSkipTlsVerify",
];

const VALUE_KEYS: &[&str] = &["values", "fileValues", "valueFiles"];

const RELEASE_KEYS: &[&str] = &[
    "releaseName",
    "chart",
    "tags",
    "valuesDirs",
    "replace",
    "historyMax",
    "keepHistory",
    "dependsOn",
    "mustInstallAfter",
    "mustUninstallAfter",
    "test",
    "forTargets",
];

const OVERRIDE_KEYS: &[&str] = &[
    "releaseName",
    "replace",
    "historyMax",
    "keepHistory",
    "mustInstallAfter",
    "mustUninstallAfter",
    "test",
];

/// A build file key that no option consumes
///
/// Sections mixing several option groups cannot reject unknown keys while
/// parsing, so they are collected here and reported by `lint`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey {
    /// Where the key appeared, e.g. `releases.app.forTargets.prod`
    pub section: String,
    pub key: String,
    /// Keys accepted in that section
    pub expected: Vec<&'static str>,
}

type ExtraKeys = IndexMap<String, serde_yaml::Value>;

/// Build-wide defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(flatten)]
    pub server: ServerOperationOptions,

    #[serde(flatten)]
    pub install: InstallationOptions,

    /// Release filter ANDed with every target's selector
    #[serde(default)]
    pub select_tags: Option<String>,

    #[serde(flatten)]
    pub unknown: ExtraKeys,
}

/// A chart declared by the build
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChartSpec {
    /// Packaged chart produced by the build; defaults to `build/helm/charts/<name>.tgz`
    #[serde(default)]
    pub package_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpec {
    #[serde(flatten)]
    pub server: ServerOperationOptions,

    #[serde(flatten)]
    pub install: InstallationOptions,

    #[serde(flatten)]
    pub values: ValueOptions,

    #[serde(default)]
    pub select_tags: Option<String>,

    #[serde(default)]
    pub test: TestOptions,

    #[serde(flatten)]
    pub unknown: ExtraKeys,
}

/// How a release refers to its chart
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChartSource {
    /// Path, URL or `repo/name`
    Location(String),

    /// File collection resolving to a single chart
    #[serde(rename_all = "camelCase")]
    Files {
        files: Vec<PathBuf>,
        #[serde(default)]
        built_by: Vec<String>,
    },

    /// A chart declared under `charts:`
    Declared { chart: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSpec {
    #[serde(default)]
    pub release_name: Option<String>,

    pub chart: ChartSource,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(flatten)]
    pub server: ServerOperationOptions,

    #[serde(flatten)]
    pub install: InstallationOptions,

    #[serde(flatten)]
    pub repository: InstallFromRepositoryOptions,

    #[serde(flatten)]
    pub values: ValueOptions,

    #[serde(default)]
    pub values_dirs: Vec<PathBuf>,

    #[serde(default)]
    pub replace: bool,

    #[serde(default)]
    pub history_max: Option<u32>,

    #[serde(default)]
    pub keep_history: bool,

    /// Releases that must be installed before this one
    #[serde(default)]
    pub depends_on: Vec<String>,

    #[serde(default)]
    pub must_install_after: Vec<String>,

    #[serde(default)]
    pub must_uninstall_after: Vec<String>,

    #[serde(default)]
    pub test: TestOptions,

    /// Overrides keyed by `""`, `"<target>"` or `"!<target>"`
    #[serde(default)]
    pub for_targets: IndexMap<String, OverrideSpec>,

    #[serde(flatten)]
    pub unknown: ExtraKeys,
}

/// Declarative target-specific override
///
/// Scalars that are set replace the resolved value; values are merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideSpec {
    #[serde(default)]
    pub release_name: Option<String>,

    #[serde(default)]
    pub replace: Option<bool>,

    #[serde(default)]
    pub history_max: Option<u32>,

    #[serde(default)]
    pub keep_history: Option<bool>,

    #[serde(flatten)]
    pub server: ServerOperationOptions,

    #[serde(flatten)]
    pub install: InstallationOptions,

    #[serde(flatten)]
    pub repository: InstallFromRepositoryOptions,

    #[serde(flatten)]
    pub values: ValueOptions,

    #[serde(default)]
    pub must_install_after: Vec<String>,

    #[serde(default)]
    pub must_uninstall_after: Vec<String>,

    #[serde(default)]
    pub test: TestOptions,

    #[serde(flatten)]
    pub unknown: ExtraKeys,
}

impl OverrideSpec {
    /// Apply this override to resolved properties
    pub fn apply(&self, props: &mut ResolvedReleaseProperties) {
        if let Some(name) = &self.release_name {
            props.release_name = name.clone();
        }
        if let Some(replace) = self.replace {
            props.replace = replace;
        }
        if self.history_max.is_some() {
            props.history_max = self.history_max;
        }
        if let Some(keep_history) = self.keep_history {
            props.keep_history = keep_history;
        }

        props.server.override_from(&self.server);
        props.install.override_from(&self.install);
        props.repository.override_from(&self.repository);
        props.test.override_from(&self.test);
        props.values.merge_values(&self.values);

        props
            .must_install_after
            .extend(self.must_install_after.iter().cloned());
        props
            .must_uninstall_after
            .extend(self.must_uninstall_after.iter().cloned());
    }
}

/// Raw build file contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildFile {
    #[serde(default)]
    pub helm: GlobalSettings,

    #[serde(default)]
    pub charts: IndexMap<String, ChartSpec>,

    #[serde(default)]
    pub targets: IndexMap<String, TargetSpec>,

    #[serde(default)]
    pub releases: IndexMap<String, ReleaseSpec>,
}

/// Declared targets and releases of one build
#[derive(Debug)]
pub struct Project {
    base_dir: PathBuf,
    global_selector: TagExpression,
    targets: IndexMap<String, ReleaseTarget>,
    releases: IndexMap<String, Release>,
    unknown_keys: Vec<UnknownKey>,
}

impl Project {
    /// Create an empty project rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            global_selector: TagExpression::always_match(),
            targets: IndexMap::new(),
            releases: IndexMap::new(),
            unknown_keys: Vec::new(),
        }
    }

    /// Load a build file; relative paths resolve against its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::from_yaml(&content, base_dir)
    }

    /// Parse a build file from YAML
    pub fn from_yaml(yaml: &str, base_dir: &Path) -> Result<Self> {
        let file: BuildFile = serde_yaml::from_str(yaml)?;
        Self::from_build_file(file, base_dir)
    }

    /// Build a project from parsed build file contents
    pub fn from_build_file(file: BuildFile, base_dir: &Path) -> Result<Self> {
        let mut project = Project::new(base_dir);

        if let Some(expression) = &file.helm.select_tags {
            project.global_selector = TagExpression::parse(expression)?;
        }
        project.note_unknown(
            "helm",
            &file.helm.unknown,
            &[SERVER_KEYS, INSTALL_KEYS, &["selectTags"]],
        );

        let mut targets = file.targets;
        if targets.is_empty() {
            targets.insert(DEFAULT_TARGET.to_string(), TargetSpec::default());
        }

        for (name, spec) in targets {
            project.note_unknown(
                &format!("targets.{}", name),
                &spec.unknown,
                &[SERVER_KEYS, INSTALL_KEYS, VALUE_KEYS, &["selectTags", "test"]],
            );
            let mut target = ReleaseTarget::new(name);
            target.server = spec.server;
            target.install = spec.install;
            target.values = spec.values;
            target.test = spec.test;
            if let Some(expression) = &spec.select_tags {
                target.set_select_tags(expression)?;
            }
            target.apply_global_defaults(&file.helm.server, &file.helm.install);
            project.add_target(target)?;
        }

        for (name, spec) in &file.releases {
            let section = format!("releases.{}", name);
            project.note_unknown(
                &section,
                &spec.unknown,
                &[SERVER_KEYS, INSTALL_KEYS, REPOSITORY_KEYS, VALUE_KEYS, RELEASE_KEYS],
            );
            for (key, overlay) in &spec.for_targets {
                project.note_unknown(
                    &format!("{}.forTargets.{}", section, key),
                    &overlay.unknown,
                    &[SERVER_KEYS, INSTALL_KEYS, REPOSITORY_KEYS, VALUE_KEYS, OVERRIDE_KEYS],
                );
            }

            let chart = chart_reference(name, &spec.chart, &file.charts)?;
            let release = build_release(name, spec.clone(), chart, base_dir)?;
            project.add_release(release)?;
        }

        for release in project.releases.values() {
            for dependency in &release.install_depends_on {
                if !project.releases.contains_key(dependency) {
                    return Err(CoreError::UnknownRelease {
                        name: dependency.clone(),
                    });
                }
            }
        }

        debug!(
            targets = project.targets.len(),
            releases = project.releases.len(),
            "Loaded build file"
        );

        Ok(project)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Keys the build file declared that no option consumes
    pub fn unknown_keys(&self) -> &[UnknownKey] {
        &self.unknown_keys
    }

    fn note_unknown(&mut self, section: &str, extra: &ExtraKeys, groups: &[&[&'static str]]) {
        for key in extra.keys() {
            warn!(section = %section, key = %key, "Ignoring unknown build file key");
            self.unknown_keys.push(UnknownKey {
                section: section.to_string(),
                key: key.clone(),
                expected: groups.concat(),
            });
        }
    }

    /// Register a target; names must be unique
    pub fn add_target(&mut self, target: ReleaseTarget) -> Result<()> {
        if self.targets.contains_key(target.name()) {
            return Err(CoreError::DuplicateTarget {
                name: target.name().to_string(),
            });
        }
        self.targets.insert(target.name().to_string(), target);
        Ok(())
    }

    /// Register a release; names must be unique
    pub fn add_release(&mut self, release: Release) -> Result<()> {
        if self.releases.contains_key(release.name()) {
            return Err(CoreError::DuplicateRelease {
                name: release.name().to_string(),
            });
        }
        self.releases.insert(release.name().to_string(), release);
        Ok(())
    }

    pub fn target(&self, name: &str) -> Result<&ReleaseTarget> {
        self.targets.get(name).ok_or_else(|| CoreError::UnknownTarget {
            name: name.to_string(),
        })
    }

    pub fn release(&self, name: &str) -> Result<&Release> {
        self.releases.get(name).ok_or_else(|| CoreError::UnknownRelease {
            name: name.to_string(),
        })
    }

    /// Targets in declaration order
    pub fn targets(&self) -> impl Iterator<Item = &ReleaseTarget> {
        self.targets.values()
    }

    /// Releases in declaration order
    pub fn releases(&self) -> impl Iterator<Item = &Release> {
        self.releases.values()
    }

    pub(crate) fn release_index(&self, name: &str) -> Option<usize> {
        self.releases.get_index_of(name)
    }

    pub fn global_selector(&self) -> &TagExpression {
        &self.global_selector
    }

    pub fn set_global_selector(&mut self, selector: TagExpression) {
        self.global_selector = selector;
    }

    /// Effective selector for a target: its own AND the build-wide one AND `extra`
    pub fn selector_for(
        &self,
        target: &ReleaseTarget,
        extra: Option<&TagExpression>,
    ) -> TagExpression {
        let selector = target.selector().clone().and(self.global_selector.clone());
        match extra {
            Some(extra) => selector.and(extra.clone()),
            None => selector,
        }
    }

    /// Resolve a release for a target by name
    pub fn resolve(&self, release: &str, target: &str) -> Result<Arc<ResolvedReleaseProperties>> {
        let target = self.target(target)?;
        self.release(release)?.resolve_for_target(target)
    }
}

fn chart_reference(
    release: &str,
    source: &ChartSource,
    charts: &IndexMap<String, ChartSpec>,
) -> Result<ChartReference> {
    Ok(match source {
        ChartSource::Location(location) => ChartReference::location(location.clone()),
        ChartSource::Files { files, built_by } => {
            ChartReference::files(files.iter().cloned(), built_by.clone())
        }
        ChartSource::Declared { chart } => {
            let spec = charts.get(chart).ok_or_else(|| CoreError::UnknownChart {
                name: chart.clone(),
                release: release.to_string(),
            })?;
            let package_file = spec
                .package_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("build/helm/charts/{}.tgz", chart)));
            ChartReference::packaged(chart.clone(), package_file)
        }
    })
}

fn build_release(
    name: &str,
    spec: ReleaseSpec,
    chart: ChartReference,
    base_dir: &Path,
) -> Result<Release> {
    let mut release = Release::new(name, chart).with_base_dir(base_dir);
    release.release_name = spec.release_name;
    release.add_tags(spec.tags);
    release.server = spec.server;
    release.install = spec.install;
    release.repository = spec.repository;
    release.values = spec.values;
    release.values_dirs = spec.values_dirs;
    release.replace = spec.replace;
    release.history_max = spec.history_max;
    release.keep_history = spec.keep_history;
    release.install_depends_on.extend(spec.depends_on);
    release.must_install_after.extend(spec.must_install_after);
    release.must_uninstall_after.extend(spec.must_uninstall_after);
    release.test = spec.test;

    for (key, overlay) in spec.for_targets {
        release.for_target(&key, move |props| {
            overlay.apply(props);
            Ok(())
        })?;
    }

    Ok(release)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;
    use std::time::Duration;

    const BUILD_FILE: &str = r#"
helm:
  namespace: apps
  remoteTimeout: 5m
  atomic: true

charts:
  backend:
    packageFile: build/backend-1.0.0.tgz

targets:
  local:
    kubeContext: kind-local
    selectTags: "!prod-only"
    wait: false
    values:
      replicas: 1
    test:
      enabled: false
  prod:
    kubeContext: prod-cluster
    namespace: production
    wait: true

releases:
  backend:
    chart:
      chart: backend
    tags: [core]
    values:
      image.tag: "1.4.2"
    forTargets:
      "":
        createNamespace: true
      "!local":
        values:
          replicas: 3
      prod:
        historyMax: 0
        atomic: false

  frontend:
    releaseName: web
    chart: ./charts/frontend
    dependsOn: [backend]
    wait: true

  monitoring:
    chart: prometheus-community/kube-prometheus-stack
    repository: https://prometheus-community.github.io/helm-charts
    version: "45.0.0"
    tags: [prod-only]
"#;

    fn project() -> Project {
        Project::from_yaml(BUILD_FILE, Path::new("/work")).unwrap()
    }

    #[test]
    fn test_load_declarations() {
        let project = project();

        let targets: Vec<&str> = project.targets().map(|t| t.name()).collect();
        assert_eq!(targets, vec!["local", "prod"]);

        let releases: Vec<&str> = project.releases().map(|r| r.name()).collect();
        assert_eq!(releases, vec!["backend", "frontend", "monitoring"]);

        let frontend = project.release("frontend").unwrap();
        assert_eq!(frontend.release_name(), "web");
        assert!(frontend.install_depends_on.contains("backend"));
        assert_eq!(frontend.base_dir(), Path::new("/work"));
    }

    #[test]
    fn test_global_defaults_reach_targets() {
        let project = project();

        let local = project.target("local").unwrap();
        assert_eq!(local.server.namespace.as_deref(), Some("apps"));
        assert_eq!(local.server.remote_timeout, Some(Duration::from_secs(300)));
        assert_eq!(local.install.atomic, Some(true));

        let prod = project.target("prod").unwrap();
        assert_eq!(prod.server.namespace.as_deref(), Some("production"));
    }

    #[test]
    fn test_four_layer_resolution() {
        let project = project();

        let local = project.resolve("backend", "local").unwrap();
        assert_eq!(local.server.kube_context.as_deref(), Some("kind-local"));
        assert_eq!(local.install.atomic, Some(true));
        assert_eq!(local.install.create_namespace, Some(true));
        assert_eq!(local.values.values["replicas"], json!(1));
        assert_eq!(local.values.values["image.tag"], json!("1.4.2"));
        assert_eq!(local.history_max, None);
        assert_eq!(local.test.enabled, Some(false));

        let prod = project.resolve("backend", "prod").unwrap();
        assert_eq!(prod.server.namespace.as_deref(), Some("production"));
        assert_eq!(prod.install.atomic, Some(false));
        assert_eq!(prod.install.wait, Some(true));
        assert_eq!(prod.values.values["replicas"], json!(3));
        assert_eq!(prod.history_max, Some(0));
        assert_eq!(prod.test.timeout, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_chart_sources() {
        let project = project();

        let backend = project.release("backend").unwrap();
        assert_eq!(
            backend.chart.build_dependencies(),
            vec!["helmPackageBackendChart".to_string()]
        );

        let monitoring = project.resolve("monitoring", "prod").unwrap();
        assert_eq!(
            monitoring.chart_location().unwrap(),
            "prometheus-community/kube-prometheus-stack"
        );
        assert_eq!(monitoring.install.version.as_deref(), Some("45.0.0"));
        assert_eq!(
            monitoring.repository.repository.as_deref(),
            Some("https://prometheus-community.github.io/helm-charts")
        );
    }

    #[test]
    fn test_default_target_is_created() {
        let project = Project::from_yaml(
            "releases:\n  app:\n    chart: charts/app\n",
            Path::new("."),
        )
        .unwrap();

        let targets: Vec<&str> = project.targets().map(|t| t.name()).collect();
        assert_eq!(targets, vec![DEFAULT_TARGET]);
    }

    #[test]
    fn test_unknown_chart_is_rejected() {
        let err = Project::from_yaml(
            "releases:\n  app:\n    chart: { chart: missing }\n",
            Path::new("."),
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::UnknownChart { .. }));
    }

    #[test]
    fn test_unknown_dependency_is_rejected() {
        let err = Project::from_yaml(
            "releases:\n  app:\n    chart: charts/app\n    dependsOn: [db]\n",
            Path::new("."),
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::UnknownRelease { ref name } if name == "db"));
    }

    #[test]
    fn test_malformed_selector_fails_at_load() {
        let err = Project::from_yaml(
            "targets:\n  local:\n    selectTags: \"a,,b\"\n",
            Path::new("."),
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::InvalidExpression { .. }));
    }

    #[test]
    fn test_bare_negation_override_fails_at_load() {
        let err = Project::from_yaml(
            "releases:\n  app:\n    chart: charts/app\n    forTargets:\n      \"!\": { wait: true }\n",
            Path::new("."),
        )
        .unwrap_err();

        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_unknown_keys_are_recorded() {
        let project = Project::from_yaml(
            r#"
helm:
  namepsace: apps
targets:
  prod:
    kubeContxt: prod-cluster
releases:
  app:
    chart: charts/app
    dependOn: [db]
    forTargets:
      prod:
        wiat: true
        atomic: true
"#,
            Path::new("/work"),
        )
        .unwrap();

        let found: Vec<(&str, &str)> = project
            .unknown_keys()
            .iter()
            .map(|k| (k.section.as_str(), k.key.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("helm", "namepsace"),
                ("targets.prod", "kubeContxt"),
                ("releases.app", "dependOn"),
                ("releases.app.forTargets.prod", "wiat"),
            ]
        );

        let wiat = &project.unknown_keys()[3];
        assert!(wiat.expected.contains(&"wait"));
        assert!(!wiat.expected.contains(&"forTargets"));

        let prod = project.target("prod").unwrap();
        let props = project.release("app").unwrap().resolve_for_target(prod).unwrap();
        assert_eq!(props.install.atomic, Some(true));
        assert_eq!(props.install.wait, None);
    }

    #[test]
    fn test_unknown_keys_in_closed_sections_fail_at_load() {
        for yaml in [
            "relases:\n  app:\n    chart: charts/app\n",
            "charts:\n  app:\n    packgeFile: app.tgz\n",
            "releases:\n  app:\n    chart: charts/app\n    test: { enabeld: false }\n",
        ] {
            assert!(Project::from_yaml(yaml, Path::new(".")).is_err(), "{}", yaml);
        }
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut project = Project::new(".");
        project.add_target(ReleaseTarget::new("local")).unwrap();

        assert!(matches!(
            project.add_target(ReleaseTarget::new("local")),
            Err(CoreError::DuplicateTarget { .. })
        ));

        project
            .add_release(Release::new("app", ChartReference::location("app")))
            .unwrap();
        assert!(matches!(
            project.add_release(Release::new("app", ChartReference::location("app"))),
            Err(CoreError::DuplicateRelease { .. })
        ));
    }

    #[test]
    fn test_selector_for_combines_filters() {
        let mut project = project();
        project.set_global_selector(TagExpression::parse("!experimental").unwrap());
        let local = project.target("local").unwrap();

        let extra = TagExpression::parse("core").unwrap();
        let selector = project.selector_for(local, Some(&extra));

        let tags = |items: &[&str]| -> BTreeSet<String> {
            items.iter().map(|s| s.to_string()).collect()
        };
        assert!(selector.matches(&tags(&["core"])));
        assert!(!selector.matches(&tags(&["core", "prod-only"])));
        assert!(!selector.matches(&tags(&["core", "experimental"])));
        assert!(!selector.matches(&tags(&["web"])));
    }
}
