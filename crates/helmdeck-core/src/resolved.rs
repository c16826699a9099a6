//! Fully resolved per-target release configuration

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::chart::ChartReference;
use crate::error::Result;
use crate::options::{
    InstallFromRepositoryOptions, InstallationOptions, ServerOperationOptions, TestOptions,
    ValueOptions,
};

/// Helm's own history limit when none is configured
pub const HELM_DEFAULT_HISTORY_MAX: u32 = 10;

/// The configuration of one release for one target, with all layers merged
///
/// Produced by [`Release::resolve_for_target`](crate::Release::resolve_for_target)
/// and shared read-only afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedReleaseProperties {
    /// Name of the release declaration
    pub name: String,

    /// Name of the target this was resolved for
    pub target: String,

    /// Name of the Helm release
    pub release_name: String,

    pub chart: ChartReference,

    /// Install only: re-use a deleted release name
    pub replace: bool,

    /// Upgrade only: maximum revisions kept; `Some(0)` means unlimited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_max: Option<u32>,

    /// Uninstall only: keep the release history
    pub keep_history: bool,

    pub server: ServerOperationOptions,
    pub install: InstallationOptions,
    pub repository: InstallFromRepositoryOptions,
    pub values: ValueOptions,
    pub test: TestOptions,

    /// Releases that must be installed (and are pulled in) before this one
    pub install_depends_on: BTreeSet<String>,

    /// Releases to install first when both are installed
    pub must_install_after: BTreeSet<String>,

    /// Releases to uninstall first when both are uninstalled
    pub must_uninstall_after: BTreeSet<String>,

    #[serde(skip)]
    base_dir: PathBuf,
}

impl ResolvedReleaseProperties {
    pub(crate) fn new(
        name: &str,
        target: &str,
        chart: ChartReference,
        base_dir: &Path,
    ) -> Self {
        Self {
            name: name.to_string(),
            target: target.to_string(),
            release_name: name.to_string(),
            chart,
            replace: false,
            history_max: None,
            keep_history: false,
            server: ServerOperationOptions::default(),
            install: InstallationOptions::default(),
            repository: InstallFromRepositoryOptions::default(),
            values: ValueOptions::default(),
            test: TestOptions::default(),
            install_depends_on: BTreeSet::new(),
            must_install_after: BTreeSet::new(),
            must_uninstall_after: BTreeSet::new(),
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// Directory that relative paths are resolved against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a path against the base directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    /// Dereference the chart; fails if it has not been built yet
    pub fn chart_location(&self) -> Result<String> {
        self.chart.chart_location(&self.base_dir)
    }

    /// Whether `helm test` should run for this release
    pub fn test_enabled(&self) -> bool {
        self.test.enabled.unwrap_or(true)
    }

    /// History limit Helm will apply
    pub fn effective_history_max(&self) -> u32 {
        self.history_max.unwrap_or(HELM_DEFAULT_HISTORY_MAX)
    }
}
