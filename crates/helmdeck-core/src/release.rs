//! Release declarations and per-target resolution
//!
//! A [`Release`] is declared once and resolved separately for every target
//! it is installed to. Resolution merges four layers, from weakest to
//! strongest:
//!
//! 1. build-wide defaults (applied to targets when they are declared)
//! 2. target defaults
//! 3. the release declaration itself
//! 4. target-specific override actions registered on the release
//!
//! Results are cached per target name, so every caller gets the same
//! [`ResolvedReleaseProperties`] and override actions run at most once.

use once_cell::sync::OnceCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace};

use crate::chart::ChartReference;
use crate::error::{CoreError, Result};
use crate::options::{
    InstallFromRepositoryOptions, InstallationOptions, Layered, ServerOperationOptions,
    TestOptions, ValueOptions,
};
use crate::resolved::ResolvedReleaseProperties;
use crate::tags::TagExpression;
use crate::target::ReleaseTarget;

/// Values file applied to every target
pub const VALUES_FILE: &str = "values.yaml";

/// Mutation applied to the resolved properties of matching targets
pub type TargetAction =
    Arc<dyn Fn(&mut ResolvedReleaseProperties) -> Result<()> + Send + Sync>;

/// Which targets an override action applies to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetSelector {
    /// `""`: every target
    Any,
    /// `"name"`: only this target
    Only(String),
    /// `"!name"`: every target except this one
    Except(String),
}

impl TargetSelector {
    /// Parse a selector key such as `""`, `"prod"` or `"!local"`
    ///
    /// A negation without a target name is rejected.
    pub fn parse(key: &str) -> Result<Self> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(TargetSelector::Any);
        }
        match key.strip_prefix('!').map(str::trim) {
            Some("") => Err(CoreError::InvalidConfig {
                message: format!("target selector '{}' is missing a target name", key),
            }),
            Some(name) => Ok(TargetSelector::Except(name.to_string())),
            None => Ok(TargetSelector::Only(key.to_string())),
        }
    }

    pub fn applies_to(&self, target: &str) -> bool {
        match self {
            TargetSelector::Any => true,
            TargetSelector::Only(name) => name == target,
            TargetSelector::Except(name) => name != target,
        }
    }

    /// Target name mentioned by the selector, if any
    pub fn target_name(&self) -> Option<&str> {
        match self {
            TargetSelector::Any => None,
            TargetSelector::Only(name) | TargetSelector::Except(name) => Some(name),
        }
    }

    /// Position in the execution order: any, then negative, then positive
    fn rank(&self) -> u8 {
        match self {
            TargetSelector::Any => 0,
            TargetSelector::Except(_) => 1,
            TargetSelector::Only(_) => 2,
        }
    }
}

impl fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSelector::Any => write!(f, ""),
            TargetSelector::Only(name) => write!(f, "{}", name),
            TargetSelector::Except(name) => write!(f, "!{}", name),
        }
    }
}

type ResolutionCell = Arc<OnceCell<Arc<ResolvedReleaseProperties>>>;

/// A named Helm release declaration
pub struct Release {
    name: String,

    /// Helm release name; defaults to the declaration name
    pub release_name: Option<String>,

    pub chart: ChartReference,

    pub server: ServerOperationOptions,
    pub install: InstallationOptions,
    pub repository: InstallFromRepositoryOptions,
    pub values: ValueOptions,
    pub test: TestOptions,

    /// Directories searched for `values.yaml` and `values-<target>.yaml`
    pub values_dirs: Vec<PathBuf>,

    pub replace: bool,
    pub history_max: Option<u32>,
    pub keep_history: bool,

    pub install_depends_on: BTreeSet<String>,
    pub must_install_after: BTreeSet<String>,
    pub must_uninstall_after: BTreeSet<String>,

    tags: BTreeSet<String>,
    base_dir: PathBuf,
    actions: Vec<(TargetSelector, TargetAction)>,
    resolved: Mutex<HashMap<String, ResolutionCell>>,
}

impl Release {
    pub fn new(name: impl Into<String>, chart: ChartReference) -> Self {
        Self {
            name: name.into(),
            release_name: None,
            chart,
            server: ServerOperationOptions::default(),
            install: InstallationOptions::default(),
            repository: InstallFromRepositoryOptions::default(),
            values: ValueOptions::default(),
            test: TestOptions::default(),
            values_dirs: Vec::new(),
            replace: false,
            history_max: None,
            keep_history: false,
            install_depends_on: BTreeSet::new(),
            must_install_after: BTreeSet::new(),
            must_uninstall_after: BTreeSet::new(),
            tags: BTreeSet::new(),
            base_dir: PathBuf::from("."),
            actions: Vec::new(),
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// Set the directory relative paths are resolved against
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Effective Helm release name
    pub fn release_name(&self) -> &str {
        self.release_name.as_deref().unwrap_or(&self.name)
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Add a tag; tags can only be added, never removed
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
    }

    /// Whether a target with the given selector installs this release
    ///
    /// Untagged releases are selected by every target.
    pub fn is_selected_by(&self, selector: &TagExpression) -> bool {
        self.tags.is_empty() || selector.matches(&self.tags)
    }

    /// Register an override for targets matching `key` (`""`, `"name"`, `"!name"`)
    pub fn for_target<F>(&mut self, key: &str, action: F) -> Result<()>
    where
        F: Fn(&mut ResolvedReleaseProperties) -> Result<()> + Send + Sync + 'static,
    {
        self.actions.push((TargetSelector::parse(key)?, Arc::new(action)));
        Ok(())
    }

    /// Register an override for every target
    pub fn for_any_target<F>(&mut self, action: F)
    where
        F: Fn(&mut ResolvedReleaseProperties) -> Result<()> + Send + Sync + 'static,
    {
        self.actions.push((TargetSelector::Any, Arc::new(action)));
    }

    /// Selectors of all registered overrides, in declaration order
    pub fn target_selectors(&self) -> impl Iterator<Item = &TargetSelector> {
        self.actions.iter().map(|(selector, _)| selector)
    }

    /// Resolve this release for a target, reusing an earlier result
    ///
    /// The first call for a target name runs the full merge pipeline; later
    /// calls return the same `Arc`. Concurrent callers for the same target
    /// wait for the first one instead of resolving twice. A failed
    /// resolution leaves nothing cached.
    pub fn resolve_for_target(
        &self,
        target: &ReleaseTarget,
    ) -> Result<Arc<ResolvedReleaseProperties>> {
        let cell = {
            let mut resolved = self.resolved.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(resolved.entry(target.name().to_string()).or_default())
        };

        cell.get_or_try_init(|| self.resolve_uncached(target).map(Arc::new))
            .map(Arc::clone)
    }

    /// Whether a resolution for the target name is cached
    pub fn is_resolved_for(&self, target: &str) -> bool {
        self.resolved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(target)
            .is_some_and(|cell| cell.get().is_some())
    }

    fn resolve_uncached(&self, target: &ReleaseTarget) -> Result<ResolvedReleaseProperties> {
        debug!(release = %self.name, target = %target.name(), "Resolving release");

        let mut props = ResolvedReleaseProperties::new(
            &self.name,
            target.name(),
            self.chart.clone(),
            &self.base_dir,
        );

        // Release-only groups
        props.repository.set_from(&self.repository);

        // Shared groups: release wins, target fills the gaps
        props.server.set_from(&self.server.with_defaults(&target.server));
        props.install.set_from(&self.install.with_defaults(&target.install));

        props.release_name = self.release_name().to_string();
        props.replace = self.replace;
        props.history_max = self.history_max;
        props.keep_history = self.keep_history;
        props.install_depends_on = self.install_depends_on.clone();
        props.must_install_after = self.must_install_after.clone();
        props.must_uninstall_after = self.must_uninstall_after.clone();

        props.test.set_from(&self.test.with_defaults(&target.test));
        props.test.conventions_from(&TestOptions {
            enabled: Some(true),
            show_logs: None,
            timeout: props.server.remote_timeout,
        });

        props.values.merge_values(&target.values);
        props.values.merge_values(&self.values);
        self.merge_values_dir_files(&mut props.values, VALUES_FILE);
        self.merge_values_dir_files(&mut props.values, &format!("values-{}.yaml", target.name()));

        let mut actions: Vec<&(TargetSelector, TargetAction)> = self
            .actions
            .iter()
            .filter(|(selector, _)| selector.applies_to(target.name()))
            .collect();
        // stable: keeps declaration order within a rank
        actions.sort_by_key(|(selector, _)| selector.rank());

        for (selector, action) in actions {
            trace!(release = %self.name, target = %target.name(), selector = %selector, "Applying override");
            action(&mut props)?;
        }

        Ok(props)
    }

    fn merge_values_dir_files(&self, values: &mut ValueOptions, file_name: &str) {
        for dir in &self.values_dirs {
            let candidate = dir.join(file_name);
            if self.base_dir.join(&candidate).is_file() {
                trace!(release = %self.name, file = %candidate.display(), "Found values file");
                values.add_value_file(candidate);
            }
        }
    }
}

impl fmt::Debug for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Release")
            .field("name", &self.name)
            .field("release_name", &self.release_name)
            .field("chart", &self.chart)
            .field("tags", &self.tags)
            .field("values_dirs", &self.values_dirs)
            .field(
                "overrides",
                &self.target_selectors().map(ToString::to_string).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
