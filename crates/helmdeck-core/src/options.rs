//! Options groups and their merge operations
//!
//! Every group is a plain struct of optional scalars. A value that is `None`
//! is unset and defers to a less specific layer (or, when unset everywhere,
//! to Helm's own default). Three operations combine layers:
//!
//! - [`Layered::with_defaults`]: a new group where `self` wins and `fallback`
//!   fills the gaps
//! - [`Layered::set_from`]: hard copy, the source replaces everything
//! - [`Layered::conventions_from`]: fill only what is still unset
//!
//! Map and list valued options live in [`ValueOptions`] and accumulate via
//! [`ValueOptions::merge_values`] instead.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::time::Duration;

/// Shown in place of credentials whenever options are displayed or serialized
pub const SECRET_MASK: &str = "******";

/// Merge operations shared by all scalar options groups
pub trait Layered: Clone {
    /// Fill every unset scalar of `self` from `source`
    fn conventions_from(&mut self, source: &Self);

    /// Copy of `self` with unset scalars taken from `fallback`
    fn with_defaults(&self, fallback: &Self) -> Self {
        let mut merged = self.clone();
        merged.conventions_from(fallback);
        merged
    }

    /// Replace every scalar of `self` with the one from `source`
    fn set_from(&mut self, source: &Self) {
        *self = source.clone();
    }

    /// Apply every scalar that is set in `overlay`, keeping the rest
    fn override_from(&mut self, overlay: &Self) {
        *self = overlay.with_defaults(self);
    }
}

macro_rules! impl_layered {
    ($group:ty { $($field:ident),+ $(,)? }) => {
        impl Layered for $group {
            fn conventions_from(&mut self, source: &Self) {
                $(
                    if self.$field.is_none() {
                        self.$field = source.$field.clone();
                    }
                )+
            }
        }
    };
}

/// Cluster connection and per-operation server settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerOperationOptions {
    /// Path to the kubeconfig file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_config: Option<PathBuf>,

    /// Name of the kubeconfig context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_context: Option<String>,

    /// Namespace scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Simulate the operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,

    /// Skip hooks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_hooks: Option<bool>,

    /// Time to wait for any individual Kubernetes operation
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub remote_timeout: Option<Duration>,
}

impl_layered!(ServerOperationOptions {
    kube_config,
    kube_context,
    namespace,
    dry_run,
    no_hooks,
    remote_timeout,
});

/// Flags for `helm install` and `helm upgrade`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atomic: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_namespace: Option<bool>,

    /// Use development chart versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devel: Option<bool>,

    /// Verify the chart provenance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for_jobs: Option<bool>,

    /// Chart version constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_crds: Option<bool>,

    /// Upgrade only: reset values to the chart defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_values: Option<bool>,

    /// Upgrade only: reuse the last release's values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reuse_values: Option<bool>,
}

impl_layered!(InstallationOptions {
    atomic,
    create_namespace,
    devel,
    verify,
    wait,
    wait_for_jobs,
    version,
    skip_crds,
    reset_values,
    reuse_values,
});

/// Chart repository and credentials for installing straight from a repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallFromRepositoryOptions {
    /// Chart repository URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Never serialized in clear text
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "mask_secret"
    )]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_skip_tls_verify: Option<bool>,
}

impl_layered!(InstallFromRepositoryOptions {
    repository,
    username,
    password,
    ca_file,
    cert_file,
    key_file,
    insecure_skip_tls_verify,
});

fn mask_secret<S: Serializer>(secret: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match secret {
        Some(_) => serializer.serialize_some(SECRET_MASK),
        None => serializer.serialize_none(),
    }
}

/// Settings for `helm test`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestOptions {
    /// Whether the release is tested at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Dump the logs from test pods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_logs: Option<bool>,

    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

impl_layered!(TestOptions {
    enabled,
    show_logs,
    timeout,
});

/// Template values passed to Helm
///
/// `values` become `--set` style arguments, `file_values` become `--set-file`
/// and `value_files` become `-f` in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueOptions {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub values: IndexMap<String, JsonValue>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub file_values: IndexMap<String, PathBuf>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_files: Vec<PathBuf>,
}

impl ValueOptions {
    /// Add all entries of `source` without clearing existing ones
    ///
    /// On key collision the entry from `source` wins. Value files are
    /// appended in their original order.
    pub fn merge_values(&mut self, source: &ValueOptions) {
        for (key, value) in &source.values {
            self.values.insert(key.clone(), value.clone());
        }
        for (key, path) in &source.file_values {
            self.file_values.insert(key.clone(), path.clone());
        }
        self.value_files.extend(source.value_files.iter().cloned());
    }

    /// Set a single value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Append a values file
    pub fn add_value_file(&mut self, path: impl Into<PathBuf>) {
        self.value_files.push(path.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.file_values.is_empty() && self.value_files.is_empty()
    }
}
