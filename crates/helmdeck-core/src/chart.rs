//! Chart references
//!
//! A [`ChartReference`] says where a chart lives without requiring it to
//! exist yet. Packaged charts are usually produced by an earlier build step,
//! so dereferencing is deferred until [`ChartReference::chart_location`] is
//! called by whoever actually runs Helm.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CoreError, Result};

type LocationFn = dyn Fn() -> Result<String> + Send + Sync;

/// Where to find a chart
#[derive(Clone)]
pub enum ChartReference {
    /// Path, URL or `repo/name` reference
    ///
    /// Local paths are resolved against the build directory, anything else is
    /// handed to Helm unchanged.
    Location(String),

    /// Files that must resolve to exactly one chart file or directory
    Files {
        paths: Vec<PathBuf>,
        built_by: Vec<String>,
    },

    /// Packaged output of a chart declared in the same build
    Packaged { chart: String, package_file: PathBuf },

    /// Location computed on demand
    Deferred {
        description: String,
        built_by: Vec<String>,
        resolve: Arc<LocationFn>,
    },
}

impl ChartReference {
    /// Reference a chart by path, URL or repository name
    pub fn location(location: impl Into<String>) -> Self {
        ChartReference::Location(location.into())
    }

    /// Reference a file collection produced by the given build steps
    pub fn files<I, P>(paths: I, built_by: Vec<String>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        ChartReference::Files {
            paths: paths.into_iter().map(Into::into).collect(),
            built_by,
        }
    }

    /// Reference the packaged output of a declared chart
    pub fn packaged(chart: impl Into<String>, package_file: impl Into<PathBuf>) -> Self {
        ChartReference::Packaged {
            chart: chart.into(),
            package_file: package_file.into(),
        }
    }

    /// Reference a location that is only known once `resolve` can run
    pub fn deferred<F>(description: impl Into<String>, built_by: Vec<String>, resolve: F) -> Self
    where
        F: Fn() -> Result<String> + Send + Sync + 'static,
    {
        ChartReference::Deferred {
            description: description.into(),
            built_by,
            resolve: Arc::new(resolve),
        }
    }

    /// Names of the build steps that must run before the location is valid
    pub fn build_dependencies(&self) -> Vec<String> {
        match self {
            ChartReference::Location(_) => Vec::new(),
            ChartReference::Files { built_by, .. } | ChartReference::Deferred { built_by, .. } => {
                built_by.clone()
            }
            ChartReference::Packaged { chart, .. } => vec![package_step_name(chart)],
        }
    }

    /// Dereference the chart, relative paths resolved against `base_dir`
    ///
    /// Fails when the referenced artifact does not exist (yet).
    pub fn chart_location(&self, base_dir: &Path) -> Result<String> {
        match self {
            ChartReference::Location(location) => Ok(local_location(location, base_dir)),
            ChartReference::Files { paths, built_by } => {
                let existing: Vec<PathBuf> = paths
                    .iter()
                    .map(|p| base_dir.join(p))
                    .filter(|p| p.exists())
                    .collect();
                match existing.as_slice() {
                    [single] => Ok(single.display().to_string()),
                    [] if paths.is_empty() => Err(CoreError::ChartNotFound {
                        location: "<empty file collection>".to_string(),
                        built_by: built_by.clone(),
                    }),
                    [] => Err(CoreError::ChartNotFound {
                        location: paths
                            .iter()
                            .map(|p| base_dir.join(p).display().to_string())
                            .collect::<Vec<_>>()
                            .join(", "),
                        built_by: built_by.clone(),
                    }),
                    _ => Err(CoreError::AmbiguousChart {
                        count: existing.len(),
                    }),
                }
            }
            ChartReference::Packaged { chart, package_file } => {
                let path = base_dir.join(package_file);
                if path.exists() {
                    Ok(path.display().to_string())
                } else {
                    Err(CoreError::ChartNotFound {
                        location: path.display().to_string(),
                        built_by: vec![package_step_name(chart)],
                    })
                }
            }
            ChartReference::Deferred { resolve, .. } => resolve(),
        }
    }
}

/// Build step name that packages the given chart, e.g. `helmPackageBackendChart`
pub fn package_step_name(chart: &str) -> String {
    let mut capitalized = String::with_capacity(chart.len());
    let mut upper_next = true;
    for c in chart.chars() {
        if c == '-' || c == '_' || c == '.' {
            upper_next = true;
        } else if upper_next {
            capitalized.extend(c.to_uppercase());
            upper_next = false;
        } else {
            capitalized.push(c);
        }
    }
    format!("helmPackage{}Chart", capitalized)
}

impl fmt::Display for ChartReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartReference::Location(location) => write!(f, "{}", location),
            ChartReference::Files { paths, .. } => {
                let rendered: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                write!(f, "{}", rendered.join(", "))
            }
            ChartReference::Packaged {
                chart,
                package_file,
            } => write!(f, "{} ({})", package_file.display(), chart),
            ChartReference::Deferred { description, .. } => write!(f, "{}", description),
        }
    }
}

impl fmt::Debug for ChartReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChartReference")
            .field(&self.to_string())
            .finish()
    }
}

impl Serialize for ChartReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `./` and `../` paths, or paths that exist under `base_dir`, are local charts
fn local_location(location: &str, base_dir: &Path) -> String {
    if location.contains("://") || Path::new(location).is_absolute() {
        return location.to_string();
    }

    let explicit = location.starts_with("./") || location.starts_with("../");
    let relative = location.strip_prefix("./").unwrap_or(location);
    let path = base_dir.join(relative);
    if explicit || path.exists() {
        path.display().to_string()
    } else {
        location.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_literal_location() {
        let chart = ChartReference::location("bitnami/nginx");

        assert_eq!(
            chart.chart_location(Path::new("/unused")).unwrap(),
            "bitnami/nginx"
        );
        assert!(chart.build_dependencies().is_empty());
    }

    #[test]
    fn test_local_location_follows_base_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("charts/app")).unwrap();
        let expected = dir.path().join("charts/app").display().to_string();

        let dotted = ChartReference::location("./charts/app");
        assert_eq!(dotted.chart_location(dir.path()).unwrap(), expected);

        let bare = ChartReference::location("charts/app");
        assert_eq!(bare.chart_location(dir.path()).unwrap(), expected);

        let parent = ChartReference::location("../shared/app");
        assert_eq!(
            parent.chart_location(Path::new("/work/deploy")).unwrap(),
            Path::new("/work/deploy").join("../shared/app").display().to_string()
        );

        for remote in ["bitnami/nginx", "oci://registry.example.com/charts/app", "/abs/app"] {
            let chart = ChartReference::location(remote);
            assert_eq!(chart.chart_location(dir.path()).unwrap(), remote);
        }
    }

    #[test]
    fn test_packaged_chart_is_deferred() {
        let dir = TempDir::new().unwrap();
        let chart = ChartReference::packaged("my-backend", "build/backend-1.0.0.tgz");

        assert_eq!(
            chart.build_dependencies(),
            vec!["helmPackageMyBackendChart".to_string()]
        );

        let err = chart.chart_location(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::ChartNotFound { .. }));
        assert!(err.to_string().contains("helmPackageMyBackendChart"));

        std::fs::create_dir_all(dir.path().join("build")).unwrap();
        std::fs::write(dir.path().join("build/backend-1.0.0.tgz"), b"").unwrap();

        let location = chart.chart_location(dir.path()).unwrap();
        assert!(location.ends_with("backend-1.0.0.tgz"));
    }

    #[test]
    fn test_files_must_resolve_to_one_entry() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.tgz"), b"").unwrap();
        std::fs::write(dir.path().join("b.tgz"), b"").unwrap();

        let single = ChartReference::files(["a.tgz", "missing.tgz"], vec!["build".into()]);
        assert!(single.chart_location(dir.path()).unwrap().ends_with("a.tgz"));
        assert_eq!(single.build_dependencies(), vec!["build".to_string()]);

        let both = ChartReference::files(["a.tgz", "b.tgz"], vec![]);
        assert!(matches!(
            both.chart_location(dir.path()),
            Err(CoreError::AmbiguousChart { count: 2 })
        ));

        let none = ChartReference::files(["missing.tgz"], vec![]);
        assert!(matches!(
            none.chart_location(dir.path()),
            Err(CoreError::ChartNotFound { .. })
        ));
    }

    #[test]
    fn test_deferred_location() {
        let chart = ChartReference::deferred("computed", vec!["prepare".into()], || {
            Ok("/charts/app".to_string())
        });

        assert_eq!(chart.to_string(), "computed");
        assert_eq!(
            chart.chart_location(Path::new(".")).unwrap(),
            "/charts/app"
        );
    }

    #[test]
    fn test_package_step_name() {
        assert_eq!(package_step_name("web"), "helmPackageWebChart");
        assert_eq!(package_step_name("web-api"), "helmPackageWebApiChart");
    }
}
