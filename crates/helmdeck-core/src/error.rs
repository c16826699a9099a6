//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid tag expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("Release target already declared: {name}")]
    DuplicateTarget { name: String },

    #[error("Release already declared: {name}")]
    DuplicateRelease { name: String },

    #[error("Unknown release target: {name}")]
    UnknownTarget { name: String },

    #[error("Unknown release: {name}")]
    UnknownRelease { name: String },

    #[error("Unknown chart '{name}' referenced by release {release}")]
    UnknownChart { name: String, release: String },

    #[error("Chart not found at {location}{}", build_hint(.built_by))]
    ChartNotFound {
        location: String,
        built_by: Vec<String>,
    },

    #[error("Chart files must resolve to exactly one file or directory, found {count}")]
    AmbiguousChart { count: usize },

    #[error("Dependency cycle between releases: {}", .cycle.join(" -> "))]
    DependencyCycle { cycle: Vec<String> },

    #[error("Override for release {release} on target {target} failed: {message}")]
    Override {
        release: String,
        target: String,
        message: String,
    },

    #[error("Invalid build file: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Values merge error: {message}")]
    ValuesMerge { message: String },
}

fn build_hint(built_by: &[String]) -> String {
    if built_by.is_empty() {
        String::new()
    } else {
        format!(" (produced by: {})", built_by.join(", "))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
