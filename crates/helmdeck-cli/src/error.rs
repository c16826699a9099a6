//! CLI error types with exit code handling
//!
//! Every failure surfaces as a [`CliError`], rendered by miette and mapped
//! to one of the codes in [`exit_codes`](crate::exit_codes).

use helmdeck_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// The build file is missing, malformed or inconsistent
    #[error("Build file error: {message}")]
    #[diagnostic(code(helmdeck::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A release could not be resolved for a target
    #[error("Resolution failed: {message}")]
    #[diagnostic(code(helmdeck::cli::resolution))]
    Resolution {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// `helm` could not be started or exited with a failure
    #[error("helm failed for release {release}: {message}")]
    #[diagnostic(
        code(helmdeck::cli::helm),
        help("later releases in the plan were not processed")
    )]
    Helm { release: String, message: String },

    /// Linting failed with errors
    #[error("Linting failed with {errors} error(s) and {warnings} warning(s)")]
    #[diagnostic(code(helmdeck::cli::lint))]
    LintFailed { errors: usize, warnings: usize },

    /// Invalid command line input
    #[error("{message}")]
    #[diagnostic(code(helmdeck::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(helmdeck::cli::io))]
    Io { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Resolution { .. } => exit_codes::RESOLUTION_ERROR,
            CliError::Helm { .. } => exit_codes::HELM_ERROR,
            CliError::LintFailed { .. } => exit_codes::ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
        }
    }

    /// Create a build file error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a usage error with help text
    pub fn usage_with_help(message: impl Into<String>, help: Option<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help,
        }
    }

    /// Create a lint failure error
    pub fn lint_failed(errors: usize, warnings: usize) -> Self {
        Self::LintFailed { errors, warnings }
    }

    /// Create a helm failure
    pub fn helm(release: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Helm {
            release: release.into(),
            message: message.into(),
        }
    }

    /// Treat a core error raised while loading the build file as a config error
    pub fn from_load(err: CoreError) -> Self {
        match err {
            CoreError::Io(io) => Self::Io {
                message: io.to_string(),
            },
            other => Self::config(other.to_string()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Io(_) => CliError::Io { message },
            CoreError::ChartNotFound { ref built_by, .. } if !built_by.is_empty() => {
                CliError::Resolution {
                    message,
                    help: Some(format!("run the build steps first: {}", built_by.join(", "))),
                }
            }
            CoreError::InvalidExpression { .. } => CliError::Usage {
                message,
                help: Some("tags are comma separated, prefix with '!' to exclude, '*' matches all".into()),
            },
            CoreError::YamlParse(_)
            | CoreError::DuplicateTarget { .. }
            | CoreError::DuplicateRelease { .. }
            | CoreError::UnknownChart { .. }
            | CoreError::InvalidConfig { .. } => CliError::config(message),
            _ => CliError::Resolution {
                message,
                help: None,
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
