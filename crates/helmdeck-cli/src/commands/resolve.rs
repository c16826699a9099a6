//! Resolve command - show the merged configuration of a release for a target

use clap::ValueEnum;
use std::path::Path;

use crate::error::{CliError, Result};

/// Output format for resolved properties
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

pub fn run(file: &Path, release: &str, target: &str, output: OutputFormat) -> Result<()> {
    let project = super::load_project(file)?;
    super::require_release(&project, release)?;
    super::require_target(&project, target)?;

    let props = project.resolve(release, target)?;

    let rendered = match output {
        OutputFormat::Yaml => {
            serde_yaml::to_string(&*props).map_err(|e| CliError::config(e.to_string()))?
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(&*props).map_err(|e| CliError::config(e.to_string()))?
        }
    };

    println!("{}", rendered.trim_end());
    Ok(())
}
