//! Values command - preview the values Helm would receive

use helmdeck_core::{effective_values, parse_set_values};
use std::path::Path;

use crate::error::{CliError, Result};

pub fn run(file: &Path, release: &str, target: &str, set: &[String]) -> Result<()> {
    let project = super::load_project(file)?;
    super::require_release(&project, release)?;
    super::require_target(&project, target)?;

    let props = project.resolve(release, target)?;
    let mut values = effective_values(&props)?;

    if !set.is_empty() {
        let overrides = parse_set_values(set).map_err(|e| {
            CliError::usage_with_help(e.to_string(), Some("use --set key=value".into()))
        })?;
        values.merge(&overrides);
    }

    let rendered =
        serde_yaml::to_string(values.inner()).map_err(|e| CliError::config(e.to_string()))?;
    println!("{}", rendered.trim_end());
    Ok(())
}
