//! Apply command - run the plan's helm invocations in order

use console::style;
use std::path::Path;
use tracing::{debug, info};

use super::plan::{self, PlanArgs};
use crate::error::{CliError, Result};

pub fn run(file: &Path, args: &PlanArgs, helm: &str) -> Result<()> {
    let project = super::load_project(file)?;
    let (plan, commands) = plan::build(&project, args)?;

    if plan.is_empty() {
        println!("{} Nothing to do on target {}", style("→").blue(), plan.target);
        return Ok(());
    }

    println!(
        "{} Applying {} on target {} ({} release(s))",
        style("→").blue(),
        plan.operation,
        style(&plan.target).cyan(),
        plan.len()
    );

    for command in &commands {
        println!("{} {}", style("→").blue(), command);
        debug!(helm = %helm, args = ?command.args(), "Running helm");

        let status = command
            .to_command(helm)
            .status()
            .map_err(|e| CliError::helm(command.release(), format!("failed to start {}: {}", helm, e)))?;

        if !status.success() {
            return Err(CliError::helm(command.release(), status.to_string()));
        }

        info!(release = %command.release(), "helm finished");
        println!("  {} {}", style("✓").green(), command.release());
    }

    println!(
        "\n{} {} release(s) processed",
        style("✓").green().bold(),
        commands.len()
    );
    Ok(())
}
