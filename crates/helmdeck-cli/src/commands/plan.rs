//! Plan command - show the ordered helm invocations for a target

use clap::Args;
use console::style;
use helmdeck_core::{HelmCommand, Operation, Plan, Project, TagExpression};
use std::path::Path;

use crate::display;
use crate::error::Result;

/// Release selection shared by `plan` and `apply`
#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    /// Target to operate on
    #[arg(short, long)]
    pub target: String,

    /// Extra tag filter, ANDed with the target's selector (e.g. "core,!slow")
    #[arg(long)]
    pub tags: Option<String>,

    /// Uninstall instead of install
    #[arg(long, conflicts_with = "test")]
    pub uninstall: bool,

    /// Run `helm test` on the selected releases
    #[arg(long)]
    pub test: bool,

    /// Use `helm install` instead of `helm upgrade --install`
    #[arg(long, conflicts_with_all = ["uninstall", "test"])]
    pub fresh_install: bool,
}

impl PlanArgs {
    pub fn operation(&self) -> Operation {
        if self.uninstall {
            Operation::Uninstall
        } else if self.test {
            Operation::Test
        } else {
            Operation::Install
        }
    }
}

/// Build the plan and the helm command for each of its entries
pub fn build(project: &Project, args: &PlanArgs) -> Result<(Plan, Vec<HelmCommand>)> {
    super::require_target(project, &args.target)?;

    let extra = args
        .tags
        .as_deref()
        .map(TagExpression::parse)
        .transpose()?;

    let plan = project.plan(&args.target, args.operation(), extra.as_ref())?;

    let commands = plan
        .entries
        .iter()
        .map(|entry| {
            let props = &entry.release;
            match plan.operation {
                Operation::Install if args.fresh_install => HelmCommand::install(props),
                Operation::Install => HelmCommand::upgrade_install(props),
                Operation::Uninstall => Ok(HelmCommand::uninstall(props)),
                Operation::Test => Ok(HelmCommand::test(props)),
            }
        })
        .collect::<helmdeck_core::Result<Vec<_>>>()?;

    Ok((plan, commands))
}

pub fn run(file: &Path, args: &PlanArgs) -> Result<()> {
    let project = super::load_project(file)?;
    let (plan, commands) = build(&project, args)?;

    println!(
        "{} Plan: {} on target {} ({} release(s), selector {})",
        style("→").blue(),
        plan.operation,
        style(&plan.target).cyan(),
        plan.len(),
        plan.selector
    );

    if plan.is_empty() {
        println!("  Nothing to do");
        return Ok(());
    }

    for (index, (entry, command)) in plan.entries.iter().zip(&commands).enumerate() {
        display::plan_step(index, entry, command);
    }

    Ok(())
}
