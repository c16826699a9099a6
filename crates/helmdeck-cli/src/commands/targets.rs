//! Targets command - list declared release targets

use console::style;
use std::path::Path;

use crate::error::Result;

pub fn run(file: &Path) -> Result<()> {
    let project = super::load_project(file)?;

    for target in project.targets() {
        let selector = target.select_tags().unwrap_or("*");
        println!("{}", style(target.name()).cyan().bold());
        println!(
            "  namespace: {}",
            target.server.namespace.as_deref().unwrap_or("-")
        );
        println!(
            "  context:   {}",
            target.server.kube_context.as_deref().unwrap_or("-")
        );
        println!("  selector:  {}", selector);
    }

    Ok(())
}
