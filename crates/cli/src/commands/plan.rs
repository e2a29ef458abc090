use anyhow::Result;
use assetpipe_core::build_manager::BuildManager;
use colored::*;

pub fn execute(manager: &BuildManager, task: &str) -> Result<()> {
    println!("{} {}", "Execution plan for".bold(), task.cyan());

    let plan = manager
        .execution_plan(task)
        .map_err(|e| anyhow::anyhow!("Failed to get execution plan: {}", e))?;

    println!("\n{}:", "Execution order".bold());
    for (i, name) in plan.iter().enumerate() {
        println!("  {}. {}", i + 1, name);
    }

    Ok(())
}
