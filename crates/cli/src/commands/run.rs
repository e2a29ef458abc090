use anyhow::Result;
use assetpipe_core::build_manager::BuildManager;
use colored::*;

pub async fn execute(manager: &BuildManager, task: &str) -> Result<()> {
    println!(
        "{} {} {}",
        "Running task".bold(),
        task.cyan(),
        format!("in {}", manager.project_root().display()).dimmed()
    );
    println!();

    let report = manager
        .run_task(task)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run task '{}': {}", task, e))?;

    let summary = format!(
        "{}: {} task(s) completed successfully!",
        report.target,
        report.states.len()
    );
    println!();
    println!("{} {}", "✓".green().bold(), summary.green().bold());

    Ok(())
}
