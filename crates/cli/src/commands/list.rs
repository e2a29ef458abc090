use anyhow::Result;
use assetpipe_core::build_manager::BuildManager;
use assetpipe_core::tasks::get_task_color;
use colored::*;

pub fn execute(manager: &BuildManager) -> Result<()> {
    println!("{}", "Tasks".bold().underline());

    let tasks = manager.list_tasks();
    if tasks.is_empty() {
        println!("  {}", "No tasks registered".dimmed());
        return Ok(());
    }

    for task in tasks {
        let name = task.name.color(get_task_color(&task.name)).bold();
        match task.action {
            Some(action) => println!("{} {}", name, action.dimmed()),
            None => println!("{} {}", name, "(aggregate)".dimmed()),
        }
    }

    Ok(())
}
