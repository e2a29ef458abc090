use anyhow::Result;
use assetpipe_core::build_manager::BuildManager;
use colored::*;

pub fn execute(manager: &BuildManager) -> Result<()> {
    println!("{}", "Task Dependency Graph:".bold().underline());

    let graph = manager.registry().dependency_graph();

    for (node_index, node_weight) in graph.node_indices().zip(graph.node_weights()) {
        println!("{}", node_weight.blue().bold());

        // Neighbors come back newest edge first
        let mut deps = Vec::new();
        for neighbor in graph.neighbors(node_index) {
            if let Some(dep_name) = graph.node_weight(neighbor) {
                deps.push(dep_name.clone());
            }
        }
        deps.reverse();

        if !deps.is_empty() {
            println!("  {} {}", "depends on:".dimmed(), deps.join(", "));
        } else {
            println!("  {}", "no dependencies".dimmed());
        }
        println!();
    }

    Ok(())
}
