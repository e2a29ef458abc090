use std::path::PathBuf;

use anyhow::Result;
use assetpipe_core::build_manager::{BuildManager, BuildManagerConfig};
use assetpipe_core::pipeline::DEFAULT_TASK;
use clap::{Parser, Subcommand};

mod commands;

/// Assetpipe - copies vendored bootstrap assets and compiles the tic-tac-toe game
#[derive(Parser)]
#[command(name = "assetpipe")]
#[command(about = "Build the tic-tac-toe web project")]
#[command(version)]
struct Cli {
    /// Path to the project root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    /// Runs the default task when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task and its prerequisites
    Run {
        #[arg(default_value = DEFAULT_TASK)]
        task: String,
    },
    /// Show execution order for a task without running it
    Plan {
        #[arg(default_value = DEFAULT_TASK)]
        task: String,
    },
    /// List registered tasks
    List,
    /// Show the task dependency graph
    Graph,
    /// Print the JSON schema of assetpipe.yml
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Some(Commands::Schema) = cli.command {
        return commands::schema::execute();
    }

    let manager = BuildManager::new(BuildManagerConfig {
        project_root: cli.root,
        quiet: false,
    })
    .map_err(|e| anyhow::anyhow!("Failed to load build configuration: {}", e))?;

    match cli.command {
        None => commands::run::execute(&manager, DEFAULT_TASK).await,
        Some(Commands::Run { task }) => commands::run::execute(&manager, &task).await,
        Some(Commands::Plan { task }) => commands::plan::execute(&manager, &task),
        Some(Commands::List) => commands::list::execute(&manager),
        Some(Commands::Graph) => commands::graph::execute(&manager),
        Some(Commands::Schema) => commands::schema::execute(),
    }
}
