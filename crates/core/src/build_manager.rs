//! High-level build interface
//!
//! This module provides the [`BuildManager`], the entry point used by the CLI. It
//! loads the project's configuration, wires the external compiler into the fixed
//! task graph and exposes listing, planning and running.
//!
//! ## Example
//!
//! ```rust,no_run
//! use assetpipe_core::build_manager::{BuildManager, BuildManagerConfig};
//! use std::path::PathBuf;
//!
//! # async fn example() -> assetpipe_core::types::PipelineResult<()> {
//! let manager = BuildManager::new(BuildManagerConfig {
//!     project_root: PathBuf::from("."),
//!     quiet: false,
//! })?;
//!
//! // Dependency-first order of what `default` will do
//! let plan = manager.execution_plan("default")?;
//!
//! manager.run_task("default").await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::configs::BuildConfig;
use crate::execution::{Compiler, ExternalCompiler, TaskRunner, TaskRunnerConfig};
use crate::pipeline::build_registry;
use crate::registry::TaskRegistry;
use crate::results::{RunReport, TaskInfo};
use crate::types::{PipelineError, PipelineResult};

/// Configuration for initializing a build manager
#[derive(Debug, Clone)]
pub struct BuildManagerConfig {
    pub project_root: PathBuf,
    pub quiet: bool,
}

pub struct BuildManager {
    project_root: PathBuf,
    registry: TaskRegistry,
    runner_config: TaskRunnerConfig,
}

impl BuildManager {
    /// Load `assetpipe.yml` (if any) and register the build tasks
    pub fn new(config: BuildManagerConfig) -> PipelineResult<Self> {
        let project_root = absolute_root(&config.project_root)?;
        let build_config = BuildConfig::load(&project_root)?;
        let compiler = Arc::new(ExternalCompiler::from_config(
            &build_config.compiler,
            &project_root,
        ));
        Self::with_compiler(config, build_config, compiler)
    }

    /// Build with an explicit configuration and compiler
    pub fn with_compiler(
        config: BuildManagerConfig,
        build_config: BuildConfig,
        compiler: Arc<dyn Compiler>,
    ) -> PipelineResult<Self> {
        let project_root = absolute_root(&config.project_root)?;
        let registry = build_registry(&build_config, &project_root, compiler)?;
        Ok(Self {
            project_root,
            registry,
            runner_config: TaskRunnerConfig {
                quiet: config.quiet,
            },
        })
    }

    /// Absolute project root every task path is resolved against
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Registered tasks in registration order
    pub fn list_tasks(&self) -> Vec<TaskInfo> {
        self.registry
            .task_names()
            .iter()
            .filter_map(|name| self.registry.get(name))
            .map(|task| TaskInfo {
                name: task.name.clone(),
                prerequisites: task.prerequisites.clone(),
                action: task.action.as_ref().map(|action| action.describe()),
            })
            .collect()
    }

    pub fn execution_plan(&self, task_name: &str) -> PipelineResult<Vec<String>> {
        self.registry.execution_plan(task_name)
    }

    /// Run a task and everything it depends on
    pub async fn run_task(&self, task_name: &str) -> PipelineResult<RunReport> {
        TaskRunner::with_config(&self.registry, self.runner_config.clone())
            .run(task_name)
            .await
    }
}

fn absolute_root(project_root: &Path) -> PipelineResult<PathBuf> {
    std::path::absolute(project_root).map_err(|e| PipelineError::io(project_root, e))
}
