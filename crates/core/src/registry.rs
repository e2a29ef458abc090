//! Task registry
//!
//! The registry is built by the caller before a run and only read while the run
//! is in progress. Prerequisites may name tasks registered later; such forward
//! references are resolved when a task is validated for running.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use petgraph::prelude::*;

use crate::execution::dependencies::{dependency_order, find_cycle, validate};
use crate::tasks::TaskAction;
use crate::types::{PipelineError, PipelineResult};

/// A named unit of build work with its declared prerequisites
#[derive(Clone)]
pub struct Task {
    pub name: String,
    pub prerequisites: Vec<String>,
    pub action: Option<Arc<dyn TaskAction>>,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("prerequisites", &self.prerequisites)
            .field("action", &self.action.as_ref().map(|a| a.describe()))
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, Task>,
    order: Vec<String>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task.
    ///
    /// Fails if the name is taken or if the new prerequisites close a cycle; in both
    /// cases the registry is left unchanged.
    pub fn register_task(
        &mut self,
        name: impl Into<String>,
        prerequisites: &[&str],
        action: Option<Arc<dyn TaskAction>>,
    ) -> PipelineResult<()> {
        let name = name.into();
        if self.tasks.contains_key(&name) {
            return Err(PipelineError::DuplicateTask(name));
        }

        self.tasks.insert(
            name.clone(),
            Task {
                name: name.clone(),
                prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
                action,
            },
        );

        if let Some(path) = find_cycle(&self.tasks, &name) {
            self.tasks.remove(&name);
            return Err(PipelineError::CyclicDependency { path });
        }

        log::debug!("Registered task '{}' (prerequisites: {:?})", name, prerequisites);
        self.order.push(name);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Task names in registration order
    pub fn task_names(&self) -> &[String] {
        &self.order
    }

    /// Check that `name` and everything it depends on can run
    pub fn validate(&self, name: &str) -> PipelineResult<()> {
        validate(&self.tasks, name)
    }

    /// Tasks a run of `name` would execute, prerequisites first
    pub fn execution_plan(&self, name: &str) -> PipelineResult<Vec<String>> {
        self.validate(name)?;
        Ok(dependency_order(&self.tasks, name))
    }

    /// Prerequisite graph with an edge from each task to each of its prerequisites
    pub fn dependency_graph(&self) -> DiGraph<String, ()> {
        let mut graph = DiGraph::<String, ()>::new();
        let mut node_indices = HashMap::new();

        for name in &self.order {
            let node_index = graph.add_node(name.clone());
            node_indices.insert(name.clone(), node_index);
        }

        for name in &self.order {
            let from_node = node_indices[name];
            for prerequisite in &self.tasks[name].prerequisites {
                let to_node = *node_indices
                    .entry(prerequisite.clone())
                    .or_insert_with(|| graph.add_node(prerequisite.clone()));
                graph.add_edge(from_node, to_node, ());
            }
        }

        graph
    }

    pub(crate) fn tasks(&self) -> &HashMap<String, Task> {
        &self.tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = TaskRegistry::new();
        registry.register_task("build", &[], None).unwrap();
        let err = registry.register_task("build", &[], None).unwrap_err();
        assert!(matches!(err, PipelineError::DuplicateTask(name) if name == "build"));
        assert_eq!(registry.task_names(), &["build".to_string()]);
    }

    #[test]
    fn test_forward_reference_allowed() {
        let mut registry = TaskRegistry::new();
        registry.register_task("default", &["later"], None).unwrap();
        assert!(matches!(
            registry.validate("default"),
            Err(PipelineError::UnknownTask(name)) if name == "later"
        ));
        registry.register_task("later", &[], None).unwrap();
        assert!(registry.validate("default").is_ok());
    }

    #[test]
    fn test_cycle_rejected_at_registration() {
        let mut registry = TaskRegistry::new();
        registry.register_task("a", &["b"], None).unwrap();
        registry.register_task("b", &["c"], None).unwrap();
        let err = registry.register_task("c", &["a"], None).unwrap_err();
        assert!(err.to_string().contains("c -> a -> b -> c"), "{err}");
        assert!(!registry.contains("c"));
        assert!(registry.register_task("c", &[], None).is_ok());
    }

    #[test]
    fn test_direct_self_dependency_rejected() {
        let mut registry = TaskRegistry::new();
        let err = registry.register_task("loop", &["loop"], None).unwrap_err();
        assert!(matches!(err, PipelineError::CyclicDependency { .. }));
    }

    #[test]
    fn test_dependency_graph_includes_unregistered_prerequisites() {
        let mut registry = TaskRegistry::new();
        registry.register_task("default", &["compile", "copy"], None).unwrap();
        registry.register_task("copy", &[], None).unwrap();

        let graph = registry.dependency_graph();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_execution_plan_unknown_task() {
        let registry = TaskRegistry::new();
        assert!(matches!(
            registry.execution_plan("default"),
            Err(PipelineError::UnknownTask(_))
        ));
    }
}
