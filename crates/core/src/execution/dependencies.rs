//! Task dependency management
//!
//! This module validates the prerequisite graph (every name registered, no cycles)
//! and computes the dependency-first order in which a run visits tasks.

use std::collections::{HashMap, HashSet};

use crate::registry::Task;
use crate::types::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Find a cycle reachable from `start`.
///
/// Depth-first visit with three-colour marking: names absent from the mark table are
/// unvisited. Reaching an in-progress name closes a cycle, returned as the path from
/// that name back to itself (`["a", "b", "a"]`). Unregistered names are leaves.
pub fn find_cycle<'a>(
    tasks: &'a HashMap<String, Task>,
    start: &'a str,
) -> Option<Vec<String>> {
    let mut marks = HashMap::new();
    let mut stack = Vec::new();
    visit(tasks, start, &mut marks, &mut stack)
}

fn visit<'a>(
    tasks: &'a HashMap<String, Task>,
    name: &'a str,
    marks: &mut HashMap<&'a str, Mark>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    match marks.get(name) {
        Some(Mark::Done) => return None,
        Some(Mark::InProgress) => {
            let first = stack.iter().position(|n| *n == name).unwrap_or(0);
            let mut path: Vec<String> = stack[first..].iter().map(|n| n.to_string()).collect();
            path.push(name.to_string());
            return Some(path);
        }
        None => {}
    }

    marks.insert(name, Mark::InProgress);
    stack.push(name);

    if let Some(task) = tasks.get(name) {
        for prerequisite in &task.prerequisites {
            if let Some(cycle) = visit(tasks, prerequisite, marks, stack) {
                return Some(cycle);
            }
        }
    }

    stack.pop();
    marks.insert(name, Mark::Done);
    None
}

/// Check the subgraph reachable from `start` before anything runs
pub fn validate(tasks: &HashMap<String, Task>, start: &str) -> PipelineResult<()> {
    if !tasks.contains_key(start) {
        return Err(PipelineError::UnknownTask(start.to_string()));
    }

    if let Some(path) = find_cycle(tasks, start) {
        return Err(PipelineError::CyclicDependency { path });
    }

    let mut seen = HashSet::new();
    let mut stack = vec![start];
    while let Some(name) = stack.pop() {
        if !seen.insert(name) {
            continue;
        }
        let task = tasks
            .get(name)
            .ok_or_else(|| PipelineError::UnknownTask(name.to_string()))?;
        stack.extend(task.prerequisites.iter().map(String::as_str));
    }

    Ok(())
}

/// Every task reachable from `start`, prerequisites before dependents, each once.
///
/// Siblings keep their declaration order. Assumes [`validate`] passed.
pub fn dependency_order(tasks: &HashMap<String, Task>, start: &str) -> Vec<String> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    post_order(tasks, start, &mut visited, &mut order);
    order
}

fn post_order<'a>(
    tasks: &'a HashMap<String, Task>,
    name: &'a str,
    visited: &mut HashSet<&'a str>,
    order: &mut Vec<String>,
) {
    if !visited.insert(name) {
        return;
    }
    if let Some(task) = tasks.get(name) {
        for prerequisite in &task.prerequisites {
            post_order(tasks, prerequisite, visited, order);
        }
    }
    order.push(name.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: Vec<(&str, Vec<&str>)>) -> HashMap<String, Task> {
        edges
            .into_iter()
            .map(|(name, prerequisites)| {
                (
                    name.to_string(),
                    Task {
                        name: name.to_string(),
                        prerequisites: prerequisites.iter().map(|p| p.to_string()).collect(),
                        action: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_diamond_has_no_cycle() {
        let tasks = graph(vec![
            ("top", vec!["left", "right"]),
            ("left", vec!["base"]),
            ("right", vec!["base"]),
            ("base", vec![]),
        ]);
        assert_eq!(find_cycle(&tasks, "top"), None);
        assert!(validate(&tasks, "top").is_ok());
    }

    #[test]
    fn test_self_cycle() {
        let tasks = graph(vec![("a", vec!["a"])]);
        assert_eq!(
            find_cycle(&tasks, "a"),
            Some(vec!["a".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn test_transitive_cycle_reports_path() {
        let tasks = graph(vec![
            ("entry", vec!["a"]),
            ("a", vec!["b"]),
            ("b", vec!["c"]),
            ("c", vec!["a"]),
        ]);
        let err = validate(&tasks, "entry").unwrap_err();
        match err {
            PipelineError::CyclicDependency { path } => {
                assert_eq!(path, vec!["a", "b", "c", "a"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_unreachable_cycle_is_ignored() {
        let tasks = graph(vec![("ok", vec![]), ("x", vec!["y"]), ("y", vec!["x"])]);
        assert!(validate(&tasks, "ok").is_ok());
    }

    #[test]
    fn test_unknown_start_and_prerequisite() {
        let tasks = graph(vec![("a", vec!["missing"])]);
        assert!(matches!(
            validate(&tasks, "nope"),
            Err(PipelineError::UnknownTask(name)) if name == "nope"
        ));
        assert!(matches!(
            validate(&tasks, "a"),
            Err(PipelineError::UnknownTask(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_dependency_order_visits_shared_prerequisite_once() {
        let tasks = graph(vec![
            ("top", vec!["left", "right"]),
            ("left", vec!["base"]),
            ("right", vec!["base"]),
            ("base", vec![]),
        ]);
        assert_eq!(
            dependency_order(&tasks, "top"),
            vec!["base", "left", "right", "top"]
        );
    }
}
