//! Result types for task runs
//!
//! A [`RunReport`] records how far every task reachable from the requested one got,
//! so callers can tell executed, failed and never-started tasks apart.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{PipelineError, PipelineResult};

/// Lifecycle of one task within one run. `Succeeded`, `Failed` and `Skipped` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
    /// Never started because a prerequisite failed
    Skipped,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Skipped)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// A registered task as shown by listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub name: String,
    pub prerequisites: Vec<String>,
    /// Summary of the task's own action, `None` for pure aggregates
    pub action: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub target: String,
    pub states: BTreeMap<String, TaskState>,
    /// Tasks whose action finished (successfully or not), in completion order
    pub completed: Vec<String>,
    /// First fatal error of the run
    pub error: Option<PipelineError>,
}

impl RunReport {
    pub(crate) fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            states: BTreeMap::new(),
            completed: Vec::new(),
            error: None,
        }
    }

    pub fn state(&self, task_name: &str) -> Option<TaskState> {
        self.states.get(task_name).copied()
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn count(&self, state: TaskState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    pub fn into_result(self) -> PipelineResult<Self> {
        match self.error.clone() {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }
}
