use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// The main error type for pipeline operations
///
/// Errors are `Clone` so that one task's failure can be handed to every task
/// that depends on it within a single run.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("Configuration error: task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("Configuration error: cyclic dependency {}", .path.join(" -> "))]
    CyclicDependency { path: Vec<String> },

    #[error("Unknown task '{0}'")]
    UnknownTask(String),

    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Compiler error in {}:\n{diagnostic}", .file.display())]
    Compiler { file: PathBuf, diagnostic: String },

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Whether this error was raised while validating the task graph, before any action ran
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateTask(_) | Self::CyclicDependency { .. } | Self::Config(_)
        )
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
