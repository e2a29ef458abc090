//! Task execution module
//!
//! This module handles graph validation, the runner that drives a task and its
//! prerequisites, and the two kinds of work a task can do: copying assets and
//! compiling a source file.

pub mod compile;
pub mod copy;
pub mod dependencies;
pub mod runner;

pub use compile::{CompileAction, CompileOptions, CompileSpec, Compiler, ExternalCompiler};
pub use copy::{CopyAction, CopySpec};
pub use dependencies::{dependency_order, find_cycle};
pub use runner::{TaskRunner, TaskRunnerConfig};
