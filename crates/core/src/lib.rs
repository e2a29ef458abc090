//! Assetpipe Core Library
//!
//! This is the core library behind the `assetpipe` build tool. It copies the
//! vendored bootstrap distribution into a web project and compiles the
//! tic-tac-toe Elm program, driven by a small dependency-ordered task runner.
//!
//! ## Architecture
//!
//! - [`build_manager`] - High-level interface used by the CLI
//! - [`pipeline`] - The fixed task graph (`copy-*`, `compile-tic-tac-toe`, `default`)
//! - [`registry`] - Task registration and graph validation
//! - [`execution`] - Runner, dependency ordering, copy and compile actions
//! - [`tasks`] - The task action trait and color management
//! - [`configs`] - Parsing of the optional `assetpipe.yml`
//! - [`results`] - Run reports and task listings
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
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
//! manager.run_task("default").await?;
//! # Ok(())
//! # }
//! ```

pub mod build_manager;
pub mod configs;
pub mod execution;
pub mod pipeline;
pub mod registry;
pub mod results;
pub mod tasks;
pub mod types;

// Re-export the main types for easier usage
pub use build_manager::{BuildManager, BuildManagerConfig};
pub use registry::{Task, TaskRegistry};
pub use tasks::TaskAction;
pub use types::{PipelineError, PipelineResult};
