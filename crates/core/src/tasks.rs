//! Task actions and color management
//!
//! This module defines the unit of work a task performs and the consistent
//! per-task colors used in terminal output.

use async_trait::async_trait;
use colored::*;

use crate::types::PipelineResult;

/// The asynchronous work a task performs once its prerequisites have succeeded
#[async_trait]
pub trait TaskAction: Send + Sync {
    /// Short human-readable summary, e.g. `copy 1 pattern -> src/styles`
    fn describe(&self) -> String;

    async fn run(&self) -> PipelineResult<()>;
}

/// Get a consistent color for a task name
pub fn get_task_color(task_name: &str) -> Color {
    let hash = task_name
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    // Jewel tones, kept clear of the green/red used for success and failure markers
    let colors = [
        Color::TrueColor {
            r: 147,
            g: 112,
            b: 219,
        },
        Color::TrueColor {
            r: 64,
            g: 224,
            b: 208,
        },
        Color::TrueColor {
            r: 255,
            g: 140,
            b: 0,
        },
        Color::TrueColor {
            r: 199,
            g: 21,
            b: 133,
        },
        Color::TrueColor {
            r: 72,
            g: 209,
            b: 204,
        },
        Color::TrueColor {
            r: 138,
            g: 43,
            b: 226,
        },
    ];

    colors[(hash % colors.len() as u64) as usize]
}
