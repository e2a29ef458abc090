//! High-level task runner
//!
//! Every task reachable from the requested one becomes a single shared future, so
//! a prerequisite reached through several paths still runs once. A task joins all of
//! its prerequisites (siblings overlap on I/O) and starts its own action only if
//! every one of them succeeded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use colored::*;
use futures::future::{join_all, BoxFuture, FutureExt, Shared};

use crate::execution::dependencies::dependency_order;
use crate::registry::TaskRegistry;
use crate::results::{RunReport, TaskState};
use crate::tasks::{get_task_color, TaskAction};
use crate::types::{PipelineError, PipelineResult};

type TaskFuture = Shared<BoxFuture<'static, PipelineResult<()>>>;

/// Configuration for the task runner
#[derive(Debug, Clone, Default)]
pub struct TaskRunnerConfig {
    /// Suppress per-task progress lines
    pub quiet: bool,
}

pub struct TaskRunner<'a> {
    registry: &'a TaskRegistry,
    config: TaskRunnerConfig,
}

impl<'a> TaskRunner<'a> {
    pub fn new(registry: &'a TaskRegistry) -> Self {
        Self::with_config(registry, TaskRunnerConfig::default())
    }

    pub fn with_config(registry: &'a TaskRegistry, config: TaskRunnerConfig) -> Self {
        Self { registry, config }
    }

    /// Run `task_name` and its prerequisites, failing with the first fatal error.
    ///
    /// When several prerequisites of one task fail, the error reported is that of the
    /// first failing prerequisite in declaration order, not the earliest in time, so
    /// the same inputs always report the same error.
    pub async fn run(&self, task_name: &str) -> PipelineResult<RunReport> {
        self.execute(task_name).await.into_result()
    }

    /// Run `task_name` and its prerequisites, reporting every task's final state
    pub async fn execute(&self, task_name: &str) -> RunReport {
        let mut report = RunReport::new(task_name);

        // Graph errors surface before any action starts
        if let Err(error) = self.registry.validate(task_name) {
            report.error = Some(error);
            return report;
        }

        let order = dependency_order(self.registry.tasks(), task_name);
        log::debug!("Execution order for '{}': {:?}", task_name, order);

        for name in &order {
            report.states.insert(name.clone(), TaskState::Pending);
        }
        let progress = Arc::new(Mutex::new(report));

        let root = match self.schedule(&order, &progress) {
            Ok(root) => root,
            Err(error) => {
                let mut report = lock(&progress).clone();
                report.error = Some(error);
                return report;
            }
        };

        let outcome = root.await;

        let mut report = lock(&progress).clone();
        report.error = outcome.err();
        report
    }

    /// Build one shared future per task, prerequisites first; returns the last (requested) one
    fn schedule(
        &self,
        order: &[String],
        progress: &Arc<Mutex<RunReport>>,
    ) -> PipelineResult<TaskFuture> {
        let mut scheduled: HashMap<&str, TaskFuture> = HashMap::new();
        let mut root = None;

        for name in order {
            let task = self
                .registry
                .get(name)
                .ok_or_else(|| PipelineError::UnknownTask(name.clone()))?;

            let prerequisites = task
                .prerequisites
                .iter()
                .map(|prerequisite| {
                    scheduled
                        .get(prerequisite.as_str())
                        .cloned()
                        .ok_or_else(|| PipelineError::UnknownTask(prerequisite.clone()))
                })
                .collect::<PipelineResult<Vec<_>>>()?;

            let future = run_task(
                task.name.clone(),
                prerequisites,
                task.action.clone(),
                Arc::clone(progress),
                self.config.quiet,
            )
            .boxed()
            .shared();

            scheduled.insert(name.as_str(), future.clone());
            root = Some(future);
        }

        root.ok_or_else(|| PipelineError::UnknownTask(String::new()))
    }
}

async fn run_task(
    name: String,
    prerequisites: Vec<TaskFuture>,
    action: Option<Arc<dyn TaskAction>>,
    progress: Arc<Mutex<RunReport>>,
    quiet: bool,
) -> PipelineResult<()> {
    // Joined rather than raced: siblings already in flight are allowed to finish
    let results = join_all(prerequisites).await;
    if let Some(error) = results.into_iter().find_map(Result::err) {
        log::debug!("Skipping '{}': a prerequisite failed", name);
        set_state(&progress, &name, TaskState::Skipped);
        return Err(error);
    }

    set_state(&progress, &name, TaskState::Running);

    let Some(action) = action else {
        set_state(&progress, &name, TaskState::Succeeded);
        return Ok(());
    };

    let task_color = get_task_color(&name);
    if !quiet {
        println!(
            "┌─ {} {}",
            "Running".bold(),
            name.color(task_color).bold()
        );
        println!("└─ {}", action.describe().bright_black());
    }

    let outcome = action.run().await;

    {
        let mut report = lock(&progress);
        let state = if outcome.is_ok() {
            TaskState::Succeeded
        } else {
            TaskState::Failed
        };
        report.states.insert(name.clone(), state);
        report.completed.push(name.clone());
    }

    if !quiet {
        match &outcome {
            Ok(()) => println!("{} {}", "✓".green().bold(), name.color(task_color)),
            Err(_) => println!("{} {}", "✗".red().bold(), name.color(task_color)),
        }
    }

    outcome
}

fn set_state(progress: &Mutex<RunReport>, name: &str, state: TaskState) {
    lock(progress).states.insert(name.to_string(), state);
}

fn lock(progress: &Mutex<RunReport>) -> MutexGuard<'_, RunReport> {
    progress.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records its name into a shared log; optionally sleeps or fails
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        runs: Arc<AtomicUsize>,
        delay_ms: u64,
        fail: bool,
    }

    #[async_trait]
    impl TaskAction for Recorder {
        fn describe(&self) -> String {
            format!("record {}", self.name)
        }

        async fn run(&self) -> PipelineResult<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.log.lock().unwrap().push(self.name.to_string());
            if self.fail {
                return Err(PipelineError::SourceNotFound(self.name.into()));
            }
            Ok(())
        }
    }

    struct Harness {
        registry: TaskRegistry,
        log: Arc<Mutex<Vec<String>>>,
        runs: HashMap<&'static str, Arc<AtomicUsize>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                registry: TaskRegistry::new(),
                log: Arc::new(Mutex::new(Vec::new())),
                runs: HashMap::new(),
            }
        }

        fn task(
            &mut self,
            name: &'static str,
            prerequisites: &[&str],
            delay_ms: u64,
            fail: bool,
        ) {
            let runs = Arc::new(AtomicUsize::new(0));
            self.runs.insert(name, runs.clone());
            let action = Recorder {
                name,
                log: self.log.clone(),
                runs,
                delay_ms,
                fail,
            };
            self.registry
                .register_task(name, prerequisites, Some(Arc::new(action)))
                .unwrap();
        }

        fn runs(&self, name: &str) -> usize {
            self.runs[name].load(Ordering::SeqCst)
        }

        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        fn runner(&self) -> TaskRunner<'_> {
            TaskRunner::with_config(&self.registry, TaskRunnerConfig { quiet: true })
        }
    }

    #[tokio::test]
    async fn test_unknown_task_runs_nothing() {
        let mut harness = Harness::new();
        harness.task("a", &[], 0, false);

        let err = harness.runner().run("missing").await.unwrap_err();
        assert!(matches!(err, PipelineError::UnknownTask(name) if name == "missing"));
        assert_eq!(harness.runs("a"), 0);
    }

    #[tokio::test]
    async fn test_diamond_runs_shared_prerequisite_once() {
        let mut harness = Harness::new();
        harness.task("base", &[], 5, false);
        harness.task("left", &["base"], 0, false);
        harness.task("right", &["base"], 0, false);
        harness.task("top", &["left", "right"], 0, false);

        let report = harness.runner().run("top").await.unwrap();

        for name in ["base", "left", "right", "top"] {
            assert_eq!(harness.runs(name), 1, "{name} should run exactly once");
            assert_eq!(report.state(name), Some(TaskState::Succeeded));
        }
        let log = harness.log();
        assert_eq!(log.first().map(String::as_str), Some("base"));
        assert_eq!(log.last().map(String::as_str), Some("top"));
    }

    #[tokio::test]
    async fn test_action_starts_after_all_prerequisites() {
        let mut harness = Harness::new();
        harness.task("slow", &[], 30, false);
        harness.task("fast", &[], 0, false);
        harness
            .registry
            .register_task("group", &["slow", "fast"], None)
            .unwrap();
        harness.task("final", &["group"], 0, false);

        harness.runner().run("final").await.unwrap();

        assert_eq!(harness.log(), vec!["fast", "slow", "final"]);
    }

    #[tokio::test]
    async fn test_failure_skips_dependents_but_lets_siblings_finish() {
        let mut harness = Harness::new();
        harness.task("broken", &[], 0, true);
        harness.task("sibling", &[], 20, false);
        harness.task("after", &["broken", "sibling"], 0, false);
        harness.task("top", &["after"], 0, false);

        let report = harness.runner().execute("top").await;

        assert!(matches!(report.error, Some(PipelineError::SourceNotFound(_))));
        assert_eq!(report.state("broken"), Some(TaskState::Failed));
        assert_eq!(report.state("sibling"), Some(TaskState::Succeeded));
        assert_eq!(report.state("after"), Some(TaskState::Skipped));
        assert_eq!(report.state("top"), Some(TaskState::Skipped));
        assert_eq!(harness.runs("after"), 0);
        assert_eq!(harness.runs("top"), 0);
        assert_eq!(harness.runs("sibling"), 1);
        assert!(report.states.values().all(|s| s.is_terminal()));
    }

    #[tokio::test]
    async fn test_unregistered_prerequisite_fails_before_any_action() {
        let mut harness = Harness::new();
        harness.task("first", &[], 0, false);
        harness.task("top", &["first", "ghost"], 0, false);

        let report = harness.runner().execute("top").await;

        assert!(matches!(
            report.error,
            Some(PipelineError::UnknownTask(ref name)) if name == "ghost"
        ));
        assert_eq!(harness.runs("first"), 0);
        assert!(report.states.is_empty());
    }

    #[tokio::test]
    async fn test_task_without_action_succeeds() {
        let mut registry = TaskRegistry::new();
        registry.register_task("noop", &[], None).unwrap();

        let report = TaskRunner::new(&registry).run("noop").await.unwrap();
        assert_eq!(report.target, "noop");
        assert_eq!(report.state("noop"), Some(TaskState::Succeeded));
        assert!(report.completed.is_empty());
    }

    #[tokio::test]
    async fn test_each_run_starts_fresh() {
        let mut harness = Harness::new();
        harness.task("a", &[], 0, false);
        let runner = harness.runner();

        runner.run("a").await.unwrap();
        runner.run("a").await.unwrap();

        assert_eq!(harness.runs("a"), 2);
    }
}
