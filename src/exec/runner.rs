// src/exec/runner.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::dag::{Plan, TaskRegistry};
use crate::errors::{Result, SitedagError};
use crate::exec::TaskWork;
use crate::types::TaskName;

type PlanFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Executes task graphs from a [`TaskRegistry`].
///
/// Semantics:
/// - a task runs its dependencies first, then its own work unit;
/// - `Sequence` children run strictly one after another, and the first
///   failure stops the sequence;
/// - `Parallel` children start together; the group succeeds once all
///   succeed and fails on the first failure. Members still in flight are
///   detached (not aborted) and their results discarded.
///
/// Running the same task twice concurrently is not guarded here; callers
/// that may re-trigger tasks (the watch coordinator) serialize runs.
#[derive(Debug, Clone)]
pub struct TaskRunner {
    registry: Arc<TaskRegistry>,
}

impl TaskRunner {
    pub fn new(registry: TaskRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Resolve `name` and run its whole plan.
    pub async fn run(&self, name: &str) -> Result<()> {
        let plan = self.registry.resolve(name)?;

        info!(task = %name, "running task graph");
        let start = Instant::now();

        let result = execute(plan).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => info!(task = %name, elapsed_ms, "task graph finished"),
            Err(err) => error!(task = %name, elapsed_ms, error = %err, "task graph failed"),
        }

        result
    }
}

/// Interpret a resolved plan.
pub fn execute(plan: Plan) -> PlanFuture {
    Box::pin(async move {
        match plan {
            Plan::Empty => Ok(()),
            Plan::Task { name, deps, work } => {
                execute(*deps).await?;
                match work {
                    Some(work) => run_work(name, work).await,
                    None => Ok(()),
                }
            }
            Plan::Sequence(children) => {
                for child in children {
                    execute(child).await?;
                }
                Ok(())
            }
            Plan::Parallel(children) => run_parallel(children).await,
        }
    })
}

/// Run one task's work unit on its own Tokio task so a panic is reported as
/// a task failure instead of unwinding through the runner.
async fn run_work(name: TaskName, work: Arc<dyn TaskWork>) -> Result<()> {
    debug!(task = %name, "starting task");
    let start = Instant::now();

    let handle = tokio::spawn(async move { work.run().await });
    let elapsed_ms = || start.elapsed().as_millis() as u64;

    match handle.await {
        Ok(Ok(())) => {
            info!(task = %name, elapsed_ms = elapsed_ms(), "task finished");
            Ok(())
        }
        Ok(Err(err)) => {
            warn!(task = %name, elapsed_ms = elapsed_ms(), error = %err, "task failed");
            Err(SitedagError::TaskFailed {
                task: name,
                source: Box::new(err),
            })
        }
        Err(join_err) => {
            error!(task = %name, error = %join_err, "task terminated abnormally");
            Err(SitedagError::TaskPanicked(name, join_err.to_string()))
        }
    }
}

async fn run_parallel(children: Vec<Plan>) -> Result<()> {
    let mut set = JoinSet::new();
    for child in children {
        set.spawn(execute(child));
    }

    while let Some(joined) = set.join_next().await {
        let result = match joined {
            Ok(result) => result,
            Err(join_err) => Err(SitedagError::TaskPanicked(
                "<parallel group>".to_string(),
                join_err.to_string(),
            )),
        };

        if let Err(err) = result {
            if !set.is_empty() {
                debug!(
                    in_flight = set.len(),
                    "parallel group failed; detaching remaining members"
                );
            }
            set.detach_all();
            return Err(err);
        }
    }

    Ok(())
}
