// src/exec/backend.rs

//! Pluggable run backend abstraction.
//!
//! The watch runtime talks to a `RunBackend` instead of a [`TaskRunner`]
//! directly. This makes it easy to swap in a fake backend in tests while
//! keeping the production implementation here.
//!
//! - `RunnerBackend` spawns each dispatched run on Tokio, runs the rule's
//!   tasks in sequence through a [`TaskRunner`], and reports back with a
//!   `RunCompleted` event.
//! - Tests can provide their own `RunBackend` that records dispatches and
//!   completes them on demand.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::engine::{RuleName, RunOutcome, RuntimeEvent};
use crate::errors::Result;
use crate::exec::TaskRunner;
use crate::types::TaskName;

/// Trait abstracting how triggered runs are executed.
pub trait RunBackend: Send {
    /// Start a run of `tasks` for `rule`.
    ///
    /// Must not wait for the run to finish; completion is reported through a
    /// `RuntimeEvent::RunCompleted`.
    fn dispatch(
        &mut self,
        rule: RuleName,
        tasks: Vec<TaskName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production backend: runs tasks through a [`TaskRunner`].
pub struct RunnerBackend {
    runner: TaskRunner,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl RunnerBackend {
    pub fn new(runner: TaskRunner, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { runner, runtime_tx }
    }
}

impl RunBackend for RunnerBackend {
    fn dispatch(
        &mut self,
        rule: RuleName,
        tasks: Vec<TaskName>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone what the spawned run needs so it doesn't borrow `self`.
        let runner = self.runner.clone();
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let outcome = run_in_sequence(&runner, &rule, &tasks).await;
                if tx
                    .send(RuntimeEvent::RunCompleted { rule, outcome })
                    .await
                    .is_err()
                {
                    error!("runtime channel closed before run completion could be reported");
                }
            });
            Ok(())
        })
    }
}

async fn run_in_sequence(runner: &TaskRunner, rule: &str, tasks: &[TaskName]) -> RunOutcome {
    info!(rule = %rule, ?tasks, "change detected; re-running tasks");
    for task in tasks {
        if let Err(err) = runner.run(task).await {
            return RunOutcome::Failed(err.to_string());
        }
    }
    RunOutcome::Success
}
