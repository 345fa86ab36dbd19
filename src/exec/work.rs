// src/exec/work.rs

//! Work units: the thing a task actually does.
//!
//! A work unit performs some I/O and resolves to `Ok(())` or an error. The
//! runner treats an error as task failure and a panic inside the unit, on
//! either the async or the blocking side, as abnormal termination.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;

use crate::errors::Result;

/// Boxed future returned by [`TaskWork::run`].
pub type WorkFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Trait implemented by every task's unit of work.
pub trait TaskWork: Send + Sync {
    fn run(&self) -> WorkFuture<'_>;
}

/// Work unit backed by an async closure.
pub struct FnWork<F>(F);

impl<F, Fut> TaskWork for FnWork<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn run(&self) -> WorkFuture<'_> {
        Box::pin((self.0)())
    }
}

/// Wrap an async closure as a work unit.
pub fn work_fn<F, Fut>(f: F) -> FnWork<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    FnWork(f)
}

/// Work unit backed by a synchronous closure.
///
/// The closure runs on Tokio's blocking pool so file I/O and stylesheet
/// compilation in one member of a parallel group overlap with the others.
pub struct BlockingWork<F>(Arc<F>);

impl<F> TaskWork for BlockingWork<F>
where
    F: Fn() -> Result<()> + Send + Sync + 'static,
{
    fn run(&self) -> WorkFuture<'_> {
        let f = Arc::clone(&self.0);
        Box::pin(async move {
            match tokio::task::spawn_blocking(move || f()).await {
                Ok(result) => result,
                // Re-raise so the runner sees the panic of this unit.
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => Err(anyhow!("blocking work was cancelled: {e}").into()),
            }
        })
    }
}

/// Wrap a synchronous closure as a work unit.
pub fn blocking_fn<F>(f: F) -> BlockingWork<F>
where
    F: Fn() -> Result<()> + Send + Sync + 'static,
{
    BlockingWork(Arc::new(f))
}
