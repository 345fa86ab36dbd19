// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`work`] defines the `TaskWork` trait implemented by every task's unit
//!   of work, plus closure adapters.
//! - [`runner`] interprets resolved plans (`Sequence` / `Parallel` / work).
//! - [`backend`] provides the `RunBackend` trait used by the watch runtime
//!   and a concrete `RunnerBackend`; tests can replace it with a fake.

pub mod backend;
pub mod runner;
pub mod work;

pub use backend::{RunBackend, RunnerBackend};
pub use runner::{execute, TaskRunner};
pub use work::{blocking_fn, work_fn, BlockingWork, FnWork, TaskWork, WorkFuture};
