// src/dag/mod.rs

//! Task graph representation.
//!
//! - [`registry`] holds named tasks and their dependency specs
//!   (`None` / `Sequence` / `Parallel`, arbitrarily nested).
//! - [`plan`] is the executable tree produced by resolving a task name.

pub mod plan;
pub mod registry;

pub use plan::Plan;
pub use registry::{DependencySpec, Step, Task, TaskRegistry};
