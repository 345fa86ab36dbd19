// src/engine/mod.rs

//! Watch coordination engine.
//!
//! This module ties together:
//! - one coalescing slot per watch rule (what happens when a change arrives
//!   while that rule's tasks are already running)
//! - the pure core state machine that decides which runs to start
//! - the async runtime loop that reacts to:
//!   - file-watch triggers
//!   - run completion events
//!   - shutdown signals
//!
//! The pure core lives in [`core`]; the async/IO shell is implemented in
//! [`runtime`].

use crate::types::TaskName;

/// Name of a watch rule (e.g. `"styles"`).
pub type RuleName = String;

/// Static description of a watch rule as the engine sees it.
///
/// Glob matching happens in [`crate::watch`]; the engine only needs to know
/// which tasks a rule runs and whether to signal a page reload afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRule {
    pub name: RuleName,
    /// Tasks run in sequence for every triggered run.
    pub tasks: Vec<TaskName>,
    /// Send a full reload to connected browsers after each run.
    pub reload: bool,
}

/// Outcome of one run of a rule's tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failed(String),
}

/// Why a rule was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Manual trigger (e.g. tests or an explicit request).
    Manual,
    /// Triggered due to a filesystem event.
    FileWatch,
}

/// Events flowing into the runtime from the watcher, the run backend, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A rule's patterns matched a change.
    RuleTriggered {
        rule: RuleName,
        reason: TriggerReason,
    },
    /// A dispatched run finished.
    RunCompleted {
        rule: RuleName,
        outcome: RunOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod runtime;
pub mod slot;

pub use core::{CoreCommand, CoreStep, WatchCore};
pub use runtime::Runtime;
pub use slot::{RuleSlot, WatchState};
