// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling each `[[watch]]` rule's glob patterns.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Turning filesystem changes into rule-level triggers for the engine.
//!
//! It does **not** decide when runs start; coalescing lives in
//! [`crate::engine`].

pub mod event_handler;
pub mod patterns;
pub mod session;
pub mod watcher;

pub use patterns::{build_globset, build_rule_profiles, matching_rules, RuleWatchProfile};
pub use session::run_watch;
pub use watcher::{spawn_watcher, WatcherHandle};
