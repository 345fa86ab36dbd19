// src/server/mod.rs

//! Development server and live-reload plumbing.
//!
//! - [`bridge`] fans reload signals out to connected browsers.
//! - [`http`] serves the destination tree with `axum`, exposes the
//!   websocket endpoint and injects the reload client into HTML pages.

pub mod bridge;
pub mod http;

pub use bridge::{ReloadBridge, ReloadMessage};
pub use http::{inject_script, router, serve};
