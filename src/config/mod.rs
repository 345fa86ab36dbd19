// src/config/mod.rs

//! Configuration loading and validation for sitedag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate paths, globs, server and deploy settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default, parse_str};
pub use model::{
    ConfigFile, DeploySection, LintSection, PathsSection, RawConfigFile, ServerSection,
    SiteSection, WatchRuleConfig,
};
pub use validate::validate_watch_tasks;
