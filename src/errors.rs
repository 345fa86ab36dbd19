// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! The variants follow the failure classes of a build:
//! - configuration errors (unknown task, dependency cycle, bad config) are
//!   fatal and surface before any work starts;
//! - read / transform / lint / deploy errors fail the task that owns them;
//! - `TaskFailed` wraps any of the above with the name of the failing task so
//!   the runner can report where in the graph things went wrong.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::TaskName;

#[derive(Error, Debug)]
pub enum SitedagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown task: {0}")]
    UnknownTask(TaskName),

    #[error("Cyclic task dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<TaskName>),

    #[error("Failed to read {path:?}: {message}")]
    SourceRead { path: PathBuf, message: String },

    #[error("Template error in {template:?}: {message}")]
    Template { template: PathBuf, message: String },

    #[error("Stylesheet compile error{}: {message}", line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Compile { message: String, line: Option<usize> },

    #[error("Transform failed for {path:?}: {message}")]
    Transform { path: PathBuf, message: String },

    #[error("Lint failed with {errors} error(s)")]
    Lint { errors: usize },

    #[error("Deploy failed: {0}")]
    Deploy(String),

    #[error("Task '{task}' failed: {source}")]
    TaskFailed {
        task: TaskName,
        #[source]
        source: Box<SitedagError>,
    },

    #[error("Task '{0}' terminated abnormally: {1}")]
    TaskPanicked(TaskName, String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SitedagError {
    /// Configuration errors are detected before any task work starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SitedagError::ConfigError(_)
                | SitedagError::UnknownTask(_)
                | SitedagError::CyclicDependency(_)
                | SitedagError::TomlError(_)
        )
    }

    /// Strip any `TaskFailed` wrappers and return the underlying error.
    pub fn root_cause(&self) -> &SitedagError {
        match self {
            SitedagError::TaskFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Name of the innermost task that failed, if the error came out of the runner.
    pub fn failed_task(&self) -> Option<&str> {
        match self {
            SitedagError::TaskFailed { task, source } => {
                source.failed_task().or(Some(task.as_str()))
            }
            SitedagError::TaskPanicked(task, _) => Some(task.as_str()),
            _ => None,
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        SitedagError::SourceRead {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn transform(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        SitedagError::Transform {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SitedagError>;
