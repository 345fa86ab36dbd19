// src/config/validate.rs

use std::collections::HashSet;

use globset::Glob;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::dag::TaskRegistry;
use crate::errors::{Result, SitedagError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SitedagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_site(cfg)?;
    validate_server(cfg)?;
    validate_lint(cfg)?;
    validate_deploy(cfg)?;
    validate_watch_rules(cfg)?;
    Ok(())
}

fn validate_site(cfg: &RawConfigFile) -> Result<()> {
    for (key, root) in [
        ("production_root", &cfg.site.production_root),
        ("development_root", &cfg.site.development_root),
    ] {
        if !root.starts_with('/') {
            return Err(SitedagError::ConfigError(format!(
                "[site].{key} must start with '/' (got {root:?})"
            )));
        }
    }
    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.port == 0 {
        return Err(SitedagError::ConfigError(
            "[server].port must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_lint(cfg: &RawConfigFile) -> Result<()> {
    for pattern in &cfg.lint.patterns {
        check_glob("[lint].patterns", pattern)?;
    }
    if cfg.lint.max_line_length == 0 {
        return Err(SitedagError::ConfigError(
            "[lint].max_line_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_deploy(cfg: &RawConfigFile) -> Result<()> {
    if cfg.deploy.branch.trim().is_empty() {
        return Err(SitedagError::ConfigError(
            "[deploy].branch must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_watch_rules(cfg: &RawConfigFile) -> Result<()> {
    let mut names = HashSet::new();

    for rule in &cfg.watch {
        if rule.name.trim().is_empty() {
            return Err(SitedagError::ConfigError(
                "[[watch]] entries need a non-empty name".to_string(),
            ));
        }
        if !names.insert(rule.name.as_str()) {
            return Err(SitedagError::ConfigError(format!(
                "watch rule '{}' is defined more than once",
                rule.name
            )));
        }
        if rule.patterns.is_empty() {
            return Err(SitedagError::ConfigError(format!(
                "watch rule '{}' has no patterns",
                rule.name
            )));
        }
        if rule.tasks.is_empty() {
            return Err(SitedagError::ConfigError(format!(
                "watch rule '{}' has no tasks",
                rule.name
            )));
        }
        for pattern in &rule.patterns {
            check_glob(&format!("watch rule '{}'", rule.name), pattern)?;
        }
    }

    Ok(())
}

fn check_glob(owner: &str, pattern: &str) -> Result<()> {
    Glob::new(pattern).map(|_| ()).map_err(|e| {
        SitedagError::ConfigError(format!("{owner}: invalid glob {pattern:?}: {e}"))
    })
}

/// Check that every task named by a watch rule is registered.
///
/// Runs after the task catalogue is built, since the config alone does not
/// know which tasks exist.
pub fn validate_watch_tasks(cfg: &ConfigFile, registry: &TaskRegistry) -> Result<()> {
    for rule in &cfg.watch {
        for task in &rule.tasks {
            if !registry.contains(task) {
                return Err(SitedagError::ConfigError(format!(
                    "watch rule '{}' names unknown task '{}'",
                    rule.name, task
                )));
            }
        }
    }
    Ok(())
}
