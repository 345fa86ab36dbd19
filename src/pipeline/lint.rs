// src/pipeline/lint.rs

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::errors::{Result, SitedagError};
use crate::fs::FileSystem;
use crate::pipeline::SiteContext;
use crate::watch::build_globset;

/// Literal directory prefix of a glob, e.g. `src/styles` for
/// `src/styles/**/*.scss`. Walking starts there instead of the project root.
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let mut parts = pattern.split('/').peekable();
    while let Some(part) = parts.next() {
        if part.contains(['*', '?', '[', '{']) || parts.peek().is_none() {
            break;
        }
        base.push(part);
    }
    if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base
    }
}

/// Files matching any of `patterns`, sorted and deduplicated.
pub fn collect_lint_targets(fs: &dyn FileSystem, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let set = build_globset(patterns)?;
    let mut targets = Vec::new();

    for pattern in patterns {
        let base = glob_base(pattern);
        if !fs.is_dir(&base) {
            continue;
        }
        for file in fs.walk_files(&base).map_err(|e| SitedagError::read(&base, e))? {
            let rel = file.to_string_lossy().replace('\\', "/");
            let rel = rel.strip_prefix("./").unwrap_or(&rel);
            if set.is_match(rel) {
                targets.push(file);
            }
        }
    }

    targets.sort();
    targets.dedup();
    Ok(targets)
}

/// Lint every stylesheet source; any `error` finding fails the task.
pub fn lint_styles(ctx: &SiteContext) -> Result<()> {
    let targets = collect_lint_targets(ctx.fs.as_ref(), &ctx.lint.patterns)?;
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for path in &targets {
        let source = ctx
            .fs
            .read_to_string(path)
            .map_err(|e| SitedagError::read(path, e))?;

        for finding in ctx.linter.lint(path, &source, &ctx.lint) {
            if finding.is_error() {
                errors += 1;
                error!("{finding}");
            } else {
                warnings += 1;
                warn!("{finding}");
            }
        }
    }

    info!(files = targets.len(), errors, warnings, "lint finished");

    if errors > 0 {
        Err(SitedagError::Lint { errors })
    } else {
        Ok(())
    }
}

