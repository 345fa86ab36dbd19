// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::WatchRuleConfig;
use crate::engine::{RuleName, WatchRule};

/// Compiled glob patterns for a single watch rule.
///
/// The patterns are relative to the project root. The watcher passes
/// relative, forward-slash paths (e.g. `"src/styles/_base.scss"`) into
/// [`RuleWatchProfile::matches`].
#[derive(Clone)]
pub struct RuleWatchProfile {
    rule: WatchRule,
    patterns: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for RuleWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleWatchProfile")
            .field("rule", &self.rule.name)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl RuleWatchProfile {
    pub fn name(&self) -> &RuleName {
        &self.rule.name
    }

    /// The engine-side view of this rule.
    pub fn rule(&self) -> &WatchRule {
        &self.rule
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }
}

/// Compile every `[[watch]]` rule.
pub fn build_rule_profiles(rules: &[WatchRuleConfig]) -> Result<Vec<RuleWatchProfile>> {
    rules
        .iter()
        .map(|cfg| {
            let set = build_globset(&cfg.patterns)
                .with_context(|| format!("building globset for watch rule {}", cfg.name))?;
            Ok(RuleWatchProfile {
                rule: WatchRule {
                    name: cfg.name.clone(),
                    tasks: cfg.tasks.clone(),
                    reload: cfg.reload,
                },
                patterns: cfg.patterns.clone(),
                set,
            })
        })
        .collect()
}

/// Names of the rules interested in `rel_path`, in declaration order.
pub fn matching_rules<'a>(profiles: &'a [RuleWatchProfile], rel_path: &str) -> Vec<&'a str> {
    profiles
        .iter()
        .filter(|p| p.matches(rel_path))
        .map(|p| p.name().as_str())
        .collect()
}

/// Build a GlobSet from simple string patterns.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
