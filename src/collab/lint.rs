// src/collab/lint.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::LintSection;
use crate::types::{LintRule, Severity};

/// One lint finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub path: PathBuf,
    /// 1-based.
    pub line: usize,
    pub rule: LintRule,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {} {}",
            self.path.display(),
            self.line,
            self.rule,
            self.message
        )
    }
}

/// Checks stylesheet sources against a rule configuration.
pub trait Linter: Send + Sync + fmt::Debug {
    fn lint(&self, path: &Path, source: &str, config: &LintSection) -> Vec<Finding>;
}

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6}|[0-9a-fA-F]{3,4})\b")
        .expect("Error compiling colour pattern")
});

/// Line-based linter for `.sass` and `.scss` sources.
///
/// Rules set to `off` are skipped entirely. Comment lines (`//`) are only
/// checked for whitespace and length.
#[derive(Debug, Clone, Default)]
pub struct RuleLinter;

impl RuleLinter {
    pub fn new() -> Self {
        Self
    }
}

impl Linter for RuleLinter {
    fn lint(&self, path: &Path, source: &str, config: &LintSection) -> Vec<Finding> {
        let mut findings = Vec::new();
        let mut report = |line: usize, rule: LintRule, message: String| {
            let severity = config.severity(rule);
            if severity != Severity::Off {
                findings.push(Finding {
                    path: path.to_path_buf(),
                    line,
                    rule,
                    severity,
                    message,
                });
            }
        };

        for (idx, line) in source.lines().enumerate() {
            let n = idx + 1;
            let trimmed = line.trim_start();
            let is_comment = trimmed.starts_with("//");

            if line.ends_with(' ') || line.ends_with('\t') {
                report(n, LintRule::NoTrailingWhitespace, "trailing whitespace".into());
            }

            let width = line.chars().count();
            if width > config.max_line_length {
                report(
                    n,
                    LintRule::MaxLineLength,
                    format!("line is {width} characters, limit is {}", config.max_line_length),
                );
            }

            if is_comment {
                continue;
            }

            if line.contains("!important") {
                report(n, LintRule::NoImportant, "!important is not allowed".into());
            }

            if trimmed.starts_with("@debug") {
                report(n, LintRule::NoDebug, "@debug statement left in source".into());
            }

            // Colour literals belong in variable declarations.
            if !trimmed.starts_with('$') && !trimmed.starts_with('@') {
                if let Some((_, value)) = trimmed.split_once(':') {
                    if let Some(m) = HEX_COLOR.find(value) {
                        report(
                            n,
                            LintRule::NoColorLiterals,
                            format!("colour literal {} should be a variable", m.as_str()),
                        );
                    }
                }
            }
        }

        if !source.is_empty() && !source.ends_with('\n') {
            report(
                source.lines().count().max(1),
                LintRule::FinalNewline,
                "file does not end with a newline".into(),
            );
        }

        findings
    }
}
