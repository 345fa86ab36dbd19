use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Name of the environment variable that selects the build environment.
pub const ENV_VAR: &str = "SITEDAG_ENV";

/// Build environment.
///
/// - `Development` (default): links are rooted at `/`, CSS is left expanded.
/// - `Production`: links are rooted at the production base path and the
///   `build` task minifies the stylesheet as its last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Resolve the environment from an explicit flag, falling back to
    /// `SITEDAG_ENV` and finally to `Development`.
    pub fn resolve(flag: Option<Environment>) -> Self {
        if let Some(env) = flag {
            return env;
        }

        std::env::var(ENV_VAR)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(format!(
                "invalid environment: {other} (expected \"production\" or \"development\")"
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// How seriously a lint finding is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Off,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Off => f.write_str("off"),
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Rules understood by the stylesheet linter.
///
/// Keys of the `[lint.rules]` table deserialize into this enum, so an
/// unknown rule name is rejected while parsing the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LintRule {
    NoImportant,
    NoTrailingWhitespace,
    NoColorLiterals,
    MaxLineLength,
    NoDebug,
    FinalNewline,
}

impl LintRule {
    pub const ALL: [LintRule; 6] = [
        LintRule::NoImportant,
        LintRule::NoTrailingWhitespace,
        LintRule::NoColorLiterals,
        LintRule::MaxLineLength,
        LintRule::NoDebug,
        LintRule::FinalNewline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LintRule::NoImportant => "no-important",
            LintRule::NoTrailingWhitespace => "no-trailing-whitespace",
            LintRule::NoColorLiterals => "no-color-literals",
            LintRule::MaxLineLength => "max-line-length",
            LintRule::NoDebug => "no-debug",
            LintRule::FinalNewline => "final-newline",
        }
    }

    /// Severity used when `[lint.rules]` does not mention the rule.
    pub fn default_severity(self) -> Severity {
        match self {
            LintRule::NoDebug => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for LintRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
