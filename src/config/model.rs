// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::{Environment, LintRule, Severity};

/// Configuration file as read from TOML, before validation.
///
/// Every section is optional:
///
/// ```toml
/// [paths]
/// dist = "public"
///
/// [site]
/// production_root = "/mealplans/"
///
/// [server]
/// port = 3333
///
/// [lint.rules]
/// no-important = "error"
///
/// [[watch]]
/// name = "styles"
/// patterns = ["src/styles/**/*"]
/// tasks = ["css"]
/// reload = false
/// ```
///
/// Giving any `[[watch]]` entry replaces the built-in watch rules entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub lint: LintSection,

    #[serde(default)]
    pub deploy: DeploySection,

    #[serde(default = "default_watch_rules")]
    pub watch: Vec<WatchRuleConfig>,
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            paths: PathsSection::default(),
            site: SiteSection::default(),
            server: ServerSection::default(),
            lint: LintSection::default(),
            deploy: DeploySection::default(),
            watch: default_watch_rules(),
        }
    }
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (or `Default`, whose
/// values are valid by construction).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub paths: PathsSection,
    pub site: SiteSection,
    pub server: ServerSection,
    pub lint: LintSection,
    pub deploy: DeploySection,
    pub watch: Vec<WatchRuleConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            paths: raw.paths,
            site: raw.site,
            server: raw.server,
            lint: raw.lint,
            deploy: raw.deploy,
            watch: raw.watch,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[paths]`: where sources are read from and outputs are written to.
///
/// Relative paths are resolved against the working directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Destination tree, removed by `clean`.
    pub dist: PathBuf,
    /// Page-list template.
    pub index_template: PathBuf,
    /// Per-item page template.
    pub item_template: PathBuf,
    /// Directory of page-data JSON documents.
    pub plans_dir: PathBuf,
    /// Stylesheet entry point. The extension picks the input syntax.
    pub stylesheet: PathBuf,
    /// Subdirectory of `dist` receiving one page per JSON document.
    pub items_subdir: PathBuf,
    /// Subdirectory of `dist` receiving the compiled stylesheet.
    pub styles_subdir: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            dist: PathBuf::from("dist"),
            index_template: PathBuf::from("src/html/index.html.j2"),
            item_template: PathBuf::from("src/html/plan.html.j2"),
            plans_dir: PathBuf::from("src/plans"),
            stylesheet: PathBuf::from("src/styles/main.sass"),
            items_subdir: PathBuf::from("plans"),
            styles_subdir: PathBuf::from("styles"),
        }
    }
}

impl PathsSection {
    pub fn items_out(&self) -> PathBuf {
        self.dist.join(&self.items_subdir)
    }

    pub fn styles_out(&self) -> PathBuf {
        self.dist.join(&self.styles_subdir)
    }

    /// Output path of the compiled stylesheet (`dist/styles/main.css`).
    pub fn stylesheet_out(&self) -> PathBuf {
        let stem = self
            .stylesheet
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "main".into());
        let mut name = stem;
        name.push(".css");
        self.styles_out().join(name)
    }

    /// URL path of the compiled stylesheet, as browsers request it.
    pub fn stylesheet_url(&self) -> String {
        let rel = self
            .stylesheet_out()
            .strip_prefix(&self.dist)
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|_| self.stylesheet_out());
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        format!("/{}", parts.join("/"))
    }
}

/// `[site]`: the `root` base path substituted into generated links.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub production_root: String,
    pub development_root: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            production_root: "/mealplans/".to_string(),
            development_root: "/".to_string(),
        }
    }
}

impl SiteSection {
    pub fn root_for(&self, env: Environment) -> &str {
        if env.is_production() {
            &self.production_root
        } else {
            &self.development_root
        }
    }
}

/// `[server]`: the development server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Inject the reload client into served HTML pages.
    pub live_reload: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3333,
            live_reload: true,
        }
    }
}

impl ServerSection {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `[lint]`: stylesheet lint settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LintSection {
    /// Files to lint.
    pub patterns: Vec<String>,
    /// Limit used by the `max-line-length` rule.
    pub max_line_length: usize,
    /// Per-rule severity overrides.
    pub rules: BTreeMap<LintRule, Severity>,
}

impl Default for LintSection {
    fn default() -> Self {
        Self {
            patterns: vec!["src/styles/**/*.s[ac]ss".to_string()],
            max_line_length: 120,
            rules: BTreeMap::new(),
        }
    }
}

impl LintSection {
    pub fn severity(&self, rule: LintRule) -> Severity {
        self.rules
            .get(&rule)
            .copied()
            .unwrap_or_else(|| rule.default_severity())
    }
}

/// `[deploy]`: publishing `dist/` to a hosting branch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeploySection {
    /// Remote URL; taken from the project's `origin` when unset.
    pub remote: Option<String>,
    pub branch: String,
    pub message: String,
    /// Scratch repository the snapshot is committed in.
    pub scratch_dir: PathBuf,
}

impl Default for DeploySection {
    fn default() -> Self {
        Self {
            remote: None,
            branch: "gh-pages".to_string(),
            message: "Update site".to_string(),
            scratch_dir: PathBuf::from(".publish"),
        }
    }
}

/// One `[[watch]]` entry: which changes re-run which tasks.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WatchRuleConfig {
    pub name: String,
    pub patterns: Vec<String>,
    /// Run in sequence on every triggered run.
    pub tasks: Vec<String>,
    /// Send a full page reload to connected browsers after each run.
    #[serde(default = "default_reload")]
    pub reload: bool,
}

fn default_reload() -> bool {
    true
}

fn default_watch_rules() -> Vec<WatchRuleConfig> {
    vec![
        WatchRuleConfig {
            name: "html".to_string(),
            patterns: vec!["src/html/index.html.j2".to_string()],
            tasks: vec!["html".to_string()],
            reload: true,
        },
        WatchRuleConfig {
            name: "plans".to_string(),
            patterns: vec![
                "src/html/plan.html.j2".to_string(),
                "src/plans/*.json".to_string(),
            ],
            tasks: vec!["plans".to_string()],
            reload: true,
        },
        // `css` streams the new stylesheet itself, no full reload.
        WatchRuleConfig {
            name: "styles".to_string(),
            patterns: vec!["src/styles/**/*".to_string()],
            tasks: vec!["css".to_string()],
            reload: false,
        },
    ]
}
