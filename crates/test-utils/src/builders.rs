#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use sitedag::config::{ConfigFile, RawConfigFile, WatchRuleConfig};
use sitedag::fs::mock::MockFileSystem;
use sitedag::fs::FileSystem;
use sitedag::pipeline::SiteContext;
use sitedag::types::Environment;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    /// Drop the built-in watch rules.
    pub fn without_watch_rules(mut self) -> Self {
        self.config.watch.clear();
        self
    }

    pub fn with_watch_rule(mut self, name: &str, patterns: &[&str], tasks: &[&str]) -> Self {
        self.config.watch.push(WatchRuleConfig {
            name: name.to_string(),
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
            tasks: tasks.iter().map(|s| s.to_string()).collect(),
            reload: true,
        });
        self
    }

    /// Put every source and output path below `root`.
    pub fn rooted_at(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let paths = &mut self.config.paths;
        paths.dist = root.join(&paths.dist);
        paths.index_template = root.join(&paths.index_template);
        paths.item_template = root.join(&paths.item_template);
        paths.plans_dir = root.join(&paths.plans_dir);
        paths.stylesheet = root.join(&paths.stylesheet);
        self.config.lint.patterns = self
            .config
            .lint
            .patterns
            .iter()
            .map(|p| format!("{}/{}", root.to_string_lossy().replace('\\', "/"), p))
            .collect();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub const INDEX_TEMPLATE: &str = r#"<html><body><ul>{% for f in files %}<li><a href="{{ root }}plans/{{ f }}.html">{{ f }}</a></li>{% endfor %}</ul></body></html>"#;

pub const ITEM_TEMPLATE: &str =
    r#"<html><body><a href="{{ root }}">home</a><h1>{{ title }}</h1></body></html>"#;

pub const STYLESHEET: &str = "$accent: #336699\n\nbody\n  color: $accent\n  user-select: none\n";

/// In-memory site with the default source layout.
///
/// Templates and the stylesheet are always present; page-data documents are
/// added with [`MockSiteBuilder::plan`] in the order given.
pub struct MockSiteBuilder {
    fs: MockFileSystem,
}

impl MockSiteBuilder {
    pub fn new() -> Self {
        let fs = MockFileSystem::new();
        fs.add_file("src/html/index.html.j2", INDEX_TEMPLATE);
        fs.add_file("src/html/plan.html.j2", ITEM_TEMPLATE);
        fs.add_file("src/styles/main.sass", STYLESHEET);
        Self { fs }
    }

    pub fn plan(self, name: &str, json: &str) -> Self {
        self.fs.add_file(format!("src/plans/{name}.json"), json);
        self
    }

    pub fn file(self, path: &str, contents: &str) -> Self {
        self.fs.add_file(path, contents);
        self
    }

    pub fn build(self) -> MockFileSystem {
        self.fs
    }
}

impl Default for MockSiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Production-wired context over any filesystem with default paths.
pub fn site_context(fs: impl FileSystem + 'static, env: Environment) -> SiteContext {
    let fs: Arc<dyn FileSystem> = Arc::new(fs);
    SiteContext::new(fs, &ConfigFile::default(), env)
}
