// src/pipeline/mod.rs

//! File-transform pipelines behind the build tasks.
//!
//! Every pipeline has the same shape: find source files, derive each
//! output path, call one collaborator per file, write the result. They are
//! synchronous and run on the blocking pool when scheduled as tasks.
//!
//! Pipelines write disjoint parts of the destination tree (pages at the
//! root, items under the items subdirectory, styles under the styles
//! subdirectory), so members of a parallel group never race on a path.

use std::fmt;
use std::sync::Arc;

use crate::collab::{
    GrassCompiler, GrassMinifier, JinjaRenderer, Linter, Minifier, Prefixer, RuleLinter,
    StylesheetCompiler, TemplateRenderer, VendorPrefixer,
};
use crate::config::{ConfigFile, LintSection, PathsSection};
use crate::fs::FileSystem;
use crate::server::ReloadBridge;
use crate::types::Environment;

pub mod clean;
pub mod lint;
pub mod pages;
pub mod styles;

pub use clean::clean;
pub use lint::{collect_lint_targets, glob_base, lint_styles};
pub use pages::{page_names, render_items, render_page_list};
pub use styles::{compile_styles, minify_styles};

/// Everything a pipeline needs: where to read and write, which environment
/// it runs in, and the collaborators it calls.
#[derive(Clone)]
pub struct SiteContext {
    pub fs: Arc<dyn FileSystem>,
    pub paths: PathsSection,
    pub lint: LintSection,
    pub env: Environment,
    /// Base path substituted into generated links.
    pub root: String,
    pub renderer: Arc<dyn TemplateRenderer>,
    pub compiler: Arc<dyn StylesheetCompiler>,
    pub prefixer: Arc<dyn Prefixer>,
    pub minifier: Arc<dyn Minifier>,
    pub linter: Arc<dyn Linter>,
    /// Live-reload session, when the dev server runs in this process.
    pub bridge: Option<ReloadBridge>,
}

impl SiteContext {
    /// Context wired to the production collaborators.
    pub fn new(fs: Arc<dyn FileSystem>, cfg: &ConfigFile, env: Environment) -> Self {
        Self {
            renderer: Arc::new(JinjaRenderer::new(Arc::clone(&fs))),
            compiler: Arc::new(GrassCompiler::new(Arc::clone(&fs))),
            prefixer: Arc::new(VendorPrefixer::new()),
            minifier: Arc::new(GrassMinifier::new(Arc::clone(&fs))),
            linter: Arc::new(RuleLinter::new()),
            paths: cfg.paths.clone(),
            lint: cfg.lint.clone(),
            root: cfg.site.root_for(env).to_string(),
            env,
            bridge: None,
            fs,
        }
    }

    pub fn with_bridge(mut self, bridge: ReloadBridge) -> Self {
        self.bridge = Some(bridge);
        self
    }
}

impl fmt::Debug for SiteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteContext")
            .field("paths", &self.paths)
            .field("env", &self.env)
            .field("root", &self.root)
            .field("live_reload", &self.bridge.is_some())
            .finish_non_exhaustive()
    }
}
