// src/collab/template.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use serde_json::Value;

use crate::errors::{Result, SitedagError};
use crate::fs::FileSystem;

/// Renders a template file with a data context into markup.
pub trait TemplateRenderer: Send + Sync + fmt::Debug {
    /// Fails with [`SitedagError::Template`] on a malformed template or a
    /// missing data field.
    fn render(&self, template: &Path, context: &Value) -> Result<String>;
}

/// `minijinja`-backed renderer.
///
/// Undefined variables are errors. Templates may extend or include other
/// templates from the same directory. Sources are re-read on every render so
/// watch runs pick up edits.
#[derive(Debug, Clone)]
pub struct JinjaRenderer {
    fs: Arc<dyn FileSystem>,
}

impl JinjaRenderer {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    fn environment(&self, dir: PathBuf) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        let fs = Arc::clone(&self.fs);
        env.set_loader(move |name| {
            let path = dir.join(name);
            if !fs.is_file(&path) {
                return Ok(None);
            }
            fs.read_to_string(&path).map(Some).map_err(|e| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("cannot read template {path:?}: {e}"),
                )
            })
        });

        env
    }
}

impl TemplateRenderer for JinjaRenderer {
    fn render(&self, template: &Path, context: &Value) -> Result<String> {
        let template_error = |message: String| SitedagError::Template {
            template: template.to_path_buf(),
            message,
        };

        let name = template
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| template_error("template path has no file name".to_string()))?;
        let dir = template.parent().map(Path::to_path_buf).unwrap_or_default();

        if !self.fs.is_file(template) {
            return Err(SitedagError::read(template, "template not found"));
        }

        let env = self.environment(dir);
        let compiled = env
            .get_template(name)
            .map_err(|e| template_error(describe(&e)))?;
        compiled
            .render(context)
            .map_err(|e| template_error(describe(&e)))
    }
}

fn describe(err: &minijinja::Error) -> String {
    match err.line() {
        Some(line) => format!("{err} (line {line})"),
        None => err.to_string(),
    }
}
