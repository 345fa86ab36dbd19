// src/collab/minify.rs

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::collab::stylesheet::{GrassCompiler, StylesheetCompiler};
use crate::errors::Result;
use crate::fs::FileSystem;

/// Shrinks CSS text.
pub trait Minifier: Send + Sync + fmt::Debug {
    fn minify(&self, css: &str) -> Result<String>;
}

/// Re-emits plain CSS in `grass`'s compressed style.
#[derive(Debug, Clone)]
pub struct GrassMinifier {
    compiler: GrassCompiler,
}

impl GrassMinifier {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            compiler: GrassCompiler::new(fs).compressed(),
        }
    }
}

impl Minifier for GrassMinifier {
    fn minify(&self, css: &str) -> Result<String> {
        self.compiler.compile(Path::new("input.css"), css)
    }
}
