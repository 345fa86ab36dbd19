// src/collab/stylesheet.rs

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use grass::{InputSyntax, Options, OutputStyle};
use regex::Regex;

use crate::errors::{Result, SitedagError};
use crate::fs::FileSystem;

/// Compiles stylesheet source text to CSS.
pub trait StylesheetCompiler: Send + Sync + fmt::Debug {
    /// `path` is where `source` came from; imports resolve relative to it
    /// and its extension selects the input syntax.
    ///
    /// Fails with [`SitedagError::Compile`].
    fn compile(&self, path: &Path, source: &str) -> Result<String>;
}

/// Sass compiler backed by `grass`, reading imports through [`FileSystem`].
#[derive(Debug, Clone)]
pub struct GrassCompiler {
    fs: Arc<dyn FileSystem>,
    style: OutputStyle,
}

impl GrassCompiler {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            style: OutputStyle::Expanded,
        }
    }

    pub fn compressed(mut self) -> Self {
        self.style = OutputStyle::Compressed;
        self
    }
}

impl StylesheetCompiler for GrassCompiler {
    fn compile(&self, path: &Path, source: &str) -> Result<String> {
        let fs = GrassFs(self.fs.as_ref());
        let mut options = Options::default()
            .fs(&fs)
            .style(self.style)
            .input_syntax(syntax_for(path));
        if let Some(dir) = path.parent() {
            options = options.load_path(dir);
        }

        grass::from_string(source.to_owned(), &options).map_err(|err| compile_error(&err.to_string()))
    }
}

/// Input syntax picked from the file extension; unknown extensions are
/// treated as SCSS.
pub fn syntax_for(path: &Path) -> InputSyntax {
    match path.extension().and_then(|e| e.to_str()) {
        Some("sass") => InputSyntax::Sass,
        Some("css") => InputSyntax::Css,
        _ => InputSyntax::Scss,
    }
}

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*\S+ (\d+):(\d+)\s+").expect("Error compiling location pattern")
});

/// Split a `grass` error report into its message and line number.
pub(crate) fn compile_error(report: &str) -> SitedagError {
    let message = report
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("Error: ")
        .to_string();
    let line = LOCATION
        .captures(report)
        .and_then(|c| c[1].parse::<usize>().ok());

    SitedagError::Compile { message, line }
}

/// Adapter exposing a [`FileSystem`] to `grass` for `@use` / `@import`.
#[derive(Debug)]
struct GrassFs<'a>(&'a dyn FileSystem);

impl grass::Fs for GrassFs<'_> {
    fn is_dir(&self, path: &Path) -> bool {
        self.0.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.0.is_file(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.0
            .read(path)
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, e.to_string()))
    }
}
