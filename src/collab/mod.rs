// src/collab/mod.rs

//! Collaborators the pipelines call through narrow traits.
//!
//! Each trait has one production implementation backed by a library or an
//! external program; tests can substitute their own.

pub mod deploy;
pub mod lint;
pub mod minify;
pub mod prefix;
pub mod stylesheet;
pub mod template;

pub use deploy::{copy_tree, Deployer, GitPagesDeployer};
pub use lint::{Finding, Linter, RuleLinter};
pub use minify::{GrassMinifier, Minifier};
pub use prefix::{Prefixer, VendorPrefixer};
pub use stylesheet::{syntax_for, GrassCompiler, StylesheetCompiler};
pub use template::{JinjaRenderer, TemplateRenderer};
