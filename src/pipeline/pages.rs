// src/pipeline/pages.rs

//! Page generation: the page list and one page per JSON document.

use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tracing::{debug, error, info};

use crate::errors::{Result, SitedagError};
use crate::fs::FileSystem;
use crate::pipeline::SiteContext;

/// Page-data documents below `dir`, sorted by path.
fn page_documents(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut docs: Vec<PathBuf> = fs
        .walk_files(dir)
        .map_err(|e| SitedagError::read(dir, e))?
        .into_iter()
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    docs.sort();
    Ok(docs)
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Names (file stems) of the page-data documents below `dir`.
pub fn page_names(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<String>> {
    Ok(page_documents(fs, dir)?.iter().map(|p| stem(p)).collect())
}

/// Render the page-list template to `dist/index.html`.
///
/// Context: `{ "root": <base path>, "files": [<names>] }`.
pub fn render_page_list(ctx: &SiteContext) -> Result<()> {
    let files = page_names(ctx.fs.as_ref(), &ctx.paths.plans_dir)?;
    debug!(?files, "page list");

    let context = json!({
        "root": ctx.root,
        "files": files,
    });
    let html = ctx.renderer.render(&ctx.paths.index_template, &context)?;

    let out = ctx.paths.dist.join("index.html");
    ctx.fs.write(&out, html.as_bytes())?;
    info!(out = ?out, pages = files.len(), "page list written");
    Ok(())
}

/// Render one page per JSON document into the items directory.
///
/// Each document is rendered on its own: a bad document is logged and
/// skipped, its siblings are still written, and the pass then fails naming
/// every document that could not be rendered.
pub fn render_items(ctx: &SiteContext) -> Result<()> {
    let docs = page_documents(ctx.fs.as_ref(), &ctx.paths.plans_dir)?;
    let out_dir = ctx.paths.items_out();

    let mut failures: Vec<(PathBuf, SitedagError)> = Vec::new();
    let mut written = 0usize;

    for doc in &docs {
        match render_item(ctx, doc, &out_dir) {
            Ok(out) => {
                debug!(doc = ?doc, out = ?out, "page written");
                written += 1;
            }
            Err(err) => {
                error!(doc = ?doc, error = %err, "page generation failed");
                failures.push((doc.clone(), err));
            }
        }
    }

    info!(written, failed = failures.len(), "item pages generated");

    match failures.len() {
        0 => Ok(()),
        1 => Err(failures.remove(0).1),
        n => {
            let names: Vec<String> = failures
                .iter()
                .map(|(path, err)| format!("{} ({err})", path.display()))
                .collect();
            Err(SitedagError::transform(
                &ctx.paths.plans_dir,
                format!("{n} of {} pages failed: {}", docs.len(), names.join("; ")),
            ))
        }
    }
}

fn render_item(ctx: &SiteContext, doc: &Path, out_dir: &Path) -> Result<PathBuf> {
    let text = ctx
        .fs
        .read_to_string(doc)
        .map_err(|e| SitedagError::read(doc, e))?;
    let data: Value = serde_json::from_str(&text).map_err(|e| SitedagError::transform(doc, e))?;

    let context = item_context(data, &ctx.root).map_err(|msg| SitedagError::transform(doc, msg))?;
    let html = ctx.renderer.render(&ctx.paths.item_template, &context)?;

    let out = out_dir.join(format!("{}.html", stem(doc)));
    ctx.fs.write(&out, html.as_bytes())?;
    Ok(out)
}

/// The document's own fields plus `root`; a `root` key in the document wins.
pub fn item_context(data: Value, root: &str) -> std::result::Result<Value, String> {
    let Value::Object(fields) = data else {
        return Err("page data must be a JSON object".to_string());
    };

    let mut context = Map::new();
    context.insert("root".to_string(), Value::String(root.to_string()));
    context.extend(fields);
    Ok(Value::Object(context))
}
