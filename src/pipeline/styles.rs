// src/pipeline/styles.rs

use tracing::{debug, error, info};

use crate::errors::{Result, SitedagError};
use crate::pipeline::SiteContext;

/// Compile the stylesheet entry point, prefix it and write the CSS.
///
/// A compile error is logged and the task still succeeds, so a typo in a
/// stylesheet never stops the watch loop. When browsers are connected the
/// new stylesheet is pushed to them without a full reload.
pub fn compile_styles(ctx: &SiteContext) -> Result<()> {
    let entry = &ctx.paths.stylesheet;
    let source = ctx
        .fs
        .read_to_string(entry)
        .map_err(|e| SitedagError::read(entry, e))?;

    let css = match ctx.compiler.compile(entry, &source) {
        Ok(css) => css,
        Err(err @ SitedagError::Compile { .. }) => {
            error!(entry = ?entry, error = %err, "stylesheet did not compile; keeping previous output");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let css = ctx.prefixer.prefix(&css);
    let out = ctx.paths.stylesheet_out();
    ctx.fs.write(&out, css.as_bytes())?;
    info!(out = ?out, bytes = css.len(), "stylesheet written");

    if let Some(bridge) = &ctx.bridge {
        if bridge.client_count() > 0 {
            let clients = bridge.push_css(ctx.paths.stylesheet_url());
            debug!(clients, "stylesheet pushed to browsers");
        }
    }

    Ok(())
}

/// Minify the compiled stylesheet in place.
pub fn minify_styles(ctx: &SiteContext) -> Result<()> {
    let path = ctx.paths.stylesheet_out();
    let css = ctx
        .fs
        .read_to_string(&path)
        .map_err(|e| SitedagError::read(&path, e))?;

    let minified = ctx.minifier.minify(&css)?;
    ctx.fs.write(&path, minified.as_bytes())?;
    info!(out = ?path, before = css.len(), after = minified.len(), "stylesheet minified");
    Ok(())
}
