// src/pipeline/clean.rs

use tracing::info;

use crate::errors::Result;
use crate::pipeline::SiteContext;

/// Delete the destination tree. A missing tree is fine.
pub fn clean(ctx: &SiteContext) -> Result<()> {
    let dist = &ctx.paths.dist;
    ctx.fs.remove_dir_all(dist)?;
    info!(dist = ?dist, "destination tree removed");
    Ok(())
}
