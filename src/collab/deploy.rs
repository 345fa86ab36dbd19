// src/collab/deploy.rs

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::DeploySection;
use crate::errors::{Result, SitedagError};
use crate::fs::{FileSystem, RealFileSystem};

pub type DeployFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Publishes a snapshot of the destination tree to a hosting target.
pub trait Deployer: Send + Sync + fmt::Debug {
    /// Fails with [`SitedagError::Deploy`]. `dist` itself is never modified.
    fn deploy<'a>(&'a self, dist: &'a Path) -> DeployFuture<'a>;
}

/// Force-pushes a copy of `dist` to a `gh-pages`-style branch.
///
/// The copy is committed in a scratch repository so the project's own
/// working tree and history are left alone.
#[derive(Debug, Clone)]
pub struct GitPagesDeployer {
    cfg: DeploySection,
}

impl GitPagesDeployer {
    pub fn new(cfg: DeploySection) -> Self {
        Self { cfg }
    }

    async fn publish(&self, dist: &Path) -> Result<()> {
        let fs = RealFileSystem;
        if !fs.is_dir(dist) {
            return Err(SitedagError::Deploy(format!(
                "nothing to deploy: {dist:?} does not exist"
            )));
        }

        let remote = match &self.cfg.remote {
            Some(remote) => remote.clone(),
            None => git(Path::new("."), &["remote", "get-url", "origin"]).await?,
        };

        let scratch = &self.cfg.scratch_dir;
        fs.remove_dir_all(scratch)
            .and_then(|()| fs.create_dir_all(scratch))
            .map_err(|e| SitedagError::Deploy(format!("preparing {scratch:?}: {e}")))?;

        let copied = copy_tree(&fs, dist, scratch)
            .map_err(|e| SitedagError::Deploy(format!("copying {dist:?}: {e}")))?;
        debug!(files = copied.len(), "snapshot copied");

        let head = format!("refs/heads/{}", self.cfg.branch);
        git(scratch, &["init", "--quiet"]).await?;
        git(scratch, &["symbolic-ref", "HEAD", &head]).await?;
        git(scratch, &["add", "--all"]).await?;
        git(scratch, &["commit", "--quiet", "-m", &self.cfg.message]).await?;
        git(scratch, &["push", "--force", &remote, &self.cfg.branch]).await?;

        info!(branch = %self.cfg.branch, remote = %remote, "deployed");
        Ok(())
    }
}

impl Deployer for GitPagesDeployer {
    fn deploy<'a>(&'a self, dist: &'a Path) -> DeployFuture<'a> {
        Box::pin(self.publish(dist))
    }
}

/// Copy every file below `from` to the same relative location below `to`.
///
/// Returns the written destination paths.
pub fn copy_tree(fs: &dyn FileSystem, from: &Path, to: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for file in fs.walk_files(from)? {
        let rel = file.strip_prefix(from)?;
        let dest = to.join(rel);
        fs.write(&dest, &fs.read(&file)?)?;
        written.push(dest);
    }
    Ok(written)
}

/// Run git in `dir`, returning trimmed stdout.
async fn git(dir: &Path, args: &[&str]) -> Result<String> {
    debug!(?dir, ?args, "running git");
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .map_err(|e| SitedagError::Deploy(format!("cannot run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SitedagError::Deploy(format!(
            "git {} failed ({}): {}",
            args.join(" "),
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
