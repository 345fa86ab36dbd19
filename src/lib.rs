// src/lib.rs

pub mod cli;
pub mod collab;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod site;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::collab::GitPagesDeployer;
use crate::config::load_or_default;
use crate::dag::TaskRegistry;
use crate::exec::TaskRunner;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::SiteContext;
use crate::server::ReloadBridge;
use crate::site::register_site_tasks;
use crate::types::Environment;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and environment selection
/// - the task catalogue and its collaborators
/// - dependency validation (fails before any work starts)
/// - `--list` / `--dry-run` output, or the actual run
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref())?;
    let env = Environment::resolve(args.env);
    info!(%env, task = %args.task, "sitedag starting");

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let ctx = SiteContext::new(fs, &cfg, env).with_bridge(ReloadBridge::new());
    let deployer = Arc::new(GitPagesDeployer::new(cfg.deploy.clone()));

    let registry = register_site_tasks(ctx, &cfg, deployer)?;
    registry.validate()?;

    if args.list {
        print_task_list(&registry);
        return Ok(());
    }

    let plan = registry.resolve(&args.task)?;
    if args.dry_run {
        println!("sitedag dry-run ({env})");
        print!("{}", plan.render());
        debug!("dry-run complete (no execution)");
        return Ok(());
    }

    TaskRunner::new(registry).run(&args.task).await?;
    Ok(())
}

fn print_task_list(registry: &TaskRegistry) {
    println!("tasks:");
    for name in registry.task_names() {
        match registry.get(name) {
            Ok(task) if !matches!(task.deps(), crate::dag::DependencySpec::None) => {
                println!("  {name:<16} {}", task.deps());
            }
            _ => println!("  {name}"),
        }
    }
}
