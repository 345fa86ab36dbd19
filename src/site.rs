// src/site.rs

//! The task catalogue.
//!
//! | task             | does                                                  |
//! |------------------|-------------------------------------------------------|
//! | `clean`          | delete the destination tree                           |
//! | `html`           | render the page list                                  |
//! | `plans`          | render one page per JSON document                     |
//! | `css`            | compile, prefix and write the stylesheet              |
//! | `minify:css`     | minify the written stylesheet in place                |
//! | `minify`         | `css`, then `minify:css`                              |
//! | `lint:sass`      | lint stylesheet sources                               |
//! | `deploy:ghpages` | publish the destination tree                          |
//! | `build`          | `clean`, then `html` + `plans` + `css` in parallel    |
//! | `serve`          | dev server with live reload, until Ctrl-C             |
//! | `watch`          | re-run tasks on source changes, until Ctrl-C          |
//! | `default`        | `build`, then `serve` + `watch` in parallel           |
//! | `deploy`         | `build`, `minify`, `deploy:ghpages`                   |
//!
//! In production `build` also runs `minify:css` as its last step.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

use crate::collab::Deployer;
use crate::config::{validate_watch_tasks, ConfigFile};
use crate::dag::{DependencySpec, Step, TaskRegistry};
use crate::errors::Result;
use crate::exec::{blocking_fn, work_fn, TaskRunner};
use crate::pipeline::{self, SiteContext};
use crate::server::{self, ReloadBridge};
use crate::watch;

/// Build the full task catalogue.
///
/// `watch` re-runs tasks through its own runner over the build tasks, so
/// those are registered first and the long-running tasks on top.
pub fn register_site_tasks(
    ctx: SiteContext,
    cfg: &ConfigFile,
    deployer: Arc<dyn Deployer>,
) -> Result<TaskRegistry> {
    let bridge = ctx.bridge.clone().unwrap_or_default();

    let mut registry = TaskRegistry::new();
    register_build_tasks(&mut registry, ctx, deployer);
    validate_watch_tasks(cfg, &registry)?;

    let runner = TaskRunner::new(registry.clone());
    register_session_tasks(&mut registry, cfg, runner, bridge);
    Ok(registry)
}

/// Everything except the long-running `serve`, `watch` and `default`.
pub fn register_build_tasks(
    registry: &mut TaskRegistry,
    ctx: SiteContext,
    deployer: Arc<dyn Deployer>,
) {
    let production = ctx.env.is_production();
    let ctx = Arc::new(ctx);

    registry.define_work("clean", blocking_fn({
        let ctx = Arc::clone(&ctx);
        move || pipeline::clean(&ctx)
    }));
    registry.define_work("html", blocking_fn({
        let ctx = Arc::clone(&ctx);
        move || pipeline::render_page_list(&ctx)
    }));
    registry.define_work("plans", blocking_fn({
        let ctx = Arc::clone(&ctx);
        move || pipeline::render_items(&ctx)
    }));
    registry.define_work("css", blocking_fn({
        let ctx = Arc::clone(&ctx);
        move || pipeline::compile_styles(&ctx)
    }));
    registry.define_work("minify:css", blocking_fn({
        let ctx = Arc::clone(&ctx);
        move || pipeline::minify_styles(&ctx)
    }));
    registry.define_work("lint:sass", blocking_fn({
        let ctx = Arc::clone(&ctx);
        move || pipeline::lint_styles(&ctx)
    }));

    let dist = ctx.paths.dist.clone();
    registry.define_work(
        "deploy:ghpages",
        work_fn(move || {
            let deployer = Arc::clone(&deployer);
            let dist = dist.clone();
            async move { deployer.deploy(&dist).await }
        }),
    );

    registry.define_group("minify", DependencySpec::sequence(["css", "minify:css"]));

    let fan_out = DependencySpec::parallel(["html", "plans", "css"]);
    let build = if production {
        DependencySpec::sequence([
            Step::from("clean"),
            Step::from(fan_out),
            Step::from("minify:css"),
        ])
    } else {
        DependencySpec::sequence([Step::from("clean"), Step::from(fan_out)])
    };
    registry.define_group("build", build);

    registry.define_group(
        "deploy",
        DependencySpec::sequence(["build", "minify", "deploy:ghpages"]),
    );
}

/// `serve`, `watch` and `default`.
fn register_session_tasks(
    registry: &mut TaskRegistry,
    cfg: &ConfigFile,
    runner: TaskRunner,
    bridge: ReloadBridge,
) {
    let server_cfg = cfg.server.clone();
    let dist = cfg.paths.dist.clone();
    registry.define_work("serve", {
        let bridge = bridge.clone();
        work_fn(move || {
            let server_cfg = server_cfg.clone();
            let dist = dist.clone();
            let bridge = bridge.clone();
            async move { server::serve(&server_cfg, dist, bridge, shutdown_signal()).await }
        })
    });

    let rules = cfg.watch.clone();
    registry.define_work(
        "watch",
        work_fn(move || {
            let rules = rules.clone();
            let runner = runner.clone();
            let bridge = bridge.clone();
            async move {
                watch::run_watch(PathBuf::from("."), &rules, runner, Some(bridge), shutdown_signal())
                    .await
            }
        }),
    );

    registry.define_group(
        "default",
        DependencySpec::sequence([
            Step::from("build"),
            Step::from(DependencySpec::parallel(["serve", "watch"])),
        ]),
    );
}

/// Resolves on Ctrl-C. If the signal handler cannot be installed it never
/// resolves, so long-running tasks keep going.
pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
