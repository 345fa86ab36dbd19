// src/watch/session.rs

use std::future::Future;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::info;

use crate::config::WatchRuleConfig;
use crate::engine::{Runtime, RuntimeEvent, WatchCore};
use crate::errors::Result;
use crate::exec::{RunnerBackend, TaskRunner};
use crate::server::ReloadBridge;
use crate::watch::patterns::build_rule_profiles;
use crate::watch::watcher::spawn_watcher;

/// Run the watch coordinator until `shutdown` resolves.
///
/// Wires the notify watcher, the coalescing core and a [`RunnerBackend`]
/// together. Task failures are logged by the runtime and never end the
/// session.
pub async fn run_watch<F>(
    root: PathBuf,
    rules: &[WatchRuleConfig],
    runner: TaskRunner,
    bridge: Option<ReloadBridge>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let profiles = build_rule_profiles(rules)?;
    let core = WatchCore::new(profiles.iter().map(|p| p.rule().clone()));

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Dropping the handle stops the watcher, so keep it for the whole session.
    let _watcher = spawn_watcher(root, profiles, rt_tx.clone())?;

    let backend = RunnerBackend::new(runner, rt_tx.clone());

    tokio::spawn(async move {
        shutdown.await;
        info!("stopping watch session");
        let _ = rt_tx.send(RuntimeEvent::ShutdownRequested).await;
    });

    Runtime::new(core, rt_rx, backend, bridge).run().await
}
