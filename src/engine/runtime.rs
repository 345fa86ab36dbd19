// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::RunBackend;
use crate::server::ReloadBridge;

use super::core::{CoreCommand, WatchCore};
use super::RuntimeEvent;

/// Drives the [`WatchCore`] in response to `RuntimeEvent`s and delegates
/// actual task runs to a [`RunBackend`].
///
/// This is a pure IO shell around the core: it reads events from the
/// channel, dispatches runs, and forwards reload signals to the
/// [`ReloadBridge`] when one is attached.
pub struct Runtime<B: RunBackend> {
    core: WatchCore,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
    bridge: Option<ReloadBridge>,
}

impl<B: RunBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: RunBackend> Runtime<B> {
    pub fn new(
        core: WatchCore,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        backend: B,
        bridge: Option<ReloadBridge>,
    ) -> Self {
        Self {
            core,
            event_rx,
            backend,
            bridge,
        }
    }

    /// Main event loop.
    ///
    /// Task failures never end the loop; they come back as failed
    /// `RunCompleted` events and the rule returns to `Idle`.
    pub async fn run(mut self) -> Result<()> {
        info!("watch runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("shutdown requested; stopping watch runtime");
                break;
            }
        }

        info!("watch runtime exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchRun { rule, tasks } => {
                debug!(rule = %rule, ?tasks, "dispatching watch run");
                self.backend.dispatch(rule, tasks).await?;
            }
            CoreCommand::NotifyReload { rule } => match &self.bridge {
                Some(bridge) => {
                    let clients = bridge.notify_reload();
                    debug!(rule = %rule, clients, "reload signal sent");
                }
                None => debug!(rule = %rule, "no reload bridge attached; skipping reload"),
            },
        }
        Ok(())
    }
}
