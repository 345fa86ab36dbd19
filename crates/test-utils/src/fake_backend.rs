use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use sitedag::engine::{RunOutcome, RuntimeEvent};
use sitedag::errors::Result;
use sitedag::exec::RunBackend;

/// One recorded dispatch: the rule and the tasks it asked for.
pub type Dispatch = (String, Vec<String>);

/// A fake run backend that:
/// - records every dispatched run
/// - in auto mode, immediately reports `RunCompleted(Success)`; in manual
///   mode the test sends completions itself.
pub struct FakeBackend {
    runtime_tx: Option<mpsc::Sender<RuntimeEvent>>,
    dispatched: Arc<Mutex<Vec<Dispatch>>>,
}

impl FakeBackend {
    /// Completes every run as soon as it is dispatched.
    pub fn auto(runtime_tx: mpsc::Sender<RuntimeEvent>, dispatched: Arc<Mutex<Vec<Dispatch>>>) -> Self {
        Self {
            runtime_tx: Some(runtime_tx),
            dispatched,
        }
    }

    /// Only records; runs stay in flight until the test completes them.
    pub fn manual(dispatched: Arc<Mutex<Vec<Dispatch>>>) -> Self {
        Self {
            runtime_tx: None,
            dispatched,
        }
    }
}

impl RunBackend for FakeBackend {
    fn dispatch(
        &mut self,
        rule: String,
        tasks: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let dispatched = Arc::clone(&self.dispatched);

        Box::pin(async move {
            dispatched.lock().unwrap().push((rule.clone(), tasks));

            if let Some(tx) = tx {
                tx.send(RuntimeEvent::RunCompleted {
                    rule,
                    outcome: RunOutcome::Success,
                })
                .await
                .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
