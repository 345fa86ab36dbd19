use std::sync::{Arc, Mutex};
use std::time::Duration;

use sitedag::exec::{TaskWork, WorkFuture};

/// Shared, ordered log of work events (`"start:a"`, `"end:a"`).
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Names whose work started, in start order.
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("start:").map(str::to_string))
            .collect()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    /// Work that records its start and end and succeeds.
    pub fn work(&self, name: &str) -> RecordingWork {
        RecordingWork {
            name: name.to_string(),
            events: Arc::clone(&self.events),
            delay: Duration::ZERO,
            fail: false,
            panic: false,
        }
    }
}

/// Work unit for runner tests.
#[derive(Debug, Clone)]
pub struct RecordingWork {
    name: String,
    events: Arc<Mutex<Vec<String>>>,
    delay: Duration,
    fail: bool,
    panic: bool,
}

impl RecordingWork {
    /// Sleep for `ms` milliseconds between start and end.
    pub fn sleeping(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    /// Fail after the delay instead of succeeding.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Panic after the delay.
    pub fn panicking(mut self) -> Self {
        self.panic = true;
        self
    }
}

impl TaskWork for RecordingWork {
    fn run(&self) -> WorkFuture<'_> {
        Box::pin(async move {
            self.events.lock().unwrap().push(format!("start:{}", self.name));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.panic {
                panic!("{} panicked", self.name);
            }
            self.events.lock().unwrap().push(format!("end:{}", self.name));
            if self.fail {
                return Err(anyhow::anyhow!("{} failed", self.name).into());
            }
            Ok(())
        })
    }
}
