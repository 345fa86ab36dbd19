// tests/watch_runtime.rs

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sitedag::dag::TaskRegistry;
use sitedag::engine::{RunOutcome, Runtime, RuntimeEvent, TriggerReason, WatchCore, WatchRule};
use sitedag::exec::{RunnerBackend, TaskRunner};
use sitedag::server::{ReloadBridge, ReloadMessage};
use sitedag_test_utils::fake_backend::{Dispatch, FakeBackend};
use sitedag_test_utils::recording::Recorder;
use sitedag_test_utils::{init_tracing, with_timeout};
use tokio::sync::mpsc;

type TestResult = Result<(), Box<dyn Error>>;

fn rule(name: &str, tasks: &[&str], reload: bool) -> WatchRule {
    WatchRule {
        name: name.to_string(),
        tasks: tasks.iter().map(|t| t.to_string()).collect(),
        reload,
    }
}

fn trigger(name: &str) -> RuntimeEvent {
    RuntimeEvent::RuleTriggered {
        rule: name.to_string(),
        reason: TriggerReason::Manual,
    }
}

/// Poll until `cond` holds; the surrounding `with_timeout` bounds the wait.
async fn wait_until(cond: impl Fn() -> bool) {
    while !cond() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn runtime_dispatches_and_reloads_with_fake_backend() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel(16);
    let dispatched: Arc<Mutex<Vec<Dispatch>>> = Arc::default();
    let backend = FakeBackend::auto(tx.clone(), Arc::clone(&dispatched));
    let bridge = ReloadBridge::new();
    let mut browser = bridge.subscribe();

    let core = WatchCore::new([rule("html", &["html"], true)]);
    let runtime = tokio::spawn(Runtime::new(core, rx, backend, Some(bridge)).run());

    tx.send(trigger("html")).await?;

    let message = with_timeout(browser.recv()).await?;
    assert_eq!(message, ReloadMessage::Reload);

    tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(runtime).await??;

    assert_eq!(
        dispatched.lock().unwrap().clone(),
        vec![("html".to_string(), vec!["html".to_string()])]
    );
    Ok(())
}

#[tokio::test]
async fn triggers_while_running_produce_exactly_one_rerun() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel(16);
    let dispatched: Arc<Mutex<Vec<Dispatch>>> = Arc::default();
    let backend = FakeBackend::manual(Arc::clone(&dispatched));

    let core = WatchCore::new([rule("styles", &["css"], false)]);
    let runtime = tokio::spawn(Runtime::new(core, rx, backend, None).run());

    tx.send(trigger("styles")).await?;
    for _ in 0..5 {
        tx.send(trigger("styles")).await?;
    }
    let count = || dispatched.lock().unwrap().len();
    with_timeout(wait_until(|| count() == 1)).await;

    tx.send(RuntimeEvent::RunCompleted {
        rule: "styles".into(),
        outcome: RunOutcome::Success,
    })
    .await?;
    with_timeout(wait_until(|| count() == 2)).await;

    tx.send(RuntimeEvent::RunCompleted {
        rule: "styles".into(),
        outcome: RunOutcome::Failed("compile error".into()),
    })
    .await?;
    tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(runtime).await??;

    assert_eq!(count(), 2);
    Ok(())
}

#[tokio::test]
async fn runner_backend_reruns_once_for_changes_during_a_slow_build() -> TestResult {
    init_tracing();
    let rec = Recorder::new();

    let mut registry = TaskRegistry::new();
    registry.define_work("css", rec.work("css").sleeping(100));
    let runner = TaskRunner::new(registry);

    let (tx, rx) = mpsc::channel(16);
    let backend = RunnerBackend::new(runner, tx.clone());
    let core = WatchCore::new([rule("styles", &["css"], false)]);
    let runtime = tokio::spawn(Runtime::new(core, rx, backend, None).run());

    tx.send(trigger("styles")).await?;
    with_timeout(wait_until(|| rec.started().len() == 1)).await;

    for _ in 0..3 {
        tx.send(trigger("styles")).await?;
    }

    with_timeout(wait_until(|| rec.events().len() == 4)).await;
    // Give a spurious third run the chance to show up.
    tokio::time::sleep(Duration::from_millis(150)).await;

    tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(runtime).await??;

    assert_eq!(rec.started(), vec!["css", "css"]);
    Ok(())
}

#[tokio::test]
async fn failing_task_does_not_stop_the_runtime() -> TestResult {
    init_tracing();
    let rec = Recorder::new();

    let mut registry = TaskRegistry::new();
    registry.define_work("html", rec.work("html").failing());
    let runner = TaskRunner::new(registry);

    let (tx, rx) = mpsc::channel(16);
    let backend = RunnerBackend::new(runner, tx.clone());
    let bridge = ReloadBridge::new();
    let mut browser = bridge.subscribe();
    let core = WatchCore::new([rule("html", &["html"], true)]);
    let runtime = tokio::spawn(Runtime::new(core, rx, backend, Some(bridge)).run());

    tx.send(trigger("html")).await?;
    assert_eq!(with_timeout(browser.recv()).await?, ReloadMessage::Reload);

    tx.send(trigger("html")).await?;
    assert_eq!(with_timeout(browser.recv()).await?, ReloadMessage::Reload);

    tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(runtime).await??;

    assert_eq!(rec.started(), vec!["html", "html"]);
    Ok(())
}

#[tokio::test]
async fn runtime_exits_when_every_sender_is_gone() -> TestResult {
    init_tracing();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(4);
    let dispatched: Arc<Mutex<Vec<Dispatch>>> = Arc::default();
    let backend = FakeBackend::manual(dispatched);
    let core = WatchCore::new([rule("html", &["html"], true)]);

    drop(tx);
    with_timeout(Runtime::new(core, rx, backend, None).run()).await?;
    Ok(())
}
