// tests/watch_events.rs

use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::{AccessKind, CreateKind, ModifyKind};
use notify::{Event, EventKind};
use sitedag::config::ConfigFile;
use sitedag::engine::{RuntimeEvent, TriggerReason};
use sitedag::watch::event_handler::{is_change, process_event, relative_str};
use sitedag::watch::{build_rule_profiles, matching_rules, spawn_watcher};
use sitedag_test_utils::builders::ConfigFileBuilder;
use sitedag_test_utils::{init_tracing, with_timeout};
use tempfile::tempdir;
use tokio::sync::mpsc;

type TestResult = Result<(), Box<dyn Error>>;

fn triggered(events: Vec<RuntimeEvent>) -> Vec<String> {
    events
        .into_iter()
        .map(|e| match e {
            RuntimeEvent::RuleTriggered {
                rule,
                reason: TriggerReason::FileWatch,
            } => rule,
            other => panic!("unexpected event {other:?}"),
        })
        .collect()
}

fn drain(rx: &mut mpsc::Receiver<RuntimeEvent>) -> Vec<RuntimeEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

#[test]
fn default_rules_route_sources_to_tasks() -> TestResult {
    let profiles = build_rule_profiles(&ConfigFile::default().watch)?;

    assert_eq!(matching_rules(&profiles, "src/html/index.html.j2"), vec!["html"]);
    assert_eq!(matching_rules(&profiles, "src/html/plan.html.j2"), vec!["plans"]);
    assert_eq!(matching_rules(&profiles, "src/plans/week-1.json"), vec!["plans"]);
    assert_eq!(
        matching_rules(&profiles, "src/styles/partials/_base.scss"),
        vec!["styles"]
    );
    assert!(matching_rules(&profiles, "dist/index.html").is_empty());
    assert!(matching_rules(&profiles, "README.md").is_empty());
    Ok(())
}

#[test]
fn only_changes_count() {
    assert!(is_change(&EventKind::Create(CreateKind::File)));
    assert!(is_change(&EventKind::Modify(ModifyKind::Any)));
    assert!(!is_change(&EventKind::Access(AccessKind::Any)));
}

#[test]
fn relative_paths_use_forward_slashes() {
    let root = Path::new("/project");
    assert_eq!(
        relative_str(root, Path::new("/project/src/plans/a.json")),
        Some("src/plans/a.json".to_string())
    );
}

#[tokio::test]
async fn one_trigger_per_rule_per_event() -> TestResult {
    init_tracing();
    let profiles = build_rule_profiles(&ConfigFile::default().watch)?;
    let (tx, mut rx) = mpsc::channel(16);
    let root = PathBuf::from("/project");

    let event = Event::new(EventKind::Modify(ModifyKind::Any))
        .add_path(root.join("src/plans/a.json"))
        .add_path(root.join("src/plans/b.json"))
        .add_path(root.join("src/styles/main.sass"));
    process_event(&root, event, &profiles, &tx).await;

    assert_eq!(triggered(drain(&mut rx)), vec!["plans", "styles"]);
    Ok(())
}

#[tokio::test]
async fn access_events_and_unwatched_paths_are_ignored() -> TestResult {
    init_tracing();
    let profiles = build_rule_profiles(&ConfigFile::default().watch)?;
    let (tx, mut rx) = mpsc::channel(16);
    let root = PathBuf::from("/project");

    let access = Event::new(EventKind::Access(AccessKind::Any))
        .add_path(root.join("src/plans/a.json"));
    process_event(&root, access, &profiles, &tx).await;

    let output = Event::new(EventKind::Create(CreateKind::File))
        .add_path(root.join("dist/plans/a.html"));
    process_event(&root, output, &profiles, &tx).await;

    assert!(drain(&mut rx).is_empty());
    Ok(())
}

#[tokio::test]
async fn watcher_reports_changes_on_disk() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    std::fs::create_dir_all(dir.path().join("src/plans"))?;

    let cfg = ConfigFileBuilder::new()
        .without_watch_rules()
        .with_watch_rule("plans", &["src/plans/*.json"], &["plans"])
        .build();
    let profiles = build_rule_profiles(&cfg.watch)?;
    let (tx, mut rx) = mpsc::channel(16);

    let _watcher = spawn_watcher(dir.path(), profiles, tx)?;
    // Give the platform watcher a moment to register.
    tokio::time::sleep(Duration::from_millis(100)).await;
    std::fs::write(dir.path().join("src/plans/new.json"), "{}")?;

    let event = with_timeout(rx.recv()).await;
    assert!(
        matches!(event, Some(RuntimeEvent::RuleTriggered { ref rule, .. }) if rule == "plans"),
        "got {event:?}"
    );
    Ok(())
}
