// src/watch/event_handler.rs

//! Turning raw filesystem events into rule triggers.

use std::path::Path;

use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::patterns::{matching_rules, RuleWatchProfile};

/// Whether an event kind counts as a change (create, modify or remove).
pub fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}

/// Express `path` relative to `root` with forward slashes.
///
/// Falls back to comparing canonical paths, since some platforms report
/// events under a different absolute prefix for the same directory.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok()?;
    path_canon
        .strip_prefix(&root_canon)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

/// Handle one notify event: send a `RuleTriggered` for every rule whose
/// patterns match any of the event's paths. Each rule is triggered at most
/// once per event.
pub async fn process_event(
    root: &Path,
    event: Event,
    profiles: &[RuleWatchProfile],
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) {
    if !is_change(&event.kind) {
        return;
    }

    let mut triggered: Vec<&str> = Vec::new();

    for path in &event.paths {
        let Some(rel) = relative_str(root, path) else {
            warn!("could not relativize path {:?} against root {:?}", path, root);
            continue;
        };
        debug!(?path, rel = %rel, "normalized event path");

        for rule in matching_rules(profiles, &rel) {
            if !triggered.contains(&rule) {
                info!(rule = %rule, path = %rel, "file change matched watch rule");
                triggered.push(rule);
            }
        }
    }

    for rule in triggered {
        let event = RuntimeEvent::RuleTriggered {
            rule: rule.to_string(),
            reason: TriggerReason::FileWatch,
        };
        if runtime_tx.send(event).await.is_err() {
            debug!("runtime channel closed; dropping trigger");
            return;
        }
    }
}
