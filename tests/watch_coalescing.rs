use sitedag::engine::{
    CoreCommand, RunOutcome, RuntimeEvent, TriggerReason, WatchCore, WatchRule, WatchState,
};

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
        reason: TriggerReason::FileWatch,
    }
}

fn completed(name: &str, outcome: RunOutcome) -> RuntimeEvent {
    RuntimeEvent::RunCompleted {
        rule: name.to_string(),
        outcome,
    }
}

fn dispatch(name: &str, tasks: &[&str]) -> CoreCommand {
    CoreCommand::DispatchRun {
        rule: name.to_string(),
        tasks: tasks.iter().map(|t| t.to_string()).collect(),
    }
}

fn reload(name: &str) -> CoreCommand {
    CoreCommand::NotifyReload {
        rule: name.to_string(),
    }
}

#[test]
fn trigger_on_idle_rule_dispatches_immediately() {
    let mut core = WatchCore::new([rule("styles", &["css"], false)]);

    let step = core.step(trigger("styles"));

    assert!(step.keep_running);
    assert_eq!(step.commands, vec![dispatch("styles", &["css"])]);
    assert_eq!(
        core.state_of("styles"),
        Some(WatchState::Running {
            rerun_pending: false
        })
    );
}

#[test]
fn many_triggers_during_a_run_coalesce_into_one_rerun() {
    let mut core = WatchCore::new([rule("styles", &["css"], false)]);
    core.step(trigger("styles"));

    for _ in 0..10 {
        let step = core.step(trigger("styles"));
        assert!(step.commands.is_empty(), "no dispatch while running");
    }
    assert_eq!(
        core.state_of("styles"),
        Some(WatchState::Running {
            rerun_pending: true
        })
    );

    let step = core.step(completed("styles", RunOutcome::Success));
    assert_eq!(step.commands, vec![dispatch("styles", &["css"])]);

    let step = core.step(completed("styles", RunOutcome::Success));
    assert!(step.commands.is_empty());
    assert!(core.is_idle());
    assert_eq!(core.runs_started("styles"), Some(2));
}

#[test]
fn completion_of_reloading_rule_notifies_before_rerun() {
    let mut core = WatchCore::new([rule("html", &["html"], true)]);
    core.step(trigger("html"));
    core.step(trigger("html"));

    let step = core.step(completed("html", RunOutcome::Success));

    assert_eq!(step.commands, vec![reload("html"), dispatch("html", &["html"])]);
}

#[test]
fn failed_run_still_reloads_and_returns_to_idle() {
    let mut core = WatchCore::new([rule("html", &["html"], true)]);
    core.step(trigger("html"));

    let step = core.step(completed("html", RunOutcome::Failed("boom".into())));

    assert!(step.keep_running);
    assert_eq!(step.commands, vec![reload("html")]);
    assert_eq!(core.state_of("html"), Some(WatchState::Idle));

    // The next change starts a fresh run.
    let step = core.step(trigger("html"));
    assert_eq!(step.commands, vec![dispatch("html", &["html"])]);
}

#[test]
fn rule_without_reload_never_notifies() {
    let mut core = WatchCore::new([rule("styles", &["css"], false)]);
    core.step(trigger("styles"));

    let step = core.step(completed("styles", RunOutcome::Success));

    assert!(step.commands.is_empty());
}

#[test]
fn independent_rules_run_concurrently() {
    let mut core = WatchCore::new([
        rule("html", &["html"], true),
        rule("styles", &["css"], false),
    ]);

    let a = core.step(trigger("html"));
    let b = core.step(trigger("styles"));

    assert_eq!(a.commands, vec![dispatch("html", &["html"])]);
    assert_eq!(b.commands, vec![dispatch("styles", &["css"])]);
}

#[test]
fn rules_sharing_a_task_never_overlap() {
    let mut core = WatchCore::new([
        rule("templates", &["html", "plans"], true),
        rule("plans", &["plans"], true),
    ]);

    core.step(trigger("templates"));
    let step = core.step(trigger("plans"));
    assert!(step.commands.is_empty(), "plans must wait for templates");
    assert_eq!(core.state_of("plans"), Some(WatchState::Triggered));

    let step = core.step(completed("templates", RunOutcome::Success));
    assert_eq!(
        step.commands,
        vec![reload("templates"), dispatch("plans", &["plans"])]
    );
}

#[test]
fn triggers_for_unknown_rules_are_ignored() {
    let mut core = WatchCore::new([rule("html", &["html"], true)]);

    let step = core.step(trigger("nope"));
    assert!(step.keep_running);
    assert!(step.commands.is_empty());

    let step = core.step(completed("nope", RunOutcome::Success));
    assert!(step.commands.is_empty());
    assert!(core.is_idle());
}

#[test]
fn stray_completion_does_not_reload() {
    let mut core = WatchCore::new([rule("html", &["html"], true)]);

    let step = core.step(completed("html", RunOutcome::Success));

    assert!(step.commands.is_empty());
    assert_eq!(core.runs_started("html"), Some(0));
}

#[test]
fn shutdown_stops_the_loop() {
    let mut core = WatchCore::new([rule("html", &["html"], true)]);
    core.step(trigger("html"));

    let step = core.step(RuntimeEvent::ShutdownRequested);

    assert!(!step.keep_running);
    assert!(step.commands.is_empty());
}
