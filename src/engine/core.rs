// src/engine/core.rs

//! Pure core of the watch coordinator.
//!
//! This module contains a synchronous, deterministic state machine that
//! consumes [`RuntimeEvent`]s and produces a list of commands describing what
//! the IO shell should do next. It owns no channels, no Tokio types, and
//! performs no IO, so coalescing behaviour can be tested step by step.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::engine::slot::{RuleSlot, WatchState};
use crate::engine::{RuleName, RunOutcome, RuntimeEvent, TriggerReason, WatchRule};
use crate::types::TaskName;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Run these tasks, in sequence, for the given rule.
    DispatchRun { rule: RuleName, tasks: Vec<TaskName> },
    /// Tell connected browsers to reload.
    NotifyReload { rule: RuleName },
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn keep(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Core watch coordinator state: one [`RuleSlot`] per watch rule.
///
/// Guarantees:
/// - a rule never has two runs in flight;
/// - triggers during a run collapse into exactly one follow-up run;
/// - two rules that share a task never run at the same time (the later one
///   stays `Triggered` until the overlap clears).
#[derive(Debug)]
pub struct WatchCore {
    slots: Vec<RuleSlot>,
}

impl WatchCore {
    pub fn new(rules: impl IntoIterator<Item = WatchRule>) -> Self {
        Self {
            slots: rules.into_iter().map(RuleSlot::new).collect(),
        }
    }

    pub fn state_of(&self, rule: &str) -> Option<WatchState> {
        self.slot(rule).map(RuleSlot::state)
    }

    pub fn runs_started(&self, rule: &str) -> Option<u64> {
        self.slot(rule).map(RuleSlot::runs_started)
    }

    /// True when no rule is triggered or running.
    pub fn is_idle(&self) -> bool {
        self.slots.iter().all(|s| s.state() == WatchState::Idle)
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::RuleTriggered { rule, reason } => self.handle_trigger(&rule, reason),
            RuntimeEvent::RunCompleted { rule, outcome } => self.handle_completion(&rule, outcome),
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    fn handle_trigger(&mut self, rule: &str, reason: TriggerReason) -> CoreStep {
        let Some(slot) = self.slot_mut(rule) else {
            warn!(rule = %rule, "trigger for unknown watch rule; ignoring");
            return CoreStep::keep(Vec::new());
        };

        debug!(rule = %rule, ?reason, "watch rule triggered");
        if slot.trigger() {
            CoreStep::keep(self.start_ready())
        } else {
            CoreStep::keep(Vec::new())
        }
    }

    fn handle_completion(&mut self, rule: &str, outcome: RunOutcome) -> CoreStep {
        let Some(slot) = self.slot_mut(rule) else {
            warn!(rule = %rule, "completion for unknown watch rule; ignoring");
            return CoreStep::keep(Vec::new());
        };

        match &outcome {
            RunOutcome::Success => info!(rule = %rule, "watch run completed"),
            RunOutcome::Failed(reason) => {
                warn!(rule = %rule, %reason, "watch run failed; waiting for further changes")
            }
        }

        let was_running = slot.is_running();
        let rerun = slot.finish();
        if rerun {
            debug!(rule = %rule, "starting coalesced re-run");
        }

        let mut commands = Vec::new();
        if was_running && slot.rule().reload {
            commands.push(CoreCommand::NotifyReload {
                rule: rule.to_string(),
            });
        }

        commands.extend(self.start_ready());
        CoreStep::keep(commands)
    }

    /// Start every `Triggered` slot whose tasks do not overlap a running slot.
    fn start_ready(&mut self) -> Vec<CoreCommand> {
        let mut commands = Vec::new();

        for i in 0..self.slots.len() {
            if self.slots[i].state() != WatchState::Triggered {
                continue;
            }

            let busy: HashSet<&str> = self
                .slots
                .iter()
                .filter(|s| s.is_running())
                .flat_map(|s| s.rule().tasks.iter().map(String::as_str))
                .collect();

            let blocked = self.slots[i]
                .rule()
                .tasks
                .iter()
                .any(|t| busy.contains(t.as_str()));

            if blocked {
                debug!(
                    rule = %self.slots[i].rule().name,
                    "rule shares a task with a running rule; waiting"
                );
                continue;
            }

            let slot = &mut self.slots[i];
            slot.start();
            commands.push(CoreCommand::DispatchRun {
                rule: slot.rule().name.clone(),
                tasks: slot.rule().tasks.clone(),
            });
        }

        commands
    }

    fn slot(&self, rule: &str) -> Option<&RuleSlot> {
        self.slots.iter().find(|s| s.rule().name == rule)
    }

    fn slot_mut(&mut self, rule: &str) -> Option<&mut RuleSlot> {
        self.slots.iter_mut().find(|s| s.rule().name == rule)
    }
}
