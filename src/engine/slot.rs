// src/engine/slot.rs

use tracing::{debug, warn};

use super::WatchRule;

/// Per-rule watch state.
///
/// `Idle → Triggered → Running → Idle`. While `Running`, any number of new
/// triggers collapse into a single pending re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Nothing to do.
    Idle,
    /// A change arrived; the run starts as soon as no overlapping rule is
    /// running.
    Triggered,
    /// A run is in flight. `rerun_pending` records that more changes arrived
    /// meanwhile.
    Running { rerun_pending: bool },
}

/// Coalescing slot for one watch rule.
///
/// A slot remembers at most one future run, however many triggers arrive
/// while the current one is in flight.
#[derive(Debug, Clone)]
pub struct RuleSlot {
    rule: WatchRule,
    state: WatchState,
    runs_started: u64,
}

impl RuleSlot {
    pub fn new(rule: WatchRule) -> Self {
        Self {
            rule,
            state: WatchState::Idle,
            runs_started: 0,
        }
    }

    pub fn rule(&self) -> &WatchRule {
        &self.rule
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Number of runs started since the slot was created.
    pub fn runs_started(&self) -> u64 {
        self.runs_started
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, WatchState::Running { .. })
    }

    /// Record a trigger.
    ///
    /// Returns `true` if the slot just became `Triggered` and the caller
    /// should try to start it.
    pub fn trigger(&mut self) -> bool {
        match self.state {
            WatchState::Idle => {
                self.state = WatchState::Triggered;
                debug!(rule = %self.rule.name, "rule triggered");
                true
            }
            WatchState::Triggered => {
                debug!(rule = %self.rule.name, "rule already waiting to start; ignoring trigger");
                false
            }
            WatchState::Running { rerun_pending } => {
                if !rerun_pending {
                    debug!(rule = %self.rule.name, "rule running; scheduling one re-run");
                } else {
                    debug!(rule = %self.rule.name, "re-run already pending; coalescing trigger");
                }
                self.state = WatchState::Running {
                    rerun_pending: true,
                };
                false
            }
        }
    }

    /// Move a `Triggered` slot to `Running`.
    pub fn start(&mut self) {
        if self.state != WatchState::Triggered {
            warn!(rule = %self.rule.name, state = ?self.state, "start requested from unexpected state");
        }
        self.state = WatchState::Running {
            rerun_pending: false,
        };
        self.runs_started += 1;
    }

    /// Mark the in-flight run as finished.
    ///
    /// Returns `true` if a re-run was pending, in which case the slot is
    /// `Triggered` again; otherwise it is back to `Idle`.
    pub fn finish(&mut self) -> bool {
        match self.state {
            WatchState::Running { rerun_pending: true } => {
                self.state = WatchState::Triggered;
                true
            }
            WatchState::Running {
                rerun_pending: false,
            } => {
                self.state = WatchState::Idle;
                false
            }
            other => {
                warn!(rule = %self.rule.name, state = ?other, "completion for a rule that is not running; ignoring");
                false
            }
        }
    }
}
