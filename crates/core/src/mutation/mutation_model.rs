//! Mutation lifecycle and undo bookkeeping.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::state::{Action, Store, StoreState};

/// Phase of a single optimistic mutation.
///
/// `Idle → Pending → Confirmed | RolledBack`. The last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationPhase {
    Idle,
    /// The optimistic value is visible locally; the remote write is in flight.
    Pending,
    /// Local state matches the remote store.
    Confirmed,
    /// Local state was restored to its pre-mutation snapshot.
    RolledBack,
}

impl MutationPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MutationPhase::Confirmed | MutationPhase::RolledBack)
    }

    pub fn can_transition_to(&self, next: MutationPhase) -> bool {
        matches!(
            (self, next),
            (MutationPhase::Idle, MutationPhase::Pending)
                | (MutationPhase::Pending, MutationPhase::Confirmed)
                | (MutationPhase::Pending, MutationPhase::RolledBack)
        )
    }
}

/// Tracks the phase of one mutation and rejects illegal transitions.
#[derive(Debug, Clone)]
pub struct MutationLifecycle {
    label: String,
    phase: MutationPhase,
}

impl MutationLifecycle {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            phase: MutationPhase::Idle,
        }
    }

    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn advance(&mut self, next: MutationPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(Error::InvalidTransition(format!(
                "{}: {:?} -> {:?}",
                self.label, self.phase, next
            )));
        }
        self.phase = next;
        Ok(())
    }
}

type UndoGuard = Box<dyn Fn(&StoreState) -> bool + Send + Sync>;

struct UndoStep {
    guard: Option<UndoGuard>,
    actions: Vec<Action>,
}

/// Actions that revert an optimistic change.
///
/// Replaying consumes the log, so a rollback can run at most once no matter
/// how often it is requested. A guarded step is skipped when its guard no
/// longer holds, e.g. when a later mutation has overwritten the same field.
#[derive(Default)]
pub struct UndoLog {
    steps: Option<Vec<UndoStep>>,
}

impl std::fmt::Debug for UndoLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoLog")
            .field("steps", &self.steps.as_ref().map_or(0, Vec::len))
            .finish()
    }
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records actions that always run on rollback.
    pub fn record(&mut self, actions: Vec<Action>) {
        self.push(UndoStep {
            guard: None,
            actions,
        });
    }

    /// Records actions that run on rollback only while `guard` holds.
    pub fn record_guarded(
        &mut self,
        guard: impl Fn(&StoreState) -> bool + Send + Sync + 'static,
        actions: Vec<Action>,
    ) {
        self.push(UndoStep {
            guard: Some(Box::new(guard)),
            actions,
        });
    }

    pub fn is_armed(&self) -> bool {
        self.steps.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Dispatches the recorded actions once. Later calls do nothing.
    ///
    /// Returns the number of steps applied.
    pub fn replay(&mut self, store: &Store) -> usize {
        let Some(steps) = self.steps.take() else {
            return 0;
        };
        store.transact(|state| {
            let mut applied = 0;
            let mut actions = Vec::new();
            for step in steps {
                if step.guard.as_ref().map_or(true, |guard| guard(state)) {
                    applied += 1;
                    actions.extend(step.actions);
                }
            }
            (actions, applied)
        })
    }

    /// Drops the recorded actions without applying them.
    pub fn disarm(&mut self) {
        self.steps = None;
    }

    fn push(&mut self, step: UndoStep) {
        self.steps.get_or_insert_with(Vec::new).push(step);
    }
}
