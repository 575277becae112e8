use async_trait::async_trait;

use super::UndoLog;
use crate::errors::Result;
use crate::events::DomainEvent;
use crate::state::{Store, StoreState};

/// A two-phase command executed by the
/// [`MutationCoordinator`](super::MutationCoordinator).
///
/// Implementations touch only the fields named by the mutation, both when
/// applying and when rolling back, so concurrent mutations on other fields of
/// the same record are preserved.
#[async_trait]
pub trait OptimisticMutation: Send + Sync {
    /// Value returned by the remote store on success.
    type Output: Send + Sync;

    /// Human-readable target, e.g. `"property P-12 status"`.
    fn label(&self) -> String;

    /// Checks the mutation against current local state. Runs before any
    /// local or remote change.
    fn validate(&self, _state: &StoreState) -> Result<()> {
        Ok(())
    }

    /// Applies the optimistic change to the store and records how to undo it.
    fn apply_local(&mut self, store: &Store) -> Result<()>;

    /// Writes the change to the remote store.
    async fn commit_remote(&self) -> Result<Self::Output>;

    /// Replaces temporary ids and derived values with the authoritative ones.
    fn confirm_local(&mut self, _store: &Store, _output: &Self::Output) {}

    /// The undo log filled by [`apply_local`](Self::apply_local).
    fn undo_log(&mut self) -> &mut UndoLog;

    /// Restores the fields this mutation touched. Idempotent.
    fn rollback_local(&mut self, store: &Store) {
        self.undo_log().replay(store);
    }

    /// Event emitted once the mutation is confirmed.
    fn confirmed_event(&self, _output: &Self::Output) -> Option<DomainEvent> {
        None
    }
}
