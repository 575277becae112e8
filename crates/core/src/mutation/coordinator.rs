use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use super::{MutationLifecycle, MutationPhase, OptimisticMutation};
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink, NoOpDomainEventSink};
use crate::state::Store;

/// Executes optimistic mutations against the shared [`Store`].
///
/// For every mutation: validate, apply locally, write remotely, then either
/// confirm or roll back. A failed write is never retried; the error is
/// returned to the caller and a rollback notice is emitted.
pub struct MutationCoordinator {
    store: Arc<Store>,
    event_sink: Arc<dyn DomainEventSink>,
    in_flight: AtomicUsize,
}

impl MutationCoordinator {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            event_sink: Arc::new(NoOpDomainEventSink),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn DomainEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Number of remote writes currently awaiting a response.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Runs `mutation` to completion and returns the remote store's response.
    pub async fn execute<M: OptimisticMutation>(&self, mutation: M) -> Result<M::Output> {
        self.execute_tracked(mutation).await.1
    }

    /// Like [`execute`](Self::execute), also returning the final lifecycle.
    pub async fn execute_tracked<M: OptimisticMutation>(
        &self,
        mut mutation: M,
    ) -> (MutationLifecycle, Result<M::Output>) {
        let mut lifecycle = MutationLifecycle::new(mutation.label());

        if let Err(e) = self.store.read(|state| mutation.validate(state)) {
            debug!("Rejected {}: {}", lifecycle.label(), e);
            return (lifecycle, Err(e));
        }

        if let Err(e) = mutation.apply_local(&self.store) {
            // Anything applied before the failure is reverted.
            mutation.rollback_local(&self.store);
            return (lifecycle, Err(e));
        }
        if let Err(e) = lifecycle.advance(MutationPhase::Pending) {
            mutation.rollback_local(&self.store);
            return (lifecycle, Err(e));
        }
        debug!("Applied {} locally", lifecycle.label());

        let result = {
            let _guard = InFlightGuard::enter(&self.in_flight);
            mutation.commit_remote().await
        };

        match result {
            Ok(output) => {
                mutation.confirm_local(&self.store, &output);
                mutation.undo_log().disarm();
                if let Err(e) = lifecycle.advance(MutationPhase::Confirmed) {
                    return (lifecycle, Err(e));
                }
                debug!("Confirmed {}", lifecycle.label());
                if let Some(event) = mutation.confirmed_event(&output) {
                    self.event_sink.emit(event);
                }
                (lifecycle, Ok(output))
            }
            Err(err) => {
                mutation.rollback_local(&self.store);
                if let Err(e) = lifecycle.advance(MutationPhase::RolledBack) {
                    return (lifecycle, Err(e));
                }
                warn!("Rolled back {}: {}", lifecycle.label(), err);
                self.event_sink.emit(DomainEvent::mutation_rolled_back(
                    lifecycle.label(),
                    err.user_message(),
                ));
                (lifecycle, Err(err))
            }
        }
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
