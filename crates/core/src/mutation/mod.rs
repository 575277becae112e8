//! Optimistic mutations.
//!
//! A mutation is a two-phase command: it is applied to the local store at
//! once, then written to the remote store. The [`MutationCoordinator`]
//! confirms it when the write succeeds and rolls it back when it fails.

mod coordinator;
mod mutation_model;
mod mutation_traits;


pub use coordinator::MutationCoordinator;
pub use mutation_model::{MutationLifecycle, MutationPhase, UndoLog};
pub use mutation_traits::OptimisticMutation;
