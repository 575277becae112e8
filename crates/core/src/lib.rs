//! Propdesk Core - records, application store and optimistic mutations.
//!
//! This crate holds the back-office logic for the property dashboard.
//! It is store-agnostic and defines traits that are implemented
//! by the `propdesk-remote` crate.

pub mod builders;
pub mod constants;
pub mod errors;
pub mod events;
pub mod mutation;
pub mod notes;
pub mod projects;
pub mod properties;
pub mod requirements;
pub mod search;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
