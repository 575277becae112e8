//! Domain events module.
//!
//! Services emit a [`DomainEvent`] after each confirmed mutation, and the
//! mutation coordinator emits a rollback notice whenever a remote write fails.
//! The server forwards events to connected dashboards.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
