//! Domain events runtime bridge for the web server.
//!
//! Receives domain events via DomainEventSink and republishes them on the
//! [`EventBus`](crate::events::EventBus) for SSE delivery. Rollback notices
//! become transient notifications on the dashboard.

mod sink;

pub use sink::WebDomainEventSink;
