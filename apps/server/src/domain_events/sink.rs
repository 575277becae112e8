use propdesk_core::events::{DomainEvent, DomainEventSink};

use crate::events::{EventBus, ServerEvent};

/// Domain event sink for the web server runtime.
pub struct WebDomainEventSink {
    event_bus: EventBus,
}

impl WebDomainEventSink {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }
}

impl DomainEventSink for WebDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        if let DomainEvent::MutationRolledBack { target, message } = &event {
            tracing::warn!("Rolled back {}: {}", target, message);
        } else {
            tracing::debug!("Domain event {}", event.name());
        }
        match serde_json::to_value(&event) {
            Ok(payload) => self
                .event_bus
                .publish(ServerEvent::with_payload(event.name(), payload)),
            Err(err) => tracing::error!("Failed to serialize {}: {}", event.name(), err),
        }
    }
}
