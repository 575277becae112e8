use std::sync::Arc;

use log::{debug, info};

use super::builders_traits::{BuilderRepositoryTrait, BuilderServiceTrait};
use crate::errors::{Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::state::{Action, FetchStatus, RecordKey, Store};

/// Service for the known builder-name list.
pub struct BuilderService {
    repository: Arc<dyn BuilderRepositoryTrait>,
    store: Arc<Store>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl BuilderService {
    pub fn new(
        repository: Arc<dyn BuilderRepositoryTrait>,
        store: Arc<Store>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            store,
            event_sink,
        }
    }
}

#[async_trait::async_trait]
impl BuilderServiceTrait for BuilderService {
    async fn list_names(&self) -> Result<Vec<String>> {
        self.store
            .track_fetch(
                RecordKey::BuilderNames,
                self.repository.list_names(),
                |names| Action::BuilderNamesLoaded(names.clone()),
            )
            .await?;
        Ok(self.store.builder_names())
    }

    async fn ensure_known(&self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::missing("builderName").into());
        }
        if self.store.fetch_status(&RecordKey::BuilderNames) != Some(FetchStatus::Loaded) {
            self.list_names().await?;
        }
        if self.store.read(|state| state.is_known_builder(name)) {
            debug!("Builder '{}' already known", name);
            return Ok(false);
        }

        self.repository.add_name(name).await?;
        self.store.dispatch(Action::BuilderNameAdded(name.to_string()));
        info!("Added builder '{}' to known names", name);
        self.event_sink.emit(DomainEvent::BuilderAdded {
            name: name.to_string(),
        });
        Ok(true)
    }
}
