use std::sync::Arc;

use log::debug;

use super::properties_model::{PriceChange, Property, PropertyStatus};
use super::properties_traits::{PropertyRepositoryTrait, PropertyServiceTrait};
use super::property_mutations::{AddPropertyNote, ChangePropertyPrice, SetPropertyStatus};
use crate::errors::{Error, Result};
use crate::mutation::MutationCoordinator;
use crate::notes::NewNote;
use crate::search::{SearchIndexTrait, SearchIndexes, SearchPage, SearchRequest};
use crate::state::{Action, RecordKey, Store};

/// Service for viewing and editing inventory properties.
pub struct PropertyService {
    repository: Arc<dyn PropertyRepositoryTrait>,
    search_index: Arc<dyn SearchIndexTrait>,
    indexes: SearchIndexes,
    coordinator: Arc<MutationCoordinator>,
}

impl PropertyService {
    pub fn new(
        repository: Arc<dyn PropertyRepositoryTrait>,
        search_index: Arc<dyn SearchIndexTrait>,
        indexes: SearchIndexes,
        coordinator: Arc<MutationCoordinator>,
    ) -> Self {
        Self {
            repository,
            search_index,
            indexes,
            coordinator,
        }
    }

    fn store(&self) -> &Store {
        self.coordinator.store()
    }

    /// Loads the property into the store unless it is already cached.
    async fn ensure_cached(&self, property_id: &str) -> Result<()> {
        if self.store().property(property_id).is_none() {
            self.get_property(property_id).await?;
        }
        Ok(())
    }

    fn cached_or_not_found(&self, property_id: &str) -> Result<Property> {
        self.store()
            .property(property_id)
            .ok_or_else(|| Error::NotFound(format!("Property {}", property_id)))
    }
}

#[async_trait::async_trait]
impl PropertyServiceTrait for PropertyService {
    async fn get_property(&self, property_id: &str) -> Result<Property> {
        self.store()
            .track_fetch(
                RecordKey::Property(property_id.to_string()),
                self.repository.get_by_id(property_id),
                |property| Action::PropertiesLoaded(vec![property.clone()]),
            )
            .await
    }

    fn cached_property(&self, property_id: &str) -> Option<Property> {
        self.store().property(property_id)
    }

    async fn get_properties(&self, property_ids: &[String]) -> Result<Vec<Property>> {
        let missing: Vec<String> = self.store().read(|state| {
            property_ids
                .iter()
                .filter(|id| !state.properties.contains_key(id.as_str()))
                .cloned()
                .collect()
        });
        if !missing.is_empty() {
            debug!("Fetching {} uncached properties", missing.len());
            let fetched = self.repository.list_by_ids(&missing).await?;
            self.store().dispatch(Action::PropertiesLoaded(fetched));
        }
        Ok(self.store().read(|state| {
            property_ids
                .iter()
                .filter_map(|id| state.properties.get(id).cloned())
                .collect()
        }))
    }

    async fn update_status(&self, property_id: &str, status: PropertyStatus) -> Result<Property> {
        self.ensure_cached(property_id).await?;
        let mutation = SetPropertyStatus::new(self.repository.clone(), property_id, status);
        self.coordinator.execute(mutation).await?;
        self.cached_or_not_found(property_id)
    }

    async fn change_price(&self, property_id: &str, change: PriceChange) -> Result<Property> {
        self.ensure_cached(property_id).await?;
        let mutation = ChangePropertyPrice::new(self.repository.clone(), property_id, change);
        self.coordinator.execute(mutation).await?;
        self.cached_or_not_found(property_id)
    }

    async fn add_note(&self, property_id: &str, note: NewNote) -> Result<Property> {
        self.ensure_cached(property_id).await?;
        let mutation = AddPropertyNote::new(self.repository.clone(), property_id, note);
        self.coordinator.execute(mutation).await?;
        self.cached_or_not_found(property_id)
    }

    async fn search_properties(&self, request: SearchRequest) -> Result<SearchPage<Property>> {
        let response = self
            .search_index
            .search(&self.indexes.properties, &request.normalized())
            .await?;
        Ok(response.decode("propertyId"))
    }
}
