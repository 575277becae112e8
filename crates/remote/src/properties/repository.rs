use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use log::debug;
use propdesk_core::constants::PROPERTIES_COLLECTION;
use propdesk_core::notes::{NewNote, Note};
use propdesk_core::properties::{
    price_per_sqft, PriceChange, PriceHistoryEntry, Property, PropertyRepositoryTrait,
    PropertyStatus,
};
use propdesk_core::utils::assigned_id;
use propdesk_core::Result;
use rust_decimal::Decimal;

use crate::document::DocumentStore;
use crate::utils::{stored_note, to_value, touched};

const ID_FIELD: &str = "propertyId";

/// Repository for inventory properties.
pub struct PropertyRepository {
    store: Arc<dyn DocumentStore>,
}

impl PropertyRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PropertyRepositoryTrait for PropertyRepository {
    async fn get_by_id(&self, property_id: &str) -> Result<Property> {
        self.store
            .get(PROPERTIES_COLLECTION, property_id)
            .await?
            .decode(ID_FIELD)
    }

    async fn list_by_ids(&self, property_ids: &[String]) -> Result<Vec<Property>> {
        let fetches = property_ids.iter().map(|id| self.get_by_id(id));
        let mut properties = Vec::with_capacity(property_ids.len());
        for result in join_all(fetches).await {
            match result {
                Ok(property) => properties.push(property),
                Err(e) if e.is_not_found() => debug!("Skipping unknown property: {}", e),
                Err(e) => return Err(e),
            }
        }
        Ok(properties)
    }

    async fn update_status(&self, property_id: &str, status: PropertyStatus) -> Result<Property> {
        self.store
            .merge(
                PROPERTIES_COLLECTION,
                property_id,
                touched("status", to_value(&status)?),
            )
            .await?
            .decode(ID_FIELD)
    }

    async fn record_price_change(
        &self,
        property_id: &str,
        change: &PriceChange,
        previous_price: Option<Decimal>,
    ) -> Result<PriceHistoryEntry> {
        let current = self.get_by_id(property_id).await?;

        let mut fields = touched("price", to_value(&change.new_price)?);
        fields.insert(
            "pricePerSqft".to_string(),
            to_value(&price_per_sqft(change.new_price, current.area_sqft))?,
        );
        let entry = PriceHistoryEntry {
            id: assigned_id(),
            price: change.new_price,
            previous_price,
            changed_at: Utc::now(),
            changed_by: change.changed_by.clone(),
        };
        // One write: the price never changes without its history entry.
        self.store
            .merge_and_append(
                PROPERTIES_COLLECTION,
                property_id,
                fields,
                "priceHistory",
                vec![to_value(&entry)?],
            )
            .await?;
        Ok(entry)
    }

    async fn append_note(&self, property_id: &str, note: &NewNote) -> Result<Note> {
        let stored = stored_note(note);
        self.store
            .append(
                PROPERTIES_COLLECTION,
                property_id,
                "notes",
                vec![to_value(&stored)?],
            )
            .await?;
        Ok(stored)
    }
}
