//! Property repository and service traits.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::properties_model::{PriceChange, PriceHistoryEntry, Property, PropertyStatus};
use crate::errors::Result;
use crate::notes::{NewNote, Note};
use crate::search::{SearchPage, SearchRequest};

/// Remote persistence of inventory properties.
///
/// Properties are created outside this system and never deleted by it.
#[async_trait]
pub trait PropertyRepositoryTrait: Send + Sync {
    async fn get_by_id(&self, property_id: &str) -> Result<Property>;

    /// Fetches several properties; unknown ids are skipped.
    async fn list_by_ids(&self, property_ids: &[String]) -> Result<Vec<Property>>;

    /// Writes a new status and returns the stored record.
    async fn update_status(&self, property_id: &str, status: PropertyStatus) -> Result<Property>;

    /// Writes the new current price and appends a price-history entry.
    ///
    /// Returns the stored entry, carrying the id the store assigned.
    async fn record_price_change(
        &self,
        property_id: &str,
        change: &PriceChange,
        previous_price: Option<Decimal>,
    ) -> Result<PriceHistoryEntry>;

    /// Appends a note and returns it with its assigned id.
    async fn append_note(&self, property_id: &str, note: &NewNote) -> Result<Note>;
}

/// Property operations exposed to the view layer.
#[async_trait]
pub trait PropertyServiceTrait: Send + Sync {
    /// Fetches the authoritative record and refreshes the local cache.
    async fn get_property(&self, property_id: &str) -> Result<Property>;

    /// The locally cached record, if any.
    fn cached_property(&self, property_id: &str) -> Option<Property>;

    /// Resolves several properties, using the cache where possible.
    async fn get_properties(&self, property_ids: &[String]) -> Result<Vec<Property>>;

    async fn update_status(&self, property_id: &str, status: PropertyStatus) -> Result<Property>;

    async fn change_price(&self, property_id: &str, change: PriceChange) -> Result<Property>;

    async fn add_note(&self, property_id: &str, note: NewNote) -> Result<Property>;

    async fn search_properties(&self, request: SearchRequest) -> Result<SearchPage<Property>>;
}
