//! Property inventory domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::notes::Note;
use crate::state::HasId;
use crate::utils::{temp_id, DisplayFallback};

/// Listing status of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PropertyStatus {
    #[default]
    Available,
    Sold,
    Hold,
    #[serde(rename = "De-listed")]
    DeListed,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "Available",
            PropertyStatus::Sold => "Sold",
            PropertyStatus::Hold => "Hold",
            PropertyStatus::DeListed => "De-listed",
        }
    }
}

impl std::fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a property's append-only price history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryEntry {
    pub id: String,
    pub price: Decimal,
    #[serde(default)]
    pub previous_price: Option<Decimal>,
    pub changed_at: DateTime<Utc>,
    #[serde(default)]
    pub changed_by: Option<String>,
}

impl HasId for PriceHistoryEntry {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Domain model representing an inventory property.
///
/// Prices are expressed in lakhs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub property_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub micromarket: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub configuration: Option<String>,
    #[serde(default)]
    pub area_sqft: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub price_per_sqft: Option<Decimal>,
    #[serde(default)]
    pub status: PropertyStatus,
    #[serde(default)]
    pub price_history: Vec<PriceHistoryEntry>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl HasId for Property {
    fn id(&self) -> &str {
        &self.property_id
    }
}

/// Input model for changing a property's price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    pub new_price: Decimal,
    pub changed_by: Option<String>,
}

impl PriceChange {
    /// Validates the requested price against the property's current price.
    pub fn validate(&self, current_price: Option<Decimal>) -> Result<()> {
        if self.new_price <= Decimal::ZERO {
            return Err(ValidationError::invalid("Price must be greater than zero").into());
        }
        if current_price == Some(self.new_price) {
            return Err(ValidationError::UnchangedPrice(self.new_price.to_string()).into());
        }
        Ok(())
    }

    /// Builds the locally visible history entry shown while the write is in flight.
    pub fn to_pending_entry(&self, previous_price: Option<Decimal>, now: DateTime<Utc>) -> PriceHistoryEntry {
        PriceHistoryEntry {
            id: temp_id(),
            price: self.new_price,
            previous_price,
            changed_at: now,
            changed_by: self.changed_by.clone(),
        }
    }
}

/// Price-per-square-foot derived from a price in lakhs, when the area is known.
pub fn price_per_sqft(price_lakhs: Decimal, area_sqft: Option<Decimal>) -> Option<Decimal> {
    let area = area_sqft.filter(|a| *a > Decimal::ZERO)?;
    let rupees = price_lakhs.checked_mul(Decimal::from(crate::constants::LAKH))?;
    rupees.checked_div(area).map(|v| v.round_dp(2))
}

/// Table-row view of a property with display fallbacks applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub property_id: String,
    pub name: String,
    pub micromarket: String,
    pub asset_type: String,
    pub configuration: String,
    pub price: String,
    pub status: String,
}

impl From<&Property> for PropertySummary {
    fn from(property: &Property) -> Self {
        Self {
            property_id: property.property_id.clone(),
            name: property.name.display_or_fallback(),
            micromarket: property.micromarket.display_or_fallback(),
            asset_type: property.asset_type.display_or_fallback(),
            configuration: property.configuration.display_or_fallback(),
            price: property
                .price
                .map(|p| format!("{} L", p.normalize()))
                .display_or_fallback(),
            status: property.status.to_string(),
        }
    }
}
