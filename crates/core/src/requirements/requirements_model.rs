//! Buyer requirement domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::LAKH;
use crate::errors::{Result, ValidationError};
use crate::notes::Note;
use crate::state::HasId;

/// Whether the buyer is still looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequirementStatus {
    #[default]
    Open,
    Close,
}

/// Internal sourcing progress for a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InternalStatus {
    #[serde(rename = "found")]
    Found,
    #[serde(rename = "not found")]
    NotFound,
    #[default]
    #[serde(rename = "pending")]
    Pending,
}

/// Budget range in lakhs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default)]
    pub from: Option<Decimal>,
    #[serde(default)]
    pub to: Option<Decimal>,
    /// The buyer accepts the prevailing market price; the range is ignored.
    #[serde(default)]
    pub as_market_price: bool,
}

impl Budget {
    /// Validates the range. A market-price budget needs no bounds; otherwise
    /// both bounds are required and `from` must be strictly below `to` once
    /// converted to rupees.
    pub fn validate(&self) -> Result<()> {
        if self.as_market_price {
            return Ok(());
        }
        let from = self.from.ok_or_else(|| ValidationError::missing("budget.from"))?;
        let to = self.to.ok_or_else(|| ValidationError::missing("budget.to"))?;
        let lakh = Decimal::from(LAKH);
        let (from_rupees, to_rupees) = match (from.checked_mul(lakh), to.checked_mul(lakh)) {
            (Some(f), Some(t)) => (f, t),
            _ => return Err(ValidationError::invalid("Budget is out of range").into()),
        };
        if from_rupees >= to_rupees {
            return Err(ValidationError::BudgetRange {
                from: from.to_string(),
                to: to.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Domain model representing a buyer requirement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub requirement_id: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub budget: Budget,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub micromarket: Option<String>,
    #[serde(default)]
    pub configuration: Option<String>,
    #[serde(default)]
    pub builder_name: Option<String>,
    #[serde(default)]
    pub requirement_status: RequirementStatus,
    #[serde(default)]
    pub internal_status: InternalStatus,
    #[serde(default)]
    pub matching_properties: Vec<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl HasId for Requirement {
    fn id(&self) -> &str {
        &self.requirement_id
    }
}

/// Input model for creating a requirement from the form.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewRequirement {
    pub client_name: String,
    pub agent: Option<String>,
    pub budget: Budget,
    pub asset_type: String,
    pub micromarket: String,
    pub configuration: Option<String>,
    pub builder_name: Option<String>,
}

impl NewRequirement {
    /// Validates the form before anything is sent to the remote store.
    pub fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty() {
            return Err(ValidationError::missing("clientName").into());
        }
        if self.asset_type.trim().is_empty() {
            return Err(ValidationError::missing("assetType").into());
        }
        if self.micromarket.trim().is_empty() {
            return Err(ValidationError::missing("micromarket").into());
        }
        self.budget.validate()
    }

    /// The trimmed builder name, if one was entered.
    pub fn builder(&self) -> Option<&str> {
        self.builder_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
