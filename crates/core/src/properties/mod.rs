//! Properties module - inventory models, optimistic mutations, services and traits.

mod properties_model;
mod properties_service;
mod properties_traits;
mod property_mutations;

#[cfg(test)]
mod properties_model_tests;
#[cfg(test)]
mod properties_service_tests;

pub use properties_model::{
    price_per_sqft, PriceChange, PriceHistoryEntry, Property, PropertyStatus, PropertySummary,
};
pub use properties_service::PropertyService;
pub use properties_traits::{PropertyRepositoryTrait, PropertyServiceTrait};
pub use property_mutations::{
    AddPropertyNote, ChangePropertyPrice, PriceChangeReceipt, SetPropertyStatus,
};
