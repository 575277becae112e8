use super::*;
use crate::errors::{Error, ValidationError};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn change(price: Decimal) -> PriceChange {
    PriceChange {
        new_price: price,
        changed_by: Some("asha".to_string()),
    }
}

#[test]
fn test_unchanged_price_is_rejected() {
    let err = change(dec!(85)).validate(Some(dec!(85))).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnchangedPrice(_))
    ));
}

#[test]
fn test_price_change_accepted_without_current_price() {
    assert!(change(dec!(85)).validate(None).is_ok());
    assert!(change(dec!(85)).validate(Some(dec!(80))).is_ok());
}

#[test]
fn test_non_positive_price_is_rejected() {
    assert!(change(dec!(0)).validate(Some(dec!(10))).is_err());
    assert!(change(dec!(-5)).validate(None).unwrap_err().is_validation());
}

#[test]
fn test_pending_entry_uses_temp_id() {
    let entry = change(dec!(90)).to_pending_entry(Some(dec!(85)), Utc::now());
    assert!(crate::utils::is_temp_id(&entry.id));
    assert_eq!(entry.price, dec!(90));
    assert_eq!(entry.previous_price, Some(dec!(85)));
    assert_eq!(entry.changed_by.as_deref(), Some("asha"));
}

#[test]
fn test_price_per_sqft_in_rupees() {
    assert_eq!(price_per_sqft(dec!(50), Some(dec!(1000))), Some(dec!(5000)));
    assert_eq!(price_per_sqft(dec!(1.5), Some(dec!(3))), Some(dec!(50000)));
    assert_eq!(price_per_sqft(dec!(50), None), None);
    assert_eq!(price_per_sqft(dec!(50), Some(dec!(0))), None);
}

#[test]
fn test_status_wire_names() {
    assert_eq!(
        serde_json::to_string(&PropertyStatus::DeListed).unwrap(),
        "\"De-listed\""
    );
    let status: PropertyStatus = serde_json::from_str("\"Hold\"").unwrap();
    assert_eq!(status, PropertyStatus::Hold);
    assert!(serde_json::from_str::<PropertyStatus>("\"Rented\"").is_err());
}

#[test]
fn test_property_decodes_sparse_document() {
    let property: Property = serde_json::from_value(serde_json::json!({
        "propertyId": "P-1",
        "name": "Sea View 2BHK",
        "price": 120.5
    }))
    .unwrap();
    assert_eq!(property.property_id, "P-1");
    assert_eq!(property.price, Some(dec!(120.5)));
    assert_eq!(property.status, PropertyStatus::Available);
    assert!(property.price_history.is_empty());
    assert!(property.micromarket.is_none());
}

#[test]
fn test_summary_falls_back_for_missing_values() {
    let property = Property {
        property_id: "P-2".to_string(),
        name: Some("Palm Court".to_string()),
        price: Some(dec!(75.50)),
        status: PropertyStatus::Sold,
        ..Default::default()
    };
    let summary = PropertySummary::from(&property);
    assert_eq!(summary.name, "Palm Court");
    assert_eq!(summary.micromarket, "N/A");
    assert_eq!(summary.configuration, "N/A");
    assert_eq!(summary.price, "75.5 L");
    assert_eq!(summary.status, "Sold");
}

#[test]
fn test_summary_keeps_empty_string() {
    let property = Property {
        property_id: "P-3".to_string(),
        asset_type: Some(String::new()),
        ..Default::default()
    };
    assert_eq!(PropertySummary::from(&property).asset_type, "");
}
