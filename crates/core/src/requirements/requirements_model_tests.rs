use super::*;
use crate::errors::{Error, ValidationError};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn budget(from: Option<Decimal>, to: Option<Decimal>) -> Budget {
    Budget {
        from,
        to,
        as_market_price: false,
    }
}

fn form() -> NewRequirement {
    NewRequirement {
        client_name: "Kiran Shah".to_string(),
        agent: Some("asha".to_string()),
        budget: budget(Some(dec!(80)), Some(dec!(120))),
        asset_type: "Apartment".to_string(),
        micromarket: "Powai".to_string(),
        configuration: Some("3BHK".to_string()),
        builder_name: None,
    }
}

#[test]
fn test_budget_rejects_equal_bounds() {
    let err = budget(Some(dec!(100)), Some(dec!(100))).validate().unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::BudgetRange { .. })
    ));
}

#[test]
fn test_budget_rejects_inverted_bounds() {
    assert!(budget(Some(dec!(150)), Some(dec!(100))).validate().is_err());
}

#[test]
fn test_budget_requires_both_bounds() {
    let err = budget(Some(dec!(10)), None).validate().unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingField(ref f)) if f == "budget.to"
    ));
    assert!(budget(None, Some(dec!(10))).validate().is_err());
}

#[test]
fn test_market_price_budget_skips_range() {
    let budget = Budget {
        from: Some(dec!(500)),
        to: Some(dec!(1)),
        as_market_price: true,
    };
    assert!(budget.validate().is_ok());
    assert!(Budget {
        as_market_price: true,
        ..Default::default()
    }
    .validate()
    .is_ok());
}

#[test]
fn test_budget_compares_fractional_lakhs() {
    assert!(budget(Some(dec!(99.99)), Some(dec!(100))).validate().is_ok());
    assert!(budget(Some(dec!(100.001)), Some(dec!(100))).validate().is_err());
}

#[test]
fn test_new_requirement_requires_client_name() {
    let mut input = form();
    input.client_name = "  ".to_string();
    let err = input.validate().unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingField(ref f)) if f == "clientName"
    ));
}

#[test]
fn test_new_requirement_checks_budget() {
    let mut input = form();
    input.budget = budget(Some(dec!(200)), Some(dec!(100)));
    assert!(input.validate().is_err());
    assert!(form().validate().is_ok());
}

#[test]
fn test_builder_name_is_trimmed() {
    let mut input = form();
    assert_eq!(input.builder(), None);
    input.builder_name = Some("   ".to_string());
    assert_eq!(input.builder(), None);
    input.builder_name = Some("  Lodha Group ".to_string());
    assert_eq!(input.builder(), Some("Lodha Group"));
}

#[test]
fn test_status_wire_names() {
    assert_eq!(
        serde_json::to_string(&InternalStatus::NotFound).unwrap(),
        "\"not found\""
    );
    assert_eq!(
        serde_json::to_string(&RequirementStatus::Close).unwrap(),
        "\"close\""
    );
    let requirement: Requirement = serde_json::from_value(serde_json::json!({
        "requirementId": "R-1",
        "internalStatus": "found"
    }))
    .unwrap();
    assert_eq!(requirement.internal_status, InternalStatus::Found);
    assert_eq!(requirement.requirement_status, RequirementStatus::Open);
    assert!(!requirement.budget.as_market_price);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_budget_accepts_iff_from_below_to(
        from in -1_000_000i64..1_000_000,
        to in -1_000_000i64..1_000_000,
        scale in 0u32..3,
    ) {
        let from = Decimal::new(from, scale);
        let to = Decimal::new(to, scale);
        let lakh = Decimal::from(100_000);
        let result = budget(Some(from), Some(to)).validate();
        prop_assert_eq!(result.is_ok(), from * lakh < to * lakh);
    }

    #[test]
    fn prop_market_price_always_accepted(from in any::<i32>(), to in any::<i32>()) {
        let budget = Budget {
            from: Some(Decimal::from(from)),
            to: Some(Decimal::from(to)),
            as_market_price: true,
        };
        prop_assert!(budget.validate().is_ok());
    }
}
