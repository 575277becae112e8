//! Unit tests for the property service and its optimistic mutations.

use super::*;
use crate::errors::{Error, Result, StoreError};
use crate::events::{DomainEvent, RecordingEventSink};
use crate::mutation::{MutationCoordinator, OptimisticMutation};
use crate::notes::{NewNote, Note};
use crate::search::{SearchIndexTrait, SearchIndexes, SearchRequest, SearchResponse};
use crate::state::{FetchStatus, RecordKey, Store};
use crate::utils::{assigned_id, is_temp_id};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock Implementations
// ============================================================================

#[derive(Default)]
struct MockPropertyRepository {
    records: Mutex<HashMap<String, Property>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    writes: AtomicUsize,
    price_gate: Option<Arc<Notify>>,
}

impl MockPropertyRepository {
    fn with(properties: Vec<Property>) -> Self {
        let repo = Self::default();
        {
            let mut records = repo.records.lock().unwrap();
            for p in properties {
                records.insert(p.property_id.clone(), p);
            }
        }
        repo
    }

    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.price_gate = Some(gate);
        self
    }

    fn stored(&self, id: &str) -> Property {
        self.records.lock().unwrap().get(id).cloned().unwrap()
    }

    fn write_attempt(&self) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Network("connection reset".to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl PropertyRepositoryTrait for MockPropertyRepository {
    async fn get_by_id(&self, property_id: &str) -> Result<Property> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Network("timeout".to_string()).into());
        }
        self.records
            .lock()
            .unwrap()
            .get(property_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("properties/{}", property_id)).into())
    }

    async fn list_by_ids(&self, property_ids: &[String]) -> Result<Vec<Property>> {
        let records = self.records.lock().unwrap();
        Ok(property_ids
            .iter()
            .filter_map(|id| records.get(id).cloned())
            .collect())
    }

    async fn update_status(&self, property_id: &str, status: PropertyStatus) -> Result<Property> {
        self.write_attempt()?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(property_id)
            .ok_or_else(|| Error::NotFound(property_id.to_string()))?;
        record.status = status;
        Ok(record.clone())
    }

    async fn record_price_change(
        &self,
        property_id: &str,
        change: &PriceChange,
        previous_price: Option<Decimal>,
    ) -> Result<PriceHistoryEntry> {
        if let Some(gate) = &self.price_gate {
            gate.notified().await;
        }
        self.write_attempt()?;
        let entry = PriceHistoryEntry {
            id: assigned_id(),
            price: change.new_price,
            previous_price,
            changed_at: Utc::now(),
            changed_by: change.changed_by.clone(),
        };
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(property_id)
            .ok_or_else(|| Error::NotFound(property_id.to_string()))?;
        record.price = Some(change.new_price);
        record.price_per_sqft = price_per_sqft(change.new_price, record.area_sqft);
        record.price_history.push(entry.clone());
        Ok(entry)
    }

    async fn append_note(&self, property_id: &str, note: &NewNote) -> Result<Note> {
        self.write_attempt()?;
        let stored = Note {
            id: assigned_id(),
            text: note.text.clone(),
            author: note.author.clone(),
            created_at: Utc::now(),
        };
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(property_id)
            .ok_or_else(|| Error::NotFound(property_id.to_string()))?;
        record.notes.push(stored.clone());
        Ok(stored)
    }
}

struct MockSearchIndex {
    hits: Vec<serde_json::Value>,
    seen: Mutex<Vec<(String, SearchRequest)>>,
}

#[async_trait]
impl SearchIndexTrait for MockSearchIndex {
    async fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse> {
        self.seen
            .lock()
            .unwrap()
            .push((index.to_string(), request.clone()));
        Ok(SearchResponse {
            hits: self.hits.clone(),
            page: request.page,
            nb_pages: 1,
            hits_per_page: request.hits_per_page,
            nb_hits: self.hits.len(),
            facets: Default::default(),
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn sample_property(id: &str) -> Property {
    Property {
        property_id: id.to_string(),
        name: Some("Sea Breeze 3BHK".to_string()),
        micromarket: Some("Bandra West".to_string()),
        area_sqft: Some(dec!(1000)),
        price: Some(dec!(50)),
        price_per_sqft: Some(dec!(5000)),
        status: PropertyStatus::Available,
        ..Default::default()
    }
}

struct Fixture {
    repo: Arc<MockPropertyRepository>,
    index: Arc<MockSearchIndex>,
    store: Arc<Store>,
    events: RecordingEventSink,
    service: PropertyService,
}

fn fixture(repo: MockPropertyRepository) -> Fixture {
    let repo = Arc::new(repo);
    let index = Arc::new(MockSearchIndex {
        hits: vec![json!({ "objectID": "P-9", "name": "Indexed" })],
        seen: Mutex::new(Vec::new()),
    });
    let store = Arc::new(Store::new());
    let events = RecordingEventSink::new();
    let coordinator = Arc::new(
        MutationCoordinator::new(store.clone()).with_event_sink(Arc::new(events.clone())),
    );
    let service = PropertyService::new(
        repo.clone(),
        index.clone(),
        SearchIndexes::default(),
        coordinator,
    );
    Fixture {
        repo,
        index,
        store,
        events,
        service,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_get_property_caches_record() {
    let f = fixture(MockPropertyRepository::with(vec![sample_property("P-1")]));

    let property = f.service.get_property("P-1").await.unwrap();

    assert_eq!(property.property_id, "P-1");
    assert_eq!(f.service.cached_property("P-1"), Some(property));
    assert_eq!(
        f.store.fetch_status(&RecordKey::Property("P-1".to_string())),
        Some(FetchStatus::Loaded)
    );
}

#[tokio::test]
async fn test_failed_fetch_marks_error_state() {
    let repo = MockPropertyRepository::with(vec![sample_property("P-1")]);
    repo.fail_reads.store(true, Ordering::SeqCst);
    let f = fixture(repo);

    let err = f.service.get_property("P-1").await.unwrap_err();

    assert!(matches!(err, Error::Store(StoreError::Network(_))));
    assert!(f.service.cached_property("P-1").is_none());
    assert!(matches!(
        f.store.fetch_status(&RecordKey::Property("P-1".to_string())),
        Some(FetchStatus::Failed(_))
    ));
}

#[tokio::test]
async fn test_get_properties_skips_unknown_ids_and_keeps_order() {
    let f = fixture(MockPropertyRepository::with(vec![
        sample_property("P-1"),
        sample_property("P-2"),
    ]));
    f.service.get_property("P-2").await.unwrap();

    let ids = vec!["P-2".to_string(), "P-404".to_string(), "P-1".to_string()];
    let properties = f.service.get_properties(&ids).await.unwrap();

    let got: Vec<&str> = properties.iter().map(|p| p.property_id.as_str()).collect();
    assert_eq!(got, vec!["P-2", "P-1"]);
}

#[tokio::test]
async fn test_update_status_confirms() {
    let f = fixture(MockPropertyRepository::with(vec![sample_property("P-1")]));

    let property = f
        .service
        .update_status("P-1", PropertyStatus::Hold)
        .await
        .unwrap();

    assert_eq!(property.status, PropertyStatus::Hold);
    assert_eq!(f.repo.stored("P-1").status, PropertyStatus::Hold);
    assert_eq!(
        f.events.events(),
        vec![DomainEvent::property_changed("P-1", &["status"])]
    );
}

#[tokio::test]
async fn test_failed_status_write_rolls_back() {
    let f = fixture(MockPropertyRepository::with(vec![sample_property("P-1")]));
    f.service.get_property("P-1").await.unwrap();
    f.repo.fail_writes.store(true, Ordering::SeqCst);

    let err = f
        .service
        .update_status("P-1", PropertyStatus::Sold)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Store(StoreError::Network(_))));
    assert_eq!(
        f.service.cached_property("P-1").unwrap(),
        sample_property("P-1")
    );
    let rollbacks = f.events.rollbacks();
    assert_eq!(rollbacks.len(), 1);
    match &rollbacks[0] {
        DomainEvent::MutationRolledBack { target, message } => {
            assert_eq!(target, "property P-1 status");
            assert!(message.contains("Could not reach the server"));
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_unchanged_price_never_reaches_remote() {
    let f = fixture(MockPropertyRepository::with(vec![sample_property("P-1")]));

    let err = f
        .service
        .change_price(
            "P-1",
            PriceChange {
                new_price: dec!(50),
                changed_by: None,
            },
        )
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(f.repo.writes.load(Ordering::SeqCst), 0);
    assert_eq!(
        f.service.cached_property("P-1").unwrap(),
        sample_property("P-1")
    );
    assert!(f.events.is_empty());
}

#[tokio::test]
async fn test_price_equal_after_validation_is_rejected_at_apply() {
    let f = fixture(MockPropertyRepository::with(vec![sample_property("P-1")]));
    f.service.get_property("P-1").await.unwrap();

    let mut late = ChangePropertyPrice::new(
        f.repo.clone(),
        "P-1",
        PriceChange {
            new_price: dec!(55),
            changed_by: None,
        },
    );
    f.store.read(|state| late.validate(state)).unwrap();

    // Another writer lands the same price between validation and apply.
    f.service
        .change_price(
            "P-1",
            PriceChange {
                new_price: dec!(55),
                changed_by: None,
            },
        )
        .await
        .unwrap();
    let before = f.service.cached_property("P-1").unwrap();

    let err = late.apply_local(&f.store).unwrap_err();

    assert!(err.is_validation());
    assert!(late.temp_entry_id().is_none());
    assert_eq!(f.service.cached_property("P-1").unwrap(), before);
    assert_eq!(before.price_history.len(), 1);
}

#[tokio::test]
async fn test_price_change_swaps_temp_entry_for_stored_one() {
    let f = fixture(MockPropertyRepository::with(vec![sample_property("P-1")]));

    let property = f
        .service
        .change_price(
            "P-1",
            PriceChange {
                new_price: dec!(60),
                changed_by: Some("ravi".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(property.price, Some(dec!(60)));
    assert_eq!(property.price_per_sqft, Some(dec!(6000)));
    assert_eq!(property.price_history.len(), 1);
    let entry = &property.price_history[0];
    assert!(!is_temp_id(&entry.id));
    assert_eq!(entry.previous_price, Some(dec!(50)));
    assert_eq!(f.repo.stored("P-1").price_history[0].id, entry.id);
}

#[tokio::test]
async fn test_price_change_survives_failed_refetch() {
    let f = fixture(MockPropertyRepository::with(vec![sample_property("P-1")]));
    f.service.get_property("P-1").await.unwrap();
    f.repo.fail_reads.store(true, Ordering::SeqCst);

    let property = f
        .service
        .change_price(
            "P-1",
            PriceChange {
                new_price: dec!(70),
                changed_by: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(property.price, Some(dec!(70)));
    assert_eq!(property.price_history.len(), 1);
    assert!(!is_temp_id(&property.price_history[0].id));
    assert!(f.events.rollbacks().is_empty());
}

#[tokio::test]
async fn test_failed_price_write_restores_price_and_history() {
    let f = fixture(MockPropertyRepository::with(vec![sample_property("P-1")]));
    f.service.get_property("P-1").await.unwrap();
    f.repo.fail_writes.store(true, Ordering::SeqCst);

    let result = f
        .service
        .change_price(
            "P-1",
            PriceChange {
                new_price: dec!(65),
                changed_by: None,
            },
        )
        .await;

    assert!(result.is_err());
    let cached = f.service.cached_property("P-1").unwrap();
    assert_eq!(cached.price, Some(dec!(50)));
    assert_eq!(cached.price_per_sqft, Some(dec!(5000)));
    assert!(cached.price_history.is_empty());
}

#[tokio::test]
async fn test_failed_price_write_keeps_concurrent_status_change() {
    let gate = Arc::new(Notify::new());
    let repo = MockPropertyRepository::with(vec![sample_property("P-1")]).gated(gate.clone());
    let f = fixture(repo);
    f.service.get_property("P-1").await.unwrap();

    let price = f.service.change_price(
        "P-1",
        PriceChange {
            new_price: dec!(55),
            changed_by: None,
        },
    );
    let status = async {
        let cached = f.service.cached_property("P-1").unwrap();
        assert_eq!(cached.price, Some(dec!(55)));
        let result = f.service.update_status("P-1", PropertyStatus::Sold).await;
        f.repo.fail_writes.store(true, Ordering::SeqCst);
        gate.notify_one();
        result
    };
    let (price_result, status_result) = tokio::join!(price, status);

    assert!(price_result.is_err());
    assert!(status_result.is_ok());
    let cached = f.service.cached_property("P-1").unwrap();
    assert_eq!(cached.status, PropertyStatus::Sold);
    assert_eq!(cached.price, Some(dec!(50)));
    assert!(cached.price_history.is_empty());
}

#[tokio::test]
async fn test_failed_note_removes_temp_note() {
    let f = fixture(MockPropertyRepository::with(vec![sample_property("P-1")]));
    f.service.get_property("P-1").await.unwrap();
    f.repo.fail_writes.store(true, Ordering::SeqCst);

    let result = f
        .service
        .add_note(
            "P-1",
            NewNote {
                text: "Owner wants a quick close".to_string(),
                author: None,
            },
        )
        .await;

    assert!(result.is_err());
    assert!(f.service.cached_property("P-1").unwrap().notes.is_empty());
}

#[tokio::test]
async fn test_note_gets_stored_id() {
    let f = fixture(MockPropertyRepository::with(vec![sample_property("P-1")]));

    let property = f
        .service
        .add_note(
            "P-1",
            NewNote {
                text: "Visited on Saturday".to_string(),
                author: Some("meera".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(property.notes.len(), 1);
    assert!(!is_temp_id(&property.notes[0].id));
}

#[tokio::test]
async fn test_blank_note_is_rejected() {
    let f = fixture(MockPropertyRepository::with(vec![sample_property("P-1")]));

    let err = f
        .service
        .add_note(
            "P-1",
            NewNote {
                text: "   ".to_string(),
                author: None,
            },
        )
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(f.repo.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_uses_property_index_and_fills_id() {
    let f = fixture(MockPropertyRepository::default());

    let page = f
        .service
        .search_properties(SearchRequest::query("  sea view ").page(0, 0))
        .await
        .unwrap();

    assert_eq!(page.hits.len(), 1);
    assert_eq!(page.hits[0].property_id, "P-9");
    let seen = f.index.seen.lock().unwrap();
    assert_eq!(seen[0].0, "properties");
    assert_eq!(seen[0].1.query, "sea view");
    assert_eq!(seen[0].1.hits_per_page, 20);
}
