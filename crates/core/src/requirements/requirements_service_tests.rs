//! Unit tests for the requirement service.

use super::*;
use crate::builders::{BuilderRepositoryTrait, BuilderService};
use crate::errors::{Error, Result, StoreError};
use crate::events::{DomainEvent, RecordingEventSink};
use crate::mutation::MutationCoordinator;
use crate::notes::{NewNote, Note};
use crate::properties::{PriceChange, Property, PropertyServiceTrait, PropertyStatus};
use crate::search::{SearchIndexTrait, SearchIndexes, SearchPage, SearchRequest, SearchResponse};
use crate::state::Store;
use crate::utils::{assigned_id, is_temp_id};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type CallLog = Arc<Mutex<Vec<String>>>;

// ============================================================================
// Mock Implementations
// ============================================================================

struct MockRequirementRepository {
    records: Mutex<HashMap<String, Requirement>>,
    fail_writes: AtomicBool,
    calls: CallLog,
}

impl MockRequirementRepository {
    fn new(requirements: Vec<Requirement>, calls: CallLog) -> Self {
        Self {
            records: Mutex::new(
                requirements
                    .into_iter()
                    .map(|r| (r.requirement_id.clone(), r))
                    .collect(),
            ),
            fail_writes: AtomicBool::new(false),
            calls,
        }
    }

    fn write(&self, call: String) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                status: 503,
                message: "unavailable".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn update<R>(&self, id: &str, f: impl FnOnce(&mut Requirement) -> R) -> Result<R> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(id)
            .ok_or_else(|| Error::from(StoreError::NotFound(id.to_string())))?;
        Ok(f(record))
    }

    fn stored(&self, id: &str) -> Option<Requirement> {
        self.records.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl RequirementRepositoryTrait for MockRequirementRepository {
    async fn get_by_id(&self, requirement_id: &str) -> Result<Requirement> {
        self.stored(requirement_id)
            .ok_or_else(|| StoreError::NotFound(requirement_id.to_string()).into())
    }

    async fn create(&self, new_requirement: &NewRequirement) -> Result<Requirement> {
        self.write("create_requirement".to_string())?;
        let requirement = Requirement {
            requirement_id: "R-new".to_string(),
            client_name: Some(new_requirement.client_name.clone()),
            budget: new_requirement.budget.clone(),
            asset_type: Some(new_requirement.asset_type.clone()),
            micromarket: Some(new_requirement.micromarket.clone()),
            builder_name: new_requirement.builder().map(str::to_string),
            ..Default::default()
        };
        self.records
            .lock()
            .unwrap()
            .insert(requirement.requirement_id.clone(), requirement.clone());
        Ok(requirement)
    }

    async fn update_status(
        &self,
        requirement_id: &str,
        status: RequirementStatus,
    ) -> Result<Requirement> {
        self.write(format!("update_status {}", requirement_id))?;
        self.update(requirement_id, |r| {
            r.requirement_status = status;
            r.clone()
        })
    }

    async fn update_internal_status(
        &self,
        requirement_id: &str,
        status: InternalStatus,
    ) -> Result<Requirement> {
        self.write(format!("update_internal_status {}", requirement_id))?;
        self.update(requirement_id, |r| {
            r.internal_status = status;
            r.clone()
        })
    }

    async fn append_note(&self, requirement_id: &str, note: &NewNote) -> Result<Note> {
        self.write(format!("append_note {}", requirement_id))?;
        let stored = Note {
            id: assigned_id(),
            text: note.text.clone(),
            author: note.author.clone(),
            created_at: Utc::now(),
        };
        self.update(requirement_id, |r| r.notes.push(stored.clone()))?;
        Ok(stored)
    }

    async fn add_matching_property(&self, requirement_id: &str, property_id: &str) -> Result<()> {
        self.write(format!("link {}", property_id))?;
        self.update(requirement_id, |r| {
            if !r.matching_properties.iter().any(|p| p == property_id) {
                r.matching_properties.push(property_id.to_string());
            }
        })
    }

    async fn remove_matching_property(
        &self,
        requirement_id: &str,
        property_id: &str,
    ) -> Result<()> {
        self.write(format!("unlink {}", property_id))?;
        self.update(requirement_id, |r| {
            r.matching_properties.retain(|p| p != property_id)
        })
    }
}

struct MockBuilderRepository {
    names: Mutex<Vec<String>>,
    fail_add: AtomicBool,
    calls: CallLog,
}

#[async_trait]
impl BuilderRepositoryTrait for MockBuilderRepository {
    async fn list_names(&self) -> Result<Vec<String>> {
        Ok(self.names.lock().unwrap().clone())
    }

    async fn add_name(&self, name: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("add_builder {}", name));
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(StoreError::PermissionDenied("builders".to_string()).into());
        }
        self.names.lock().unwrap().push(name.to_string());
        Ok(())
    }
}

struct MockPropertyService {
    properties: Vec<Property>,
}

#[async_trait]
impl PropertyServiceTrait for MockPropertyService {
    async fn get_property(&self, _property_id: &str) -> Result<Property> {
        unimplemented!()
    }

    fn cached_property(&self, _property_id: &str) -> Option<Property> {
        unimplemented!()
    }

    async fn get_properties(&self, property_ids: &[String]) -> Result<Vec<Property>> {
        Ok(property_ids
            .iter()
            .filter_map(|id| self.properties.iter().find(|p| &p.property_id == id))
            .cloned()
            .collect())
    }

    async fn update_status(&self, _id: &str, _status: PropertyStatus) -> Result<Property> {
        unimplemented!()
    }

    async fn change_price(&self, _id: &str, _change: PriceChange) -> Result<Property> {
        unimplemented!()
    }

    async fn add_note(&self, _id: &str, _note: NewNote) -> Result<Property> {
        unimplemented!()
    }

    async fn search_properties(&self, _request: SearchRequest) -> Result<SearchPage<Property>> {
        unimplemented!()
    }
}

struct EmptySearchIndex;

#[async_trait]
impl SearchIndexTrait for EmptySearchIndex {
    async fn search(&self, _index: &str, request: &SearchRequest) -> Result<SearchResponse> {
        Ok(SearchResponse {
            page: request.page,
            hits_per_page: request.hits_per_page,
            ..Default::default()
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn sample_requirement(id: &str) -> Requirement {
    Requirement {
        requirement_id: id.to_string(),
        client_name: Some("Kiran Shah".to_string()),
        matching_properties: vec!["P-1".to_string(), "P-2".to_string()],
        ..Default::default()
    }
}

fn form(builder: Option<&str>) -> NewRequirement {
    NewRequirement {
        client_name: "Nikhil Rao".to_string(),
        agent: None,
        budget: Budget {
            from: Some(dec!(50)),
            to: Some(dec!(75)),
            as_market_price: false,
        },
        asset_type: "Apartment".to_string(),
        micromarket: "Andheri East".to_string(),
        configuration: None,
        builder_name: builder.map(str::to_string),
    }
}

struct Fixture {
    repo: Arc<MockRequirementRepository>,
    builders: Arc<MockBuilderRepository>,
    calls: CallLog,
    store: Arc<Store>,
    events: RecordingEventSink,
    service: RequirementService,
}

fn fixture(requirements: Vec<Requirement>, known_builders: &[&str]) -> Fixture {
    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let repo = Arc::new(MockRequirementRepository::new(requirements, calls.clone()));
    let builders = Arc::new(MockBuilderRepository {
        names: Mutex::new(known_builders.iter().map(|s| s.to_string()).collect()),
        fail_add: AtomicBool::new(false),
        calls: calls.clone(),
    });
    let store = Arc::new(Store::new());
    let events = RecordingEventSink::new();
    let sink = Arc::new(events.clone());
    let coordinator =
        Arc::new(MutationCoordinator::new(store.clone()).with_event_sink(sink.clone()));
    let builder_service = Arc::new(BuilderService::new(
        builders.clone(),
        store.clone(),
        sink.clone(),
    ));
    let property_service = Arc::new(MockPropertyService {
        properties: vec![Property {
            property_id: "P-2".to_string(),
            ..Default::default()
        }],
    });
    let service = RequirementService::new(
        repo.clone(),
        builder_service,
        property_service,
        Arc::new(EmptySearchIndex),
        SearchIndexes::default(),
        coordinator,
        sink,
    );
    Fixture {
        repo,
        builders,
        calls,
        store,
        events,
        service,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_unknown_builder_is_added_before_requirement() {
    let f = fixture(vec![], &["Godrej Properties"]);

    let requirement = f
        .service
        .create_requirement(form(Some(" Oberoi Realty ")))
        .await
        .unwrap();

    assert_eq!(requirement.builder_name.as_deref(), Some("Oberoi Realty"));
    assert_eq!(
        *f.calls.lock().unwrap(),
        vec![
            "add_builder Oberoi Realty".to_string(),
            "create_requirement".to_string()
        ]
    );
    assert!(f
        .store
        .builder_names()
        .contains(&"Oberoi Realty".to_string()));
    assert_eq!(
        f.events.events(),
        vec![
            DomainEvent::BuilderAdded {
                name: "Oberoi Realty".to_string()
            },
            DomainEvent::RequirementCreated {
                requirement_id: "R-new".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_known_builder_is_not_added_again() {
    let f = fixture(vec![], &["Godrej Properties"]);

    f.service
        .create_requirement(form(Some("godrej properties")))
        .await
        .unwrap();

    assert_eq!(
        *f.calls.lock().unwrap(),
        vec!["create_requirement".to_string()]
    );
}

#[tokio::test]
async fn test_failed_builder_append_aborts_creation() {
    let f = fixture(vec![], &[]);
    f.builders.fail_add.store(true, Ordering::SeqCst);

    let err = f
        .service
        .create_requirement(form(Some("Hiranandani")))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Store(StoreError::PermissionDenied(_))));
    assert_eq!(
        *f.calls.lock().unwrap(),
        vec!["add_builder Hiranandani".to_string()]
    );
    assert!(f.repo.stored("R-new").is_none());
    assert!(f.store.requirement("R-new").is_none());
}

#[tokio::test]
async fn test_invalid_budget_creates_nothing() {
    let f = fixture(vec![], &[]);
    let mut input = form(Some("Hiranandani"));
    input.budget.from = Some(dec!(75));

    let err = f.service.create_requirement(input).await.unwrap_err();

    assert!(err.is_validation());
    assert!(f.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_requirement_without_builder_is_created() {
    let f = fixture(vec![], &[]);

    let requirement = f.service.create_requirement(form(None)).await.unwrap();

    assert_eq!(f.store.requirement("R-new"), Some(requirement));
    assert_eq!(
        *f.calls.lock().unwrap(),
        vec!["create_requirement".to_string()]
    );
}

#[tokio::test]
async fn test_status_change_confirms() {
    let f = fixture(vec![sample_requirement("R-1")], &[]);

    let requirement = f
        .service
        .update_status("R-1", RequirementStatus::Close)
        .await
        .unwrap();

    assert_eq!(requirement.requirement_status, RequirementStatus::Close);
    assert_eq!(
        f.repo.stored("R-1").unwrap().requirement_status,
        RequirementStatus::Close
    );
}

#[tokio::test]
async fn test_failed_internal_status_rolls_back_only_that_field() {
    let f = fixture(vec![sample_requirement("R-1")], &[]);
    f.service
        .update_status("R-1", RequirementStatus::Close)
        .await
        .unwrap();
    f.repo.fail_writes.store(true, Ordering::SeqCst);

    let result = f
        .service
        .update_internal_status("R-1", InternalStatus::Found)
        .await;

    assert!(result.is_err());
    let cached = f.service.cached_requirement("R-1").unwrap();
    assert_eq!(cached.internal_status, InternalStatus::Pending);
    assert_eq!(cached.requirement_status, RequirementStatus::Close);
    assert_eq!(f.events.rollbacks().len(), 1);
}

#[tokio::test]
async fn test_note_confirmed_with_stored_id() {
    let f = fixture(vec![sample_requirement("R-1")], &[]);

    let requirement = f
        .service
        .add_note(
            "R-1",
            NewNote {
                text: "Prefers high floors".to_string(),
                author: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(requirement.notes.len(), 1);
    assert!(!is_temp_id(&requirement.notes[0].id));
    assert_eq!(requirement.notes, f.repo.stored("R-1").unwrap().notes);
}

#[tokio::test]
async fn test_failed_unlink_restores_position() {
    let f = fixture(vec![sample_requirement("R-1")], &[]);
    f.service.get_requirement("R-1").await.unwrap();
    f.repo.fail_writes.store(true, Ordering::SeqCst);

    let result = f.service.remove_matching_property("R-1", "P-1").await;

    assert!(result.is_err());
    assert_eq!(
        f.service.cached_requirement("R-1").unwrap().matching_properties,
        vec!["P-1".to_string(), "P-2".to_string()]
    );
}

#[tokio::test]
async fn test_failed_link_removes_only_new_entry() {
    let f = fixture(vec![sample_requirement("R-1")], &[]);
    f.service.get_requirement("R-1").await.unwrap();
    f.repo.fail_writes.store(true, Ordering::SeqCst);

    let result = f.service.add_matching_property("R-1", "P-3").await;

    assert!(result.is_err());
    assert_eq!(
        f.service.cached_requirement("R-1").unwrap().matching_properties,
        vec!["P-1".to_string(), "P-2".to_string()]
    );
}

#[tokio::test]
async fn test_link_matches_fresh_fetch() {
    let f = fixture(vec![sample_requirement("R-1")], &[]);

    let linked = f
        .service
        .add_matching_property("R-1", "P-3")
        .await
        .unwrap();

    let fresh = f.service.get_requirement("R-1").await.unwrap();
    assert_eq!(linked.matching_properties, fresh.matching_properties);
}

#[tokio::test]
async fn test_link_requires_property_id() {
    let f = fixture(vec![sample_requirement("R-1")], &[]);

    let err = f
        .service
        .add_matching_property("R-1", "  ")
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(f.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_matching_properties_skip_unknown() {
    let f = fixture(vec![sample_requirement("R-1")], &[]);

    let properties = f.service.matching_properties("R-1").await.unwrap();

    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].property_id, "P-2");
}

#[tokio::test]
async fn test_missing_requirement_is_not_found() {
    let f = fixture(vec![], &[]);

    let err = f
        .service
        .update_status("R-404", RequirementStatus::Close)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_search_uses_requirement_index() {
    let f = fixture(vec![], &[]);

    let page = f
        .service
        .search_requirements(SearchRequest::query("powai"))
        .await
        .unwrap();

    assert!(page.hits.is_empty());
    assert_eq!(page.hits_per_page, 20);
}
