use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use propdesk_core::{
    builders::{BuilderService, BuilderServiceTrait},
    events::DomainEventSink,
    mutation::MutationCoordinator,
    projects::{ProjectService, ProjectServiceTrait},
    properties::{PropertyService, PropertyServiceTrait},
    requirements::{RequirementService, RequirementServiceTrait},
    search::SearchIndexTrait,
    state::Store,
    tasks::{TaskService, TaskServiceTrait},
};
use propdesk_remote::{
    AlgoliaClient, AlgoliaConfig, BuilderRepository, DocumentStore, FirestoreClient,
    FirestoreConfig, MemoryDocumentStore, MemorySearchIndex, ProjectRepository,
    PropertyRepository, RequirementRepository, TaskRepository,
};
use serde_json::Value;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    config::{Backend, Config},
    domain_events::WebDomainEventSink,
    events::EventBus,
};

pub struct AppState {
    pub store: Arc<Store>,
    pub coordinator: Arc<MutationCoordinator>,
    pub property_service: Arc<dyn PropertyServiceTrait>,
    pub requirement_service: Arc<dyn RequirementServiceTrait>,
    pub builder_service: Arc<dyn BuilderServiceTrait>,
    pub project_service: Arc<dyn ProjectServiceTrait>,
    pub task_service: Arc<dyn TaskServiceTrait>,
    pub event_bus: EventBus,
}

pub fn init_tracing() {
    let log_format = std::env::var("PD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Loads `{collection: {id: document}}` into the in-memory store.
fn seed_memory_store(memory: &MemoryDocumentStore, path: &Path) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let collections: HashMap<String, HashMap<String, Value>> =
        serde_json::from_str(&raw).context("Seed file is not a collection map")?;
    let mut count = 0;
    for (collection, documents) in collections {
        for (id, document) in documents {
            memory.seed(&collection, &id, document);
            count += 1;
        }
    }
    Ok(count)
}

fn remote_backends(
    config: &Config,
) -> anyhow::Result<(Arc<dyn DocumentStore>, Arc<dyn SearchIndexTrait>)> {
    match config.backend {
        Backend::Memory => {
            let memory = Arc::new(MemoryDocumentStore::new());
            if let Some(path) = &config.seed_file {
                let count = seed_memory_store(&memory, path)?;
                tracing::info!("Seeded {} documents from {}", count, path.display());
            }
            let index: Arc<dyn SearchIndexTrait> =
                Arc::new(MemorySearchIndex::new(memory.clone(), &config.indexes));
            let documents: Arc<dyn DocumentStore> = memory;
            Ok((documents, index))
        }
        Backend::Firestore => {
            let settings = config
                .firestore
                .as_ref()
                .context("Firestore settings missing")?;
            let mut firestore = FirestoreConfig::new(settings.project_id.clone());
            firestore.database = settings.database.clone();
            firestore.access_token = settings.access_token.clone();
            firestore.api_key = settings.api_key.clone();
            firestore.base_url = settings.base_url.clone();
            firestore.timeout = config.request_timeout;

            let algolia_settings = config.algolia.as_ref().context("Algolia settings missing")?;
            let mut algolia = AlgoliaConfig::new(
                algolia_settings.app_id.clone(),
                algolia_settings.api_key.clone(),
            );
            algolia.base_url = algolia_settings.base_url.clone();
            algolia.timeout = config.request_timeout;

            tracing::info!(
                "Using Firestore project {} ({})",
                settings.project_id,
                settings.database
            );
            let documents: Arc<dyn DocumentStore> = Arc::new(FirestoreClient::new(firestore)?);
            let index: Arc<dyn SearchIndexTrait> = Arc::new(AlgoliaClient::new(algolia)?);
            Ok((documents, index))
        }
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let (documents, search_index) = remote_backends(config)?;

    let event_bus = EventBus::new(256);
    let domain_event_sink: Arc<dyn DomainEventSink> =
        Arc::new(WebDomainEventSink::new(event_bus.clone()));

    let store = Arc::new(Store::new());
    let coordinator = Arc::new(
        MutationCoordinator::new(store.clone()).with_event_sink(domain_event_sink.clone()),
    );

    let property_service: Arc<dyn PropertyServiceTrait> = Arc::new(PropertyService::new(
        Arc::new(PropertyRepository::new(documents.clone())),
        search_index.clone(),
        config.indexes.clone(),
        coordinator.clone(),
    ));

    let builder_service: Arc<dyn BuilderServiceTrait> = Arc::new(BuilderService::new(
        Arc::new(BuilderRepository::new(documents.clone())),
        store.clone(),
        domain_event_sink.clone(),
    ));

    let requirement_service: Arc<dyn RequirementServiceTrait> =
        Arc::new(RequirementService::new(
            Arc::new(RequirementRepository::new(documents.clone())),
            builder_service.clone(),
            property_service.clone(),
            search_index.clone(),
            config.indexes.clone(),
            coordinator.clone(),
            domain_event_sink.clone(),
        ));

    let project_service: Arc<dyn ProjectServiceTrait> = Arc::new(ProjectService::new(
        Arc::new(ProjectRepository::new(documents.clone())),
        search_index.clone(),
        config.indexes.clone(),
        coordinator.clone(),
    ));

    let task_service: Arc<dyn TaskServiceTrait> = Arc::new(TaskService::new(
        Arc::new(TaskRepository::new(documents)),
        coordinator.clone(),
        domain_event_sink,
    ));

    Ok(Arc::new(AppState {
        store,
        coordinator,
        property_service,
        requirement_service,
        builder_service,
        project_service,
        task_service,
        event_bus,
    }))
}
