use std::sync::Arc;

use log::{debug, info};

use super::requirement_mutations::{
    AddRequirementNote, ChangeMatchingProperty, RequirementStatusUpdate, SetRequirementStatus,
};
use super::requirements_model::{InternalStatus, NewRequirement, Requirement, RequirementStatus};
use super::requirements_traits::{RequirementRepositoryTrait, RequirementServiceTrait};
use crate::builders::BuilderServiceTrait;
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::mutation::MutationCoordinator;
use crate::notes::NewNote;
use crate::properties::{Property, PropertyServiceTrait};
use crate::search::{SearchIndexTrait, SearchIndexes, SearchPage, SearchRequest};
use crate::state::{Action, RecordKey, Store};

/// Service for creating, viewing and editing buyer requirements.
pub struct RequirementService {
    repository: Arc<dyn RequirementRepositoryTrait>,
    builder_service: Arc<dyn BuilderServiceTrait>,
    property_service: Arc<dyn PropertyServiceTrait>,
    search_index: Arc<dyn SearchIndexTrait>,
    indexes: SearchIndexes,
    coordinator: Arc<MutationCoordinator>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl RequirementService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repository: Arc<dyn RequirementRepositoryTrait>,
        builder_service: Arc<dyn BuilderServiceTrait>,
        property_service: Arc<dyn PropertyServiceTrait>,
        search_index: Arc<dyn SearchIndexTrait>,
        indexes: SearchIndexes,
        coordinator: Arc<MutationCoordinator>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            builder_service,
            property_service,
            search_index,
            indexes,
            coordinator,
            event_sink,
        }
    }

    fn store(&self) -> &Store {
        self.coordinator.store()
    }

    async fn ensure_cached(&self, requirement_id: &str) -> Result<()> {
        if self.store().requirement(requirement_id).is_none() {
            self.get_requirement(requirement_id).await?;
        }
        Ok(())
    }

    fn cached_or_not_found(&self, requirement_id: &str) -> Result<Requirement> {
        self.store()
            .requirement(requirement_id)
            .ok_or_else(|| Error::NotFound(format!("Requirement {}", requirement_id)))
    }

    async fn set_status(
        &self,
        requirement_id: &str,
        update: RequirementStatusUpdate,
    ) -> Result<Requirement> {
        self.ensure_cached(requirement_id).await?;
        let mutation = SetRequirementStatus::new(self.repository.clone(), requirement_id, update);
        self.coordinator.execute(mutation).await?;
        self.cached_or_not_found(requirement_id)
    }
}

#[async_trait::async_trait]
impl RequirementServiceTrait for RequirementService {
    async fn create_requirement(&self, new_requirement: NewRequirement) -> Result<Requirement> {
        new_requirement.validate()?;

        if let Some(builder) = new_requirement.builder() {
            // Aborts the creation when the name cannot be stored.
            self.builder_service.ensure_known(builder).await?;
        }

        let requirement = self.repository.create(&new_requirement).await?;
        self.store()
            .dispatch(Action::RequirementsLoaded(vec![requirement.clone()]));
        info!("Created requirement {}", requirement.requirement_id);
        self.event_sink.emit(DomainEvent::RequirementCreated {
            requirement_id: requirement.requirement_id.clone(),
        });
        Ok(requirement)
    }

    async fn get_requirement(&self, requirement_id: &str) -> Result<Requirement> {
        self.store()
            .track_fetch(
                RecordKey::Requirement(requirement_id.to_string()),
                self.repository.get_by_id(requirement_id),
                |requirement| Action::RequirementsLoaded(vec![requirement.clone()]),
            )
            .await
    }

    fn cached_requirement(&self, requirement_id: &str) -> Option<Requirement> {
        self.store().requirement(requirement_id)
    }

    async fn update_status(
        &self,
        requirement_id: &str,
        status: RequirementStatus,
    ) -> Result<Requirement> {
        self.set_status(requirement_id, RequirementStatusUpdate::Status(status))
            .await
    }

    async fn update_internal_status(
        &self,
        requirement_id: &str,
        status: InternalStatus,
    ) -> Result<Requirement> {
        self.set_status(requirement_id, RequirementStatusUpdate::Internal(status))
            .await
    }

    async fn add_note(&self, requirement_id: &str, note: NewNote) -> Result<Requirement> {
        self.ensure_cached(requirement_id).await?;
        let mutation = AddRequirementNote::new(self.repository.clone(), requirement_id, note);
        self.coordinator.execute(mutation).await?;
        self.cached_or_not_found(requirement_id)
    }

    async fn add_matching_property(
        &self,
        requirement_id: &str,
        property_id: &str,
    ) -> Result<Requirement> {
        self.ensure_cached(requirement_id).await?;
        let mutation =
            ChangeMatchingProperty::link(self.repository.clone(), requirement_id, property_id);
        self.coordinator.execute(mutation).await?;
        self.cached_or_not_found(requirement_id)
    }

    async fn remove_matching_property(
        &self,
        requirement_id: &str,
        property_id: &str,
    ) -> Result<Requirement> {
        self.ensure_cached(requirement_id).await?;
        let mutation =
            ChangeMatchingProperty::unlink(self.repository.clone(), requirement_id, property_id);
        self.coordinator.execute(mutation).await?;
        self.cached_or_not_found(requirement_id)
    }

    async fn matching_properties(&self, requirement_id: &str) -> Result<Vec<Property>> {
        self.ensure_cached(requirement_id).await?;
        let ids = self.cached_or_not_found(requirement_id)?.matching_properties;
        debug!(
            "Resolving {} matching properties for requirement {}",
            ids.len(),
            requirement_id
        );
        self.property_service.get_properties(&ids).await
    }

    async fn search_requirements(
        &self,
        request: SearchRequest,
    ) -> Result<SearchPage<Requirement>> {
        let response = self
            .search_index
            .search(&self.indexes.requirements, &request.normalized())
            .await?;
        Ok(response.decode("requirementId"))
    }
}
