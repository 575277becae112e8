//! Requirement repository and service traits.

use async_trait::async_trait;

use super::requirements_model::{InternalStatus, NewRequirement, Requirement, RequirementStatus};
use crate::errors::Result;
use crate::notes::{NewNote, Note};
use crate::properties::Property;
use crate::search::{SearchPage, SearchRequest};

/// Remote persistence of buyer requirements.
#[async_trait]
pub trait RequirementRepositoryTrait: Send + Sync {
    async fn get_by_id(&self, requirement_id: &str) -> Result<Requirement>;

    /// Stores a new requirement and returns it with its assigned id.
    async fn create(&self, new_requirement: &NewRequirement) -> Result<Requirement>;

    async fn update_status(
        &self,
        requirement_id: &str,
        status: RequirementStatus,
    ) -> Result<Requirement>;

    async fn update_internal_status(
        &self,
        requirement_id: &str,
        status: InternalStatus,
    ) -> Result<Requirement>;

    async fn append_note(&self, requirement_id: &str, note: &NewNote) -> Result<Note>;

    /// Adds `property_id` to the matching properties unless already present.
    async fn add_matching_property(&self, requirement_id: &str, property_id: &str) -> Result<()>;

    async fn remove_matching_property(&self, requirement_id: &str, property_id: &str)
        -> Result<()>;
}

/// Requirement operations exposed to the view layer.
#[async_trait]
pub trait RequirementServiceTrait: Send + Sync {
    /// Creates a requirement from the form.
    ///
    /// An unknown builder name is added to the known names first; if that
    /// fails, nothing is created.
    async fn create_requirement(&self, new_requirement: NewRequirement) -> Result<Requirement>;

    async fn get_requirement(&self, requirement_id: &str) -> Result<Requirement>;

    fn cached_requirement(&self, requirement_id: &str) -> Option<Requirement>;

    async fn update_status(
        &self,
        requirement_id: &str,
        status: RequirementStatus,
    ) -> Result<Requirement>;

    async fn update_internal_status(
        &self,
        requirement_id: &str,
        status: InternalStatus,
    ) -> Result<Requirement>;

    async fn add_note(&self, requirement_id: &str, note: NewNote) -> Result<Requirement>;

    async fn add_matching_property(
        &self,
        requirement_id: &str,
        property_id: &str,
    ) -> Result<Requirement>;

    async fn remove_matching_property(
        &self,
        requirement_id: &str,
        property_id: &str,
    ) -> Result<Requirement>;

    /// Resolves the requirement's matching property ids to records.
    async fn matching_properties(&self, requirement_id: &str) -> Result<Vec<Property>>;

    async fn search_requirements(&self, request: SearchRequest)
        -> Result<SearchPage<Requirement>>;
}
