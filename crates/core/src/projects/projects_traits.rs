use async_trait::async_trait;
use serde_json::{Map, Value};

use super::project_draft::ProjectDraft;
use super::projects_model::{Project, ProjectStage};
use crate::errors::Result;
use crate::search::{SearchPage, SearchRequest};

/// Remote persistence of project catalogs.
#[async_trait]
pub trait ProjectRepositoryTrait: Send + Sync {
    async fn get_by_id(&self, stage: ProjectStage, project_id: &str) -> Result<Project>;

    /// Lists a catalog, optionally restricted to one micromarket.
    async fn list(&self, stage: ProjectStage, micromarket: Option<&str>) -> Result<Vec<Project>>;

    /// Writes only the given top-level fields and returns the stored record.
    async fn update_fields(
        &self,
        stage: ProjectStage,
        project_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<Project>;
}

/// Project operations exposed to the view layer.
#[async_trait]
pub trait ProjectServiceTrait: Send + Sync {
    async fn get_project(&self, stage: ProjectStage, project_id: &str) -> Result<Project>;

    fn cached_project(&self, stage: ProjectStage, project_id: &str) -> Option<Project>;

    async fn list_projects(
        &self,
        stage: ProjectStage,
        micromarket: Option<&str>,
    ) -> Result<Vec<Project>>;

    /// Enters edit mode on the current version of a project.
    async fn begin_edit(&self, stage: ProjectStage, project_id: &str) -> Result<ProjectDraft>;

    /// Saves the fields that differ between the draft and its original.
    ///
    /// A draft without changes is returned as-is without a remote write.
    async fn submit_edit(&self, draft: ProjectDraft) -> Result<Project>;

    async fn search_projects(
        &self,
        stage: ProjectStage,
        request: SearchRequest,
    ) -> Result<SearchPage<Project>>;
}
