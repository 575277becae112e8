use std::sync::Arc;

use log::debug;

use super::project_draft::ProjectDraft;
use super::project_mutations::SubmitProjectEdit;
use super::projects_model::{Project, ProjectStage};
use super::projects_traits::{ProjectRepositoryTrait, ProjectServiceTrait};
use crate::errors::{Error, Result};
use crate::mutation::MutationCoordinator;
use crate::search::{SearchIndexTrait, SearchIndexes, SearchPage, SearchRequest};
use crate::state::{Action, RecordKey, Store};

/// Service for browsing and editing project catalogs.
pub struct ProjectService {
    repository: Arc<dyn ProjectRepositoryTrait>,
    search_index: Arc<dyn SearchIndexTrait>,
    indexes: SearchIndexes,
    coordinator: Arc<MutationCoordinator>,
}

impl ProjectService {
    pub fn new(
        repository: Arc<dyn ProjectRepositoryTrait>,
        search_index: Arc<dyn SearchIndexTrait>,
        indexes: SearchIndexes,
        coordinator: Arc<MutationCoordinator>,
    ) -> Self {
        Self {
            repository,
            search_index,
            indexes,
            coordinator,
        }
    }

    fn store(&self) -> &Store {
        self.coordinator.store()
    }

    fn index_for(&self, stage: ProjectStage) -> &str {
        match stage {
            ProjectStage::PreLaunch => &self.indexes.pre_launch_projects,
            ProjectStage::PostRera => &self.indexes.post_rera_projects,
        }
    }
}

#[async_trait::async_trait]
impl ProjectServiceTrait for ProjectService {
    async fn get_project(&self, stage: ProjectStage, project_id: &str) -> Result<Project> {
        self.store()
            .track_fetch(
                RecordKey::Project(stage, project_id.to_string()),
                self.repository.get_by_id(stage, project_id),
                |project| Action::ProjectsLoaded(vec![project.clone()]),
            )
            .await
    }

    fn cached_project(&self, stage: ProjectStage, project_id: &str) -> Option<Project> {
        self.store().project(stage, project_id)
    }

    async fn list_projects(
        &self,
        stage: ProjectStage,
        micromarket: Option<&str>,
    ) -> Result<Vec<Project>> {
        let micromarket = micromarket.map(str::trim).filter(|m| !m.is_empty());
        let mut projects = self.repository.list(stage, micromarket).await?;
        // Records from older imports may lack the stage field.
        for project in &mut projects {
            project.stage = stage;
        }
        self.store()
            .dispatch(Action::ProjectsLoaded(projects.clone()));
        Ok(projects)
    }

    async fn begin_edit(&self, stage: ProjectStage, project_id: &str) -> Result<ProjectDraft> {
        let project = match self.cached_project(stage, project_id) {
            Some(project) => project,
            None => self.get_project(stage, project_id).await?,
        };
        Ok(ProjectDraft::begin(project))
    }

    async fn submit_edit(&self, draft: ProjectDraft) -> Result<Project> {
        let stage = draft.original().stage;
        let project_id = draft.original().project_id.clone();
        let mutation = SubmitProjectEdit::new(self.repository.clone(), &draft)?;
        if mutation.is_empty() {
            debug!("No changes to {} project {}", stage, project_id);
            return Ok(draft.original().clone());
        }
        debug!(
            "Submitting {} project {} fields {:?}",
            stage,
            project_id,
            mutation.changed_fields()
        );

        if self.cached_project(stage, &project_id).is_none() {
            self.get_project(stage, &project_id).await?;
        }
        self.coordinator.execute(mutation).await?;
        self.cached_project(stage, &project_id)
            .ok_or_else(|| Error::NotFound(format!("{} project {}", stage, project_id)))
    }

    async fn search_projects(
        &self,
        stage: ProjectStage,
        request: SearchRequest,
    ) -> Result<SearchPage<Project>> {
        let response = self
            .search_index
            .search(self.index_for(stage), &request.normalized())
            .await?;
        let mut page = response.decode::<Project>("projectId");
        for project in &mut page.hits {
            project.stage = stage;
        }
        Ok(page)
    }
}
