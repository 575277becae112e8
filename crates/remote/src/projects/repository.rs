use std::sync::Arc;

use async_trait::async_trait;
use propdesk_core::projects::{Project, ProjectRepositoryTrait, ProjectStage};
use propdesk_core::Result;
use serde_json::{Map, Value};

use crate::document::{Document, DocumentStore, FieldFilter, ListQuery};
use crate::utils::now_value;

const ID_FIELD: &str = "projectId";

/// Fields owned by the repository rather than the stored document.
const DERIVED_FIELDS: &[&str] = &["projectId", "stage"];

/// Repository for the pre-launch and post-RERA catalogs.
///
/// The stage selects the collection and is not stored on the document.
pub struct ProjectRepository {
    store: Arc<dyn DocumentStore>,
}

impl ProjectRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

fn decode(stage: ProjectStage, document: Document) -> Result<Project> {
    let mut project: Project = document.decode(ID_FIELD)?;
    project.stage = stage;
    Ok(project)
}

#[async_trait]
impl ProjectRepositoryTrait for ProjectRepository {
    async fn get_by_id(&self, stage: ProjectStage, project_id: &str) -> Result<Project> {
        let document = self.store.get(stage.collection(), project_id).await?;
        decode(stage, document)
    }

    async fn list(&self, stage: ProjectStage, micromarket: Option<&str>) -> Result<Vec<Project>> {
        let query = match micromarket.map(str::trim).filter(|m| !m.is_empty()) {
            Some(micromarket) => ListQuery::all().filter(FieldFilter::equals("micromarket", micromarket)),
            None => ListQuery::all(),
        };
        self.store
            .list(stage.collection(), &query)
            .await?
            .into_iter()
            .map(|document| decode(stage, document))
            .collect()
    }

    async fn update_fields(
        &self,
        stage: ProjectStage,
        project_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<Project> {
        let mut fields: Map<String, Value> = fields
            .iter()
            .filter(|(key, _)| !DERIVED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        fields.insert("updatedAt".to_string(), now_value());
        let document = self.store.merge(stage.collection(), project_id, fields).await?;
        decode(stage, document)
    }
}
