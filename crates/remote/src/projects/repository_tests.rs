#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use propdesk_core::constants::{POST_RERA_PROJECTS_COLLECTION, PRE_LAUNCH_PROJECTS_COLLECTION};
    use propdesk_core::projects::{ProjectRepositoryTrait, ProjectStage};
    use serde_json::{json, Map};

    use crate::document::MemoryDocumentStore;
    use crate::projects::ProjectRepository;

    fn setup() -> (Arc<MemoryDocumentStore>, ProjectRepository) {
        let memory = Arc::new(MemoryDocumentStore::new());
        memory.seed(
            POST_RERA_PROJECTS_COLLECTION,
            "PR-1",
            json!({"projectName": "Skyline", "micromarket": "Whitefield", "amenities": ["pool"]}),
        );
        memory.seed(
            POST_RERA_PROJECTS_COLLECTION,
            "PR-2",
            json!({"projectName": "Orchid", "micromarket": "Hebbal"}),
        );
        memory.seed(
            PRE_LAUNCH_PROJECTS_COLLECTION,
            "PL-1",
            json!({"projectName": "Horizon", "micromarket": "Whitefield"}),
        );
        let repo = ProjectRepository::new(memory.clone());
        (memory, repo)
    }

    #[tokio::test]
    async fn test_stage_selects_collection() {
        let (_, repo) = setup();
        let project = repo.get_by_id(ProjectStage::PostRera, "PR-1").await.unwrap();
        assert_eq!(project.stage, ProjectStage::PostRera);
        assert_eq!(project.project_name.as_deref(), Some("Skyline"));
        assert!(repo
            .get_by_id(ProjectStage::PreLaunch, "PR-1")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_list_filters_by_micromarket() {
        let (_, repo) = setup();
        let all = repo.list(ProjectStage::PostRera, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let whitefield = repo
            .list(ProjectStage::PostRera, Some("Whitefield"))
            .await
            .unwrap();
        assert_eq!(whitefield.len(), 1);
        assert_eq!(whitefield[0].project_id, "PR-1");

        let blank = repo.list(ProjectStage::PreLaunch, Some("  ")).await.unwrap();
        assert_eq!(blank.len(), 1);
    }

    #[tokio::test]
    async fn test_update_fields_writes_only_given_fields() {
        let (memory, repo) = setup();
        let mut fields = Map::new();
        fields.insert("amenities".to_string(), json!(["pool", "gym"]));
        fields.insert("stage".to_string(), json!("preLaunch"));

        let project = repo
            .update_fields(ProjectStage::PostRera, "PR-1", &fields)
            .await
            .unwrap();
        assert_eq!(project.amenities, vec!["pool", "gym"]);
        assert_eq!(project.stage, ProjectStage::PostRera);
        assert_eq!(project.project_name.as_deref(), Some("Skyline"));
        assert!(project.updated_at.is_some());

        let stored = memory.documents(POST_RERA_PROJECTS_COLLECTION);
        assert!(stored[0].get("stage").is_none());
    }
}
