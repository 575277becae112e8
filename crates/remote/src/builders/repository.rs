use std::sync::Arc;

use async_trait::async_trait;
use propdesk_core::builders::BuilderRepositoryTrait;
use propdesk_core::constants::BUILDERS_COLLECTION;
use propdesk_core::Result;
use serde_json::{Map, Value};

use crate::document::{DocumentStore, ListQuery};

/// Builder names, one `{name}` document each.
pub struct BuilderRepository {
    store: Arc<dyn DocumentStore>,
}

impl BuilderRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BuilderRepositoryTrait for BuilderRepository {
    async fn list_names(&self) -> Result<Vec<String>> {
        let documents = self
            .store
            .list(BUILDERS_COLLECTION, &ListQuery::all())
            .await?;
        Ok(documents
            .iter()
            .filter_map(|doc| doc.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    async fn add_name(&self, name: &str) -> Result<()> {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.to_string()));
        self.store.create(BUILDERS_COLLECTION, None, fields).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocumentStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_then_list() {
        let memory = Arc::new(MemoryDocumentStore::new());
        memory.seed(BUILDERS_COLLECTION, "b1", json!({"name": "Prestige"}));
        memory.seed(BUILDERS_COLLECTION, "b0", json!({"label": "no name"}));
        let repo = BuilderRepository::new(memory.clone());

        repo.add_name("Sobha").await.unwrap();
        let names = repo.list_names().await.unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Prestige".to_string()));
        assert!(names.contains(&"Sobha".to_string()));
    }

    #[tokio::test]
    async fn test_add_failure_propagates() {
        let memory = Arc::new(MemoryDocumentStore::new());
        memory.fail_writes_to(BUILDERS_COLLECTION, true);
        let repo = BuilderRepository::new(memory.clone());
        assert!(repo.add_name("Sobha").await.is_err());
        assert!(memory.documents(BUILDERS_COLLECTION).is_empty());
    }
}
