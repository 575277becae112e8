use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use propdesk_core::constants::REQUIREMENTS_COLLECTION;
use propdesk_core::notes::{NewNote, Note};
use propdesk_core::requirements::{
    InternalStatus, NewRequirement, Requirement, RequirementRepositoryTrait, RequirementStatus,
};
use propdesk_core::Result;
use serde_json::Value;

use crate::document::{encode_fields, DocumentStore};
use crate::utils::{stored_note, to_value, touched};

const ID_FIELD: &str = "requirementId";

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Repository for buyer requirements.
pub struct RequirementRepository {
    store: Arc<dyn DocumentStore>,
}

impl RequirementRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequirementRepositoryTrait for RequirementRepository {
    async fn get_by_id(&self, requirement_id: &str) -> Result<Requirement> {
        self.store
            .get(REQUIREMENTS_COLLECTION, requirement_id)
            .await?
            .decode(ID_FIELD)
    }

    async fn create(&self, new_requirement: &NewRequirement) -> Result<Requirement> {
        let now = Utc::now();
        let record = Requirement {
            requirement_id: String::new(),
            client_name: trimmed(&new_requirement.client_name),
            agent: new_requirement.agent.as_deref().and_then(trimmed),
            budget: new_requirement.budget.clone(),
            asset_type: trimmed(&new_requirement.asset_type),
            micromarket: trimmed(&new_requirement.micromarket),
            configuration: new_requirement.configuration.as_deref().and_then(trimmed),
            builder_name: new_requirement.builder().map(str::to_string),
            requirement_status: RequirementStatus::Open,
            internal_status: InternalStatus::Pending,
            matching_properties: Vec::new(),
            notes: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        let fields = encode_fields(&record, ID_FIELD)?;
        self.store
            .create(REQUIREMENTS_COLLECTION, None, fields)
            .await?
            .decode(ID_FIELD)
    }

    async fn update_status(
        &self,
        requirement_id: &str,
        status: RequirementStatus,
    ) -> Result<Requirement> {
        self.store
            .merge(
                REQUIREMENTS_COLLECTION,
                requirement_id,
                touched("requirementStatus", to_value(&status)?),
            )
            .await?
            .decode(ID_FIELD)
    }

    async fn update_internal_status(
        &self,
        requirement_id: &str,
        status: InternalStatus,
    ) -> Result<Requirement> {
        self.store
            .merge(
                REQUIREMENTS_COLLECTION,
                requirement_id,
                touched("internalStatus", to_value(&status)?),
            )
            .await?
            .decode(ID_FIELD)
    }

    async fn append_note(&self, requirement_id: &str, note: &NewNote) -> Result<Note> {
        let stored = stored_note(note);
        self.store
            .append(
                REQUIREMENTS_COLLECTION,
                requirement_id,
                "notes",
                vec![to_value(&stored)?],
            )
            .await?;
        Ok(stored)
    }

    async fn add_matching_property(&self, requirement_id: &str, property_id: &str) -> Result<()> {
        self.store
            .append(
                REQUIREMENTS_COLLECTION,
                requirement_id,
                "matchingProperties",
                vec![Value::String(property_id.to_string())],
            )
            .await?;
        Ok(())
    }

    async fn remove_matching_property(
        &self,
        requirement_id: &str,
        property_id: &str,
    ) -> Result<()> {
        self.store
            .remove(
                REQUIREMENTS_COLLECTION,
                requirement_id,
                "matchingProperties",
                vec![Value::String(property_id.to_string())],
            )
            .await?;
        Ok(())
    }
}
