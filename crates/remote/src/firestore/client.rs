//! Firestore REST client implementing [`DocumentStore`].

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::query::{field_path, structured_query};
use super::value::{decode_document, encode_fields, encode_value};
use crate::document::{Document, DocumentStore, ListQuery};
use crate::errors::{RemoteError, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Connection settings for one Firestore database.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database: String,
    /// Overrides the public endpoint, e.g. for the emulator.
    pub base_url: Option<String>,
    /// OAuth bearer token.
    pub access_token: Option<String>,
    /// Web API key, sent as `?key=`.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: "(default)".to_string(),
            base_url: None,
            access_token: None,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct FirestoreClient {
    client: reqwest::Client,
    /// `projects/{p}/databases/{db}/documents`
    root: String,
    base_url: String,
    api_key: Option<String>,
}

impl FirestoreClient {
    pub fn new(config: FirestoreConfig) -> Result<Self> {
        if config.project_id.trim().is_empty() {
            return Err(RemoteError::invalid_request("Firestore project id is empty"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.access_token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| RemoteError::invalid_request("Invalid access token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            root: format!(
                "projects/{}/databases/{}/documents",
                config.project_id, config.database
            ),
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: config.api_key,
        })
    }

    fn documents_url(&self) -> String {
        format!("{}/{}", self.base_url, self.root)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.documents_url(),
            collection,
            urlencoding::encode(id)
        )
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.root, collection, id)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.api_key {
            Some(key) => builder.query(&[("key", key.as_str())]),
            None => builder,
        }
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("Firestore response ({}): {}", status, body);

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(RemoteError::api(
                    status.as_u16(),
                    format!("{}: {}", error.error.status, error.error.message),
                ));
            }
            return Err(RemoteError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!("Failed to deserialize Firestore response. Body: {}, Error: {}", body, e);
            RemoteError::codec(format!("Failed to parse response: {}", e))
        })
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Document> {
        let response = self
            .request(Method::GET, &self.document_url(collection, id))
            .send()
            .await?;
        let raw: Value = Self::parse_response(response).await?;
        decode_document(&raw)
    }

    async fn insert(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: &Map<String, Value>,
    ) -> Result<Document> {
        let url = format!("{}/{}", self.documents_url(), collection);
        let mut builder = self.request(Method::POST, &url);
        if let Some(id) = id {
            builder = builder.query(&[("documentId", id)]);
        }
        let response = builder
            .json(&json!({ "fields": encode_fields(fields) }))
            .send()
            .await?;
        let raw: Value = Self::parse_response(response).await?;
        decode_document(&raw)
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<Document> {
        let mut params: Vec<(&str, String)> = fields
            .keys()
            .map(|key| ("updateMask.fieldPaths", field_path(key)))
            .collect();
        params.push(("currentDocument.exists", "true".to_string()));

        let response = self
            .request(Method::PATCH, &self.document_url(collection, id))
            .query(&params)
            .json(&json!({ "fields": encode_fields(fields) }))
            .send()
            .await?;
        let raw: Value = Self::parse_response(response).await?;
        decode_document(&raw)
    }

    fn array_transform(field: &str, transform: &str, values: &[Value]) -> Map<String, Value> {
        let encoded: Vec<Value> = values.iter().map(encode_value).collect();
        let mut field_transform = Map::new();
        field_transform.insert("fieldPath".to_string(), json!(field_path(field)));
        field_transform.insert(transform.to_string(), json!({ "values": encoded }));
        field_transform
    }

    /// Sends a single write through `:commit`. The commit response carries no
    /// document, so callers that need the stored state read it separately.
    async fn commit(&self, write: Value) -> Result<()> {
        let url = format!("{}:commit", self.documents_url());
        let response = self
            .request(Method::POST, &url)
            .json(&json!({ "writes": [write] }))
            .send()
            .await?;
        let _: Value = Self::parse_response(response).await?;
        Ok(())
    }

    async fn transform(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        transform: &str,
        values: &[Value],
    ) -> Result<()> {
        self.commit(json!({
            "transform": {
                "document": self.document_name(collection, id),
                "fieldTransforms": [Self::array_transform(field, transform, values)],
            },
            "currentDocument": { "exists": true },
        }))
        .await
    }

    /// Field update plus array append, applied atomically by one commit write.
    fn update_with_append_write(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
        field: &str,
        values: &[Value],
    ) -> Value {
        let paths: Vec<String> = fields.keys().map(|key| field_path(key)).collect();
        json!({
            "update": {
                "name": self.document_name(collection, id),
                "fields": encode_fields(fields),
            },
            "updateMask": { "fieldPaths": paths },
            "updateTransforms": [Self::array_transform(field, "appendMissingElements", values)],
            "currentDocument": { "exists": true },
        })
    }

    async fn run_query(&self, collection: &str, query: &ListQuery) -> Result<Vec<Document>> {
        let url = format!("{}:runQuery", self.documents_url());
        let response = self
            .request(Method::POST, &url)
            .json(&structured_query(collection, query))
            .send()
            .await?;
        let items: Vec<RunQueryItem> = Self::parse_response(response).await?;
        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(|raw| decode_document(&raw))
            .collect()
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get(&self, collection: &str, id: &str) -> propdesk_core::Result<Document> {
        Ok(self.fetch(collection, id).await?)
    }

    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Map<String, Value>,
    ) -> propdesk_core::Result<Document> {
        Ok(self.insert(collection, id, &fields).await?)
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> propdesk_core::Result<Document> {
        Ok(self.patch(collection, id, &fields).await?)
    }

    async fn append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<Value>,
    ) -> propdesk_core::Result<()> {
        Ok(self
            .transform(collection, id, field, "appendMissingElements", &values)
            .await?)
    }

    async fn remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<Value>,
    ) -> propdesk_core::Result<()> {
        Ok(self
            .transform(collection, id, field, "removeAllFromArray", &values)
            .await?)
    }

    async fn merge_and_append(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        field: &str,
        values: Vec<Value>,
    ) -> propdesk_core::Result<()> {
        let write = self.update_with_append_write(collection, id, &fields, field, &values);
        Ok(self.commit(write).await?)
    }

    async fn list(&self, collection: &str, query: &ListQuery) -> propdesk_core::Result<Vec<Document>> {
        Ok(self.run_query(collection, query).await?)
    }
}
