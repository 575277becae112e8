use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use propdesk_core::search::{SearchIndexTrait, SearchRequest, SearchResponse};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{RemoteError, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AlgoliaConfig {
    pub app_id: String,
    /// Search-only API key.
    pub api_key: String,
    /// Overrides `https://{appId}-dsn.algolia.net`.
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl AlgoliaConfig {
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    message: String,
}

/// Client for the Algolia query endpoint.
#[derive(Debug, Clone)]
pub struct AlgoliaClient {
    client: reqwest::Client,
    base_url: String,
}

impl AlgoliaClient {
    pub fn new(config: AlgoliaConfig) -> Result<Self> {
        if config.app_id.trim().is_empty() || config.api_key.trim().is_empty() {
            return Err(RemoteError::invalid_request(
                "Algolia application id and API key are required",
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Algolia-Application-Id",
            HeaderValue::from_str(&config.app_id)
                .map_err(|_| RemoteError::invalid_request("Invalid Algolia application id"))?,
        );
        headers.insert(
            "X-Algolia-API-Key",
            HeaderValue::from_str(&config.api_key)
                .map_err(|_| RemoteError::invalid_request("Invalid Algolia API key"))?,
        );

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        let base_url = match config.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}-dsn.algolia.net", config.app_id.to_lowercase()),
        };

        Ok(Self { client, base_url })
    }

    pub(crate) fn query_url(&self, index: &str) -> String {
        format!(
            "{}/1/indexes/{}/query",
            self.base_url,
            urlencoding::encode(index)
        )
    }

    async fn query(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse> {
        let response = self
            .client
            .post(self.query_url(index))
            .json(&query_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Algolia response ({}) for {}: {} bytes", status, index, body.len());

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| format!("Request failed: {}", body));
            return Err(RemoteError::api(status.as_u16(), message));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn escape_facet_value(value: &str) -> String {
    // A leading '-' would negate the filter.
    match value.strip_prefix('-') {
        Some(rest) => format!("\\-{}", rest),
        None => value.to_string(),
    }
}

/// Builds the query payload. Values of one facet filter are OR-ed (nested
/// array); separate filters are AND-ed.
pub fn query_body(request: &SearchRequest) -> Value {
    let facet_filters: Vec<Vec<String>> = request
        .facet_filters
        .iter()
        .filter(|f| !f.values.is_empty())
        .map(|f| {
            f.values
                .iter()
                .map(|v| format!("{}:{}", f.attribute, escape_facet_value(v)))
                .collect()
        })
        .collect();
    let numeric_filters: Vec<String> = request
        .numeric_filters
        .iter()
        .map(|f| f.to_string())
        .collect();

    let mut body = json!({
        "query": request.query,
        "page": request.page,
        "hitsPerPage": request.hits_per_page,
    });
    if !facet_filters.is_empty() {
        body["facetFilters"] = json!(facet_filters);
    }
    if !numeric_filters.is_empty() {
        body["numericFilters"] = json!(numeric_filters);
    }
    if !request.facets.is_empty() {
        body["facets"] = json!(request.facets);
    }
    body
}

#[async_trait]
impl SearchIndexTrait for AlgoliaClient {
    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> propdesk_core::Result<SearchResponse> {
        Ok(self.query(index, request).await?)
    }
}
