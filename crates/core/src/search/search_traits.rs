use async_trait::async_trait;

use super::search_model::{SearchRequest, SearchResponse};
use crate::errors::Result;

/// Contract for the hosted search index.
///
/// Filtering, faceting and ranking are done by the index; implementations
/// only shape the request and unwrap the response.
#[async_trait]
pub trait SearchIndexTrait: Send + Sync {
    /// Runs a query against `index` and returns one page of raw hits.
    async fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse>;
}
