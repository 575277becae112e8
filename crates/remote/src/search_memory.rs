//! Search index evaluated over a [`MemoryDocumentStore`].

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use propdesk_core::constants::{
    POST_RERA_PROJECTS_COLLECTION, PRE_LAUNCH_PROJECTS_COLLECTION, PROPERTIES_COLLECTION,
    REQUIREMENTS_COLLECTION,
};
use propdesk_core::search::{
    page_count, paginate, FacetCounts, FacetFilter, NumericFilter, SearchIndexTrait,
    SearchIndexes, SearchRequest, SearchResponse,
};
use propdesk_core::Result;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::document::{DocumentStore, ListQuery, MemoryDocumentStore};

/// Development stand-in for the hosted index.
///
/// Free text matches when every query token occurs (case-insensitively) in
/// some string attribute. Facet values are compared case-insensitively and
/// array attributes match on any element.
pub struct MemorySearchIndex {
    store: Arc<MemoryDocumentStore>,
    collections: HashMap<String, String>,
}

impl MemorySearchIndex {
    pub fn new(store: Arc<MemoryDocumentStore>, indexes: &SearchIndexes) -> Self {
        let collections = [
            (&indexes.properties, PROPERTIES_COLLECTION),
            (&indexes.requirements, REQUIREMENTS_COLLECTION),
            (&indexes.pre_launch_projects, PRE_LAUNCH_PROJECTS_COLLECTION),
            (&indexes.post_rera_projects, POST_RERA_PROJECTS_COLLECTION),
        ]
        .into_iter()
        .map(|(index, collection)| (index.clone(), collection.to_string()))
        .collect();
        Self { store, collections }
    }

    fn collection_for<'a>(&'a self, index: &'a str) -> &'a str {
        self.collections
            .get(index)
            .map(String::as_str)
            .unwrap_or(index)
    }
}

fn collect_text(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => {
            out.push_str(&s.to_lowercase());
            out.push(' ');
        }
        Value::Array(items) => items.iter().for_each(|v| collect_text(v, out)),
        _ => {}
    }
}

fn matches_query(fields: &Map<String, Value>, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let mut text = String::new();
    fields.values().for_each(|v| collect_text(v, &mut text));
    query
        .to_lowercase()
        .split_whitespace()
        .all(|token| text.contains(token))
}

/// Facet values of an attribute as strings; arrays yield one per element.
fn facet_values(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Number(n)) => vec![n.to_string()],
        Some(Value::Bool(b)) => vec![b.to_string()],
        Some(Value::Array(items)) => items
            .iter()
            .flat_map(|item| facet_values(Some(item)))
            .collect(),
        _ => Vec::new(),
    }
}

fn matches_facet(fields: &Map<String, Value>, filter: &FacetFilter) -> bool {
    let actual = facet_values(fields.get(&filter.attribute));
    filter
        .values
        .iter()
        .any(|wanted| actual.iter().any(|v| v.eq_ignore_ascii_case(wanted)))
}

fn numeric_value(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn matches_numeric(fields: &Map<String, Value>, filter: &NumericFilter) -> bool {
    numeric_value(fields.get(&filter.attribute))
        .is_some_and(|actual| filter.op.matches(actual, filter.value))
}

fn count_facets(hits: &[Value], facets: &[String]) -> FacetCounts {
    let mut counts = FacetCounts::new();
    for facet in facets {
        let entry = counts.entry(facet.clone()).or_default();
        for hit in hits {
            for value in facet_values(hit.get(facet)) {
                *entry.entry(value).or_default() += 1;
            }
        }
    }
    counts
}

#[async_trait]
impl SearchIndexTrait for MemorySearchIndex {
    async fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse> {
        let request = request.clone().normalized();
        let documents = self
            .store
            .list(self.collection_for(index), &ListQuery::all())
            .await?;

        let matched: Vec<Value> = documents
            .into_iter()
            .filter(|doc| {
                matches_query(&doc.fields, &request.query)
                    && request.facet_filters.iter().all(|f| matches_facet(&doc.fields, f))
                    && request
                        .numeric_filters
                        .iter()
                        .all(|f| matches_numeric(&doc.fields, f))
            })
            .map(|doc| {
                let mut fields = doc.fields;
                fields.insert("objectID".to_string(), Value::String(doc.id));
                Value::Object(fields)
            })
            .collect();

        Ok(SearchResponse {
            facets: count_facets(&matched, &request.facets),
            hits: paginate(&matched, request.page, request.hits_per_page),
            page: request.page,
            nb_pages: page_count(matched.len(), request.hits_per_page),
            hits_per_page: request.hits_per_page,
            nb_hits: matched.len(),
        })
    }
}
