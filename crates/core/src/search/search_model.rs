//! Search request and response models.

use std::collections::BTreeMap;

use log::warn;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_HITS_PER_PAGE, MAX_HITS_PER_PAGE};

/// Facet value counts: facet name → value → number of hits.
pub type FacetCounts = BTreeMap<String, BTreeMap<String, u64>>;

/// Restricts an attribute to any of `values` (OR within, AND across filters).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FacetFilter {
    pub attribute: String,
    pub values: Vec<String>,
}

impl FacetFilter {
    pub fn new(attribute: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            attribute: attribute.into(),
            values,
        }
    }

    pub fn single(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(attribute, vec![value.into()])
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NumericOp {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = ">")]
    Gt,
}

impl NumericOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericOp::Lt => "<",
            NumericOp::Lte => "<=",
            NumericOp::Eq => "=",
            NumericOp::Gte => ">=",
            NumericOp::Gt => ">",
        }
    }

    pub fn matches(&self, left: Decimal, right: Decimal) -> bool {
        match self {
            NumericOp::Lt => left < right,
            NumericOp::Lte => left <= right,
            NumericOp::Eq => left == right,
            NumericOp::Gte => left >= right,
            NumericOp::Gt => left > right,
        }
    }
}

/// Numeric comparison on an attribute, e.g. `price >= 50`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NumericFilter {
    pub attribute: String,
    pub op: NumericOp,
    pub value: Decimal,
}

impl std::fmt::Display for NumericFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.attribute, self.op.as_str(), self.value.normalize())
    }
}

/// A free-text + faceted query for one page of results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub query: String,
    pub facet_filters: Vec<FacetFilter>,
    pub numeric_filters: Vec<NumericFilter>,
    /// Facets whose value counts should be returned.
    pub facets: Vec<String>,
    /// Zero-based page number.
    pub page: usize,
    pub hits_per_page: usize,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            facet_filters: Vec::new(),
            numeric_filters: Vec::new(),
            facets: Vec::new(),
            page: 0,
            hits_per_page: DEFAULT_HITS_PER_PAGE,
        }
    }
}

impl SearchRequest {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_facet_filter(mut self, filter: FacetFilter) -> Self {
        self.facet_filters.push(filter);
        self
    }

    pub fn with_numeric_filter(mut self, filter: NumericFilter) -> Self {
        self.numeric_filters.push(filter);
        self
    }

    pub fn with_facets(mut self, facets: &[&str]) -> Self {
        self.facets = facets.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn page(mut self, page: usize, hits_per_page: usize) -> Self {
        self.page = page;
        self.hits_per_page = hits_per_page;
        self
    }

    /// Clamps the page size into the accepted range and drops empty filters.
    pub fn normalized(mut self) -> Self {
        if self.hits_per_page == 0 {
            self.hits_per_page = DEFAULT_HITS_PER_PAGE;
        }
        self.hits_per_page = self.hits_per_page.min(MAX_HITS_PER_PAGE);
        self.query = self.query.trim().to_string();
        self.facet_filters.retain(|f| !f.values.is_empty());
        self
    }
}

/// Raw page of hits returned by the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub hits: Vec<Value>,
    pub page: usize,
    pub nb_pages: usize,
    pub hits_per_page: usize,
    pub nb_hits: usize,
    #[serde(default)]
    pub facets: FacetCounts,
}

impl SearchResponse {
    /// Decodes hits into records. The index's `objectID` fills `id_field`
    /// when the hit does not carry it; hits that fail to decode are skipped.
    pub fn decode<T: DeserializeOwned>(self, id_field: &str) -> SearchPage<T> {
        let hits = self
            .hits
            .into_iter()
            .filter_map(|hit| decode_hit(hit, id_field))
            .collect();
        SearchPage {
            hits,
            page: self.page,
            nb_pages: self.nb_pages,
            hits_per_page: self.hits_per_page,
            nb_hits: self.nb_hits,
            facets: self.facets,
        }
    }
}

fn decode_hit<T: DeserializeOwned>(mut hit: Value, id_field: &str) -> Option<T> {
    if let Value::Object(map) = &mut hit {
        if !map.contains_key(id_field) {
            if let Some(object_id) = map.get("objectID").cloned() {
                map.insert(id_field.to_string(), object_id);
            }
        }
    }
    match serde_json::from_value(hit) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Skipping undecodable search hit: {}", e);
            None
        }
    }
}

/// Typed page of search results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage<T> {
    pub hits: Vec<T>,
    pub page: usize,
    pub nb_pages: usize,
    pub hits_per_page: usize,
    pub nb_hits: usize,
    pub facets: FacetCounts,
}

/// Index names per record type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndexes {
    pub properties: String,
    pub requirements: String,
    pub pre_launch_projects: String,
    pub post_rera_projects: String,
}

impl Default for SearchIndexes {
    fn default() -> Self {
        Self {
            properties: "properties".to_string(),
            requirements: "requirements".to_string(),
            pre_launch_projects: "preLaunchProjects".to_string(),
            post_rera_projects: "postReraProjects".to_string(),
        }
    }
}
