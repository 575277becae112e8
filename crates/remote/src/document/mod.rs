//! Document-store abstraction shared by the Firestore and in-memory backends.

mod memory;


pub use memory::MemoryDocumentStore;

use async_trait::async_trait;
use propdesk_core::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// A stored document: its id plus its top-level fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decodes the document, writing its id into `id_field`.
    pub fn decode<T: DeserializeOwned>(self, id_field: &str) -> Result<T> {
        let mut fields = self.fields;
        fields.insert(id_field.to_string(), Value::String(self.id));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Encodes a record as document fields, dropping its id field.
pub fn encode_fields<T: Serialize>(record: &T, id_field: &str) -> Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(mut fields) => {
            fields.remove(id_field);
            Ok(fields)
        }
        other => Err(propdesk_core::errors::StoreError::Malformed(format!(
            "expected an object, got {}",
            other
        ))
        .into()),
    }
}

/// Comparison used by a [`FieldFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    /// Field equals any of the values in an array operand.
    In,
    /// Array field contains the operand.
    ArrayContains,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Equal,
            value: value.into(),
        }
    }

    pub fn is_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::In,
            value: Value::Array(values),
        }
    }

    pub fn array_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::ArrayContains,
            value: value.into(),
        }
    }

    /// Evaluates the filter against a document held in memory.
    pub fn matches(&self, fields: &Map<String, Value>) -> bool {
        let actual = fields.get(&self.field).unwrap_or(&Value::Null);
        match self.op {
            FilterOp::Equal => *actual == self.value,
            FilterOp::In => self
                .value
                .as_array()
                .is_some_and(|values| values.contains(actual)),
            FilterOp::ArrayContains => actual
                .as_array()
                .is_some_and(|values| values.contains(&self.value)),
        }
    }
}

/// Filters (combined with AND) and an optional result limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<FieldFilter>,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Minimal document-store surface used by the repositories.
///
/// No operation spans more than one document, and there are no
/// transactions: concurrent writers follow last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Document>;

    /// Creates a document. Without an id the store assigns one.
    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Map<String, Value>,
    ) -> Result<Document>;

    /// Overwrites only the given top-level fields of an existing document.
    async fn merge(&self, collection: &str, id: &str, fields: Map<String, Value>)
        -> Result<Document>;

    /// Appends values missing from an array field.
    async fn append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<()>;

    /// Removes every occurrence of the values from an array field.
    async fn remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<()>;

    /// Overwrites `fields` and appends to the array `field` in one write.
    /// Either both changes are stored or neither is.
    async fn merge_and_append(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        field: &str,
        values: Vec<Value>,
    ) -> Result<()>;

    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Vec<Document>>;
}
