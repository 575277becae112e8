use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use log::debug;
use propdesk_core::errors::StoreError;
use propdesk_core::utils::assigned_id;
use propdesk_core::Result;
use serde_json::{Map, Value};

use super::{Document, DocumentStore, ListQuery};

type Collection = BTreeMap<String, Map<String, Value>>;

/// In-process document store for development and tests.
///
/// Failures can be injected per operation kind or per collection to exercise
/// rollback paths.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    failing_collections: RwLock<HashSet<String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a document without failure injection.
    ///
    /// Non-object values are ignored.
    pub fn seed(&self, collection: &str, id: &str, value: Value) {
        if let Value::Object(mut fields) = value {
            fields.remove("id");
            self.write()
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), fields);
        }
    }

    /// Snapshot of one collection, ordered by id.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.read()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every write to `collection` fail until cleared.
    pub fn fail_writes_to(&self, collection: &str, fail: bool) {
        let mut failing = self
            .failing_collections
            .write()
            .unwrap_or_else(|p| p.into_inner());
        if fail {
            failing.insert(collection.to_string());
        } else {
            failing.remove(collection);
        }
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Network("injected read failure".to_string()).into());
        }
        Ok(())
    }

    fn check_write(&self, collection: &str) -> Result<()> {
        let failing = self
            .failing_collections
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .contains(collection);
        if failing || self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Network("injected write failure".to_string()).into());
        }
        Ok(())
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        f: impl FnOnce(&mut Map<String, Value>) -> Result<()>,
    ) -> Result<Document> {
        self.check_write(collection)?;
        let mut collections = self.write();
        let fields = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection, id)))?;
        f(fields)?;
        Ok(Document::new(id, fields.clone()))
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Collection>> {
        self.collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Collection>> {
        self.collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn not_an_array(field: &str) -> propdesk_core::Error {
    StoreError::Rejected {
        status: 400,
        message: format!("field '{}' is not an array", field),
    }
    .into()
}

fn array_field<'a>(fields: &'a mut Map<String, Value>, field: &str) -> Result<&'a mut Vec<Value>> {
    let slot = fields
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    slot.as_array_mut().ok_or_else(|| not_an_array(field))
}

fn append_missing(fields: &mut Map<String, Value>, field: &str, values: Vec<Value>) -> Result<()> {
    let array = array_field(fields, field)?;
    for value in values {
        if !array.contains(&value) {
            array.push(value);
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Document> {
        self.check_read()?;
        self.read()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone()))
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection, id)).into())
    }

    async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Map<String, Value>,
    ) -> Result<Document> {
        self.check_write(collection)?;
        let id = id.map(str::to_string).unwrap_or_else(assigned_id);
        let mut collections = self.write();
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(StoreError::Rejected {
                status: 409,
                message: format!("{}/{} already exists", collection, id),
            }
            .into());
        }
        docs.insert(id.clone(), fields.clone());
        debug!("Created {}/{}", collection, id);
        Ok(Document::new(id, fields))
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document> {
        self.update(collection, id, |stored| {
            for (key, value) in fields {
                stored.insert(key, value);
            }
            Ok(())
        })
    }

    async fn append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<()> {
        self.update(collection, id, |stored| append_missing(stored, field, values))?;
        Ok(())
    }

    async fn remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        values: Vec<Value>,
    ) -> Result<()> {
        self.update(collection, id, |stored| {
            let array = array_field(stored, field)?;
            array.retain(|v| !values.contains(v));
            Ok(())
        })?;
        Ok(())
    }

    async fn merge_and_append(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
        field: &str,
        values: Vec<Value>,
    ) -> Result<()> {
        self.update(collection, id, |stored| {
            // Checked before touching the document so a bad field leaves it as it was.
            if stored.get(field).is_some_and(|v| !v.is_null() && !v.is_array()) {
                return Err(not_an_array(field));
            }
            for (key, value) in fields {
                stored.insert(key, value);
            }
            append_missing(stored, field, values)
        })?;
        Ok(())
    }

    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Vec<Document>> {
        self.check_read()?;
        let collections = self.read();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        let matching = docs
            .iter()
            .filter(|(_, fields)| query.filters.iter().all(|f| f.matches(fields)))
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()));
        Ok(match query.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }
}
