use crate::error::{EtlError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

pub type DocumentMap = Map<String, Value>;

/// Insert-or-update of one document addressed by its natural key.
///
/// Only the fields in `set` are written: on an existing document, fields
/// absent from `set` keep their stored values.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOne {
    pub key_field: String,
    pub key: String,
    pub set: DocumentMap,
}

impl UpsertOne {
    pub fn new(key_field: impl Into<String>, key: impl Into<String>, set: DocumentMap) -> Self {
        Self {
            key_field: key_field.into(),
            key: key.into(),
            set,
        }
    }
}

/// Counts reported by the store for one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkWriteResult {
    /// Documents created because no document had the key
    pub inserted: usize,
    /// Existing documents addressed by key
    pub matched: usize,
    /// Matched documents whose content actually changed
    pub modified: usize,
}

/// Keyed document store with batched `$set` upserts
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Apply every operation or none of them.
    async fn bulk_upsert(&self, collection: &str, ops: &[UpsertOne]) -> Result<BulkWriteResult>;

    async fn find_by_key(&self, collection: &str, key: &str) -> Result<Option<DocumentMap>>;

    async fn count(&self, collection: &str) -> Result<usize>;
}

/// Overwrite the fields in `set` on `doc`; reports whether anything changed.
pub fn apply_set(doc: &mut DocumentMap, set: &DocumentMap) -> bool {
    let mut changed = false;
    for (field, value) in set {
        if doc.get(field) != Some(value) {
            doc.insert(field.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

/// Document created for a key seen for the first time.
pub fn new_document(op: &UpsertOne) -> DocumentMap {
    let mut doc = DocumentMap::new();
    doc.insert(op.key_field.clone(), Value::String(op.key.clone()));
    apply_set(&mut doc, &op.set);
    doc
}

/// Collection names end up in SQL identifiers; keep them to `[A-Za-z0-9_]`.
pub fn validate_collection(name: &str) -> Result<()> {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(EtlError::Config(format!("invalid collection name '{}'", name)))
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory store for development/testing
#[derive(Default)]
pub struct InMemoryDocumentStore {
    collections: Mutex<HashMap<String, BTreeMap<String, DocumentMap>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn bulk_upsert(&self, collection: &str, ops: &[UpsertOne]) -> Result<BulkWriteResult> {
        validate_collection(collection)?;
        let mut collections = lock(&self.collections);

        // Stage on a copy so a failed batch leaves the collection untouched
        let mut staged = collections.get(collection).cloned().unwrap_or_default();
        let mut result = BulkWriteResult::default();
        for op in ops {
            match staged.get_mut(&op.key) {
                Some(doc) => {
                    result.matched += 1;
                    if apply_set(doc, &op.set) {
                        result.modified += 1;
                    }
                }
                None => {
                    staged.insert(op.key.clone(), new_document(op));
                    result.inserted += 1;
                }
            }
        }
        collections.insert(collection.to_string(), staged);

        debug!(
            "In-memory upsert into {}: {} inserted, {} matched",
            collection, result.inserted, result.matched
        );
        Ok(result)
    }

    async fn find_by_key(&self, collection: &str, key: &str) -> Result<Option<DocumentMap>> {
        let collections = lock(&self.collections);
        Ok(collections.get(collection).and_then(|c| c.get(key)).cloned())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = lock(&self.collections);
        Ok(collections.get(collection).map_or(0, |c| c.len()))
    }
}
