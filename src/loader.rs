use crate::error::Result;
use crate::record::{Document, OutputRecord};
use crate::storage::{DocumentStore, UpsertOne};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Insert/update counts for one loaded batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadResult {
    pub inserted: usize,
    pub updated: usize,
}

/// Writes output records to the store as one batch of upserts by natural key.
///
/// Updates only set the fields present on the new record; fields that
/// disappeared upstream stay on the stored document from earlier runs.
#[derive(Clone)]
pub struct Loader {
    store: Arc<dyn DocumentStore>,
}

impl Loader {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// One upsert operation per record, in record order.
    pub fn upsert_ops(records: &[OutputRecord]) -> Result<Vec<UpsertOne>> {
        records
            .iter()
            .map(|record| {
                Ok(UpsertOne::new(
                    record.key_field(),
                    record.natural_key(),
                    record.to_document()?,
                ))
            })
            .collect()
    }

    pub async fn load(&self, collection: &str, records: &[OutputRecord]) -> Result<LoadResult> {
        if records.is_empty() {
            debug!("Nothing to load into {}", collection);
            return Ok(LoadResult::default());
        }

        let ops = Self::upsert_ops(records)?;
        let written = self.store.bulk_upsert(collection, &ops).await?;
        info!(
            "[{}] upserted: {}, matched: {}, modified: {}",
            collection, written.inserted, written.matched, written.modified
        );

        Ok(LoadResult {
            inserted: written.inserted,
            updated: written.matched,
        })
    }
}
