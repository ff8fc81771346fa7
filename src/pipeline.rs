use crate::error::Result;
use crate::loader::Loader;
use crate::transform::Transformer;
use crate::types::{Extractor, SourceKind};
use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{info, instrument};

/// Result of one (source, query) extract → transform → load cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairReport {
    pub fetched: usize,
    pub transformed: usize,
    pub dropped: usize,
    pub inserted: usize,
    pub updated: usize,
}

/// Extract → transform → load wiring for one source type
pub struct Pipeline {
    source: SourceKind,
    extractor: Box<dyn Extractor>,
    transformer: Box<dyn Transformer>,
    collection: String,
}

impl Pipeline {
    pub fn new(
        source: SourceKind,
        extractor: Box<dyn Extractor>,
        transformer: Box<dyn Transformer>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            source,
            extractor,
            transformer,
            collection: collection.into(),
        }
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn api_name(&self) -> &'static str {
        self.extractor.api_name()
    }

    /// Run one pair to completion. Extraction and load errors propagate to
    /// the caller; malformed items are dropped inside the transform step.
    #[instrument(
        skip(self, loader),
        fields(source = %self.source, api = self.extractor.api_name())
    )]
    pub async fn run_pair(
        &self,
        query: &str,
        page_size: u32,
        loader: &Loader,
    ) -> Result<PairReport> {
        let source = self.source.name();
        let started = std::time::Instant::now();

        let items = self.extractor.fetch(query, page_size).await?;
        counter!("media_etl_items_fetched_total", "source" => source).increment(items.len() as u64);

        let output = self.transformer.transform(&items);
        counter!("media_etl_items_dropped_total", "source" => source)
            .increment(output.dropped as u64);
        info!(
            "Transformed {} of {} items ({} dropped)",
            output.records.len(),
            items.len(),
            output.dropped
        );

        let loaded = loader.load(&self.collection, &output.records).await?;
        histogram!("media_etl_pair_duration_seconds", "source" => source)
            .record(started.elapsed().as_secs_f64());

        Ok(PairReport {
            fetched: items.len(),
            transformed: output.records.len(),
            dropped: output.dropped,
            inserted: loaded.inserted,
            updated: loaded.updated,
        })
    }
}
