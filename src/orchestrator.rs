use crate::apis::build_http_client;
use crate::apis::spotify::SpotifyPlaylist;
use crate::apis::youtube::YouTubeTrending;
use crate::category::CategoryMap;
use crate::config::Config;
use crate::error::{EtlError, Result};
use crate::loader::Loader;
use crate::pipeline::{PairReport, Pipeline};
use crate::storage::DocumentStore;
use crate::transform::{TrackTransformer, VideoTransformer};
use crate::types::SourceKind;
use chrono::{DateTime, Utc};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Outcome of one (source, query) pair; a failure never stops sibling pairs
#[derive(Debug)]
pub struct PairOutcome {
    pub source: SourceKind,
    pub api: &'static str,
    pub query: String,
    pub result: std::result::Result<PairReport, EtlError>,
}

impl PairOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// One-line console summary of the pair.
    pub fn summary_line(&self) -> String {
        match &self.result {
            Ok(report) => format!(
                "[{} {}] inserted: {}, updated: {} ({} fetched, {} dropped)",
                self.source,
                self.query,
                report.inserted,
                report.updated,
                report.fetched,
                report.dropped
            ),
            Err(e) => format!(
                "[{} {}] FAILED via {} API: {}",
                self.source, self.query, self.api, e
            ),
        }
    }
}

/// Everything that happened in one run
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<PairOutcome>,
}

impl RunSummary {
    pub fn failures(&self) -> impl Iterator<Item = &PairOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn total_inserted(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|r| r.inserted)
            .sum()
    }

    pub fn total_updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|r| r.updated)
            .sum()
    }
}

/// Drives every configured pair sequentially, pacing calls between pairs
pub struct Orchestrator {
    jobs: Vec<(Pipeline, Vec<String>)>,
    loader: Loader,
    page_size: u32,
    delay: Duration,
}

impl Orchestrator {
    pub fn new(loader: Loader, page_size: u32, delay: Duration) -> Self {
        Self {
            jobs: Vec::new(),
            loader,
            page_size,
            delay,
        }
    }

    /// Wire both source pipelines from a validated config. The HTTP client,
    /// category map and store are built once and shared by every pair.
    pub fn from_config(
        config: &Config,
        categories: Arc<CategoryMap>,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self> {
        let client = build_http_client(config.timeout())?;
        let mut orchestrator = Self::new(Loader::new(store), config.page_size(), config.delay());

        let regions = config.video_regions();
        if !regions.is_empty() {
            let key = config.youtube_api_key.clone().ok_or_else(|| {
                EtlError::Config("missing API key for trending videos".to_string())
            })?;
            orchestrator = orchestrator.with_pipeline(
                Pipeline::new(
                    SourceKind::Videos,
                    Box::new(YouTubeTrending::with_base_url(
                        client.clone(),
                        key,
                        &config.videos.base_url,
                    )),
                    Box::new(VideoTransformer::new(categories)),
                    &config.videos.collection,
                ),
                regions.iter().map(|r| r.trim().to_uppercase()).collect(),
            );
        }

        let playlists = config.track_playlists();
        if !playlists.is_empty() {
            let token = config.spotify_access_token.clone().ok_or_else(|| {
                EtlError::Config("missing access token for playlist tracks".to_string())
            })?;
            orchestrator = orchestrator.with_pipeline(
                Pipeline::new(
                    SourceKind::Tracks,
                    Box::new(SpotifyPlaylist::with_base_url(
                        client,
                        token,
                        &config.tracks.base_url,
                    )),
                    Box::new(TrackTransformer::new()),
                    &config.tracks.collection,
                ),
                playlists.iter().map(|p| p.trim().to_string()).collect(),
            );
        }

        Ok(orchestrator)
    }

    /// Register a pipeline with the queries (region codes, playlist ids) it runs for.
    pub fn with_pipeline(mut self, pipeline: Pipeline, queries: Vec<String>) -> Self {
        self.jobs.push((pipeline, queries));
        self
    }

    pub fn pair_count(&self) -> usize {
        self.jobs.iter().map(|(_, queries)| queries.len()).sum()
    }

    pub async fn run(&self) -> RunSummary {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let total = self.pair_count();
        info!("Starting run {} with {} pairs", run_id, total);

        let mut outcomes = Vec::with_capacity(total);
        for (pipeline, queries) in &self.jobs {
            for query in queries {
                if !outcomes.is_empty() && !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }

                println!("→ Processing {} for {}...", pipeline.source(), query);
                let span = info_span!(
                    "pair",
                    run = %run_id,
                    source = %pipeline.source(),
                    query = %query
                );
                let result = pipeline
                    .run_pair(query, self.page_size, &self.loader)
                    .instrument(span)
                    .await;

                if let Err(e) = &result {
                    error!("Pair {} {} failed: {}", pipeline.source(), query, e);
                    counter!("media_etl_pair_failures_total", "source" => pipeline.source().name())
                        .increment(1);
                }

                let outcome = PairOutcome {
                    source: pipeline.source(),
                    api: pipeline.api_name(),
                    query: query.clone(),
                    result,
                };
                println!("{}", outcome.summary_line());
                outcomes.push(outcome);
            }
        }

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        info!(
            "Run {} finished: {} pairs, {} failed, {} inserted, {} updated",
            run_id,
            summary.outcomes.len(),
            summary.failures().count(),
            summary.total_inserted(),
            summary.total_updated()
        );
        summary
    }
}
