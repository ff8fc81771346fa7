use crate::constants::{SPOTIFY_API, TRACKS_SOURCE, VIDEOS_SOURCE, YOUTUBE_API};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw item as returned from an external API, consumed read-only
pub type RawItem = serde_json::Value;

/// Which kind of media a pipeline pulls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Videos,
    Tracks,
}

impl SourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Videos => VIDEOS_SOURCE,
            SourceKind::Tracks => TRACKS_SOURCE,
        }
    }

    pub fn api_name(&self) -> &'static str {
        match self {
            SourceKind::Videos => YOUTUBE_API,
            SourceKind::Tracks => SPOTIFY_API,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            VIDEOS_SOURCE | YOUTUBE_API => Some(SourceKind::Videos),
            TRACKS_SOURCE | SPOTIFY_API => Some(SourceKind::Tracks),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Core trait every external data source implements
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    /// Name of the external API, used in errors and reports
    fn api_name(&self) -> &'static str;

    /// Fetch one bounded page of raw items for a region code or playlist id.
    /// An empty response yields an empty vector; client errors propagate as-is.
    async fn fetch(&self, query: &str, page_size: u32) -> Result<Vec<RawItem>>;
}
