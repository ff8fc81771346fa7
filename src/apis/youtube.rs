use crate::apis::{clamp_page_size, error_for_status, items_of};
use crate::constants::{YOUTUBE_API, YOUTUBE_BASE_URL};
use crate::error::Result;
use crate::types::{Extractor, RawItem};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Descriptive metadata, statistics and technical details in one request
const VIDEO_PARTS: &str = "snippet,statistics,contentDetails";

/// Most-popular chart of the video platform for a region code
pub struct YouTubeTrending {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeTrending {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, YOUTUBE_BASE_URL)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn videos_url(&self) -> String {
        format!("{}/videos", self.base_url)
    }

    fn query_params(&self, region: &str, page_size: u32) -> Vec<(&'static str, String)> {
        vec![
            ("part", VIDEO_PARTS.to_string()),
            ("chart", "mostPopular".to_string()),
            ("regionCode", region.to_uppercase()),
            ("maxResults", clamp_page_size(page_size).to_string()),
            ("key", self.api_key.clone()),
        ]
    }
}

#[async_trait::async_trait]
impl Extractor for YouTubeTrending {
    fn api_name(&self) -> &'static str {
        YOUTUBE_API
    }

    #[instrument(skip(self), fields(api = YOUTUBE_API))]
    async fn fetch(&self, region: &str, page_size: u32) -> Result<Vec<RawItem>> {
        debug!("Requesting trending videos for region {}", region);
        let resp = self
            .client
            .get(self.videos_url())
            .query(&self.query_params(region, page_size))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_status(YOUTUBE_API, resp).await);
        }

        let body: Value = resp.json().await?;
        let items = items_of(&body);
        info!("Fetched {} trending videos for region {}", items.len(), region);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_trending_request() {
        let api =
            YouTubeTrending::with_base_url(reqwest::Client::new(), "k", "http://localhost:9/v3/");
        assert_eq!(api.videos_url(), "http://localhost:9/v3/videos");

        let params = api.query_params("br", 80);
        assert!(params.contains(&("part", "snippet,statistics,contentDetails".to_string())));
        assert!(params.contains(&("chart", "mostPopular".to_string())));
        assert!(params.contains(&("regionCode", "BR".to_string())));
        assert!(params.contains(&("maxResults", "50".to_string())));
        assert!(params.contains(&("key", "k".to_string())));
    }
}
