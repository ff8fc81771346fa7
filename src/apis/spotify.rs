use crate::apis::{clamp_page_size, error_for_status, items_of};
use crate::constants::{SPOTIFY_API, SPOTIFY_BASE_URL};
use crate::error::Result;
use crate::types::{Extractor, RawItem};
use serde_json::Value;
use tracing::{debug, info, instrument};

/// Tracks of a playlist on the music-streaming platform.
///
/// The access token is pre-provisioned and passed through as a bearer token.
pub struct SpotifyPlaylist {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl SpotifyPlaylist {
    pub fn new(client: reqwest::Client, access_token: impl Into<String>) -> Self {
        Self::with_base_url(client, access_token, SPOTIFY_BASE_URL)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            access_token: access_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn tracks_url(&self, playlist_id: &str) -> String {
        format!("{}/playlists/{}/tracks", self.base_url, playlist_id.trim())
    }
}

/// Unwrap playlist entries into their track objects.
///
/// Removed or unavailable tracks come back as entries with a null or missing
/// `track`; those are skipped.
pub fn tracks_of(body: &Value) -> Vec<RawItem> {
    items_of(body)
        .into_iter()
        .filter_map(|mut entry| match entry.get_mut("track").map(Value::take) {
            Some(track) if track.is_object() => Some(track),
            _ => None,
        })
        .collect()
}

#[async_trait::async_trait]
impl Extractor for SpotifyPlaylist {
    fn api_name(&self) -> &'static str {
        SPOTIFY_API
    }

    #[instrument(skip(self), fields(api = SPOTIFY_API))]
    async fn fetch(&self, playlist_id: &str, page_size: u32) -> Result<Vec<RawItem>> {
        debug!("Requesting tracks for playlist {}", playlist_id);
        let resp = self
            .client
            .get(self.tracks_url(playlist_id))
            .bearer_auth(&self.access_token)
            .query(&[("limit", clamp_page_size(page_size).to_string())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_for_status(SPOTIFY_API, resp).await);
        }

        let body: Value = resp.json().await?;
        let tracks = tracks_of(&body);
        info!("Fetched {} tracks for playlist {}", tracks.len(), playlist_id);
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn skips_removed_tracks() {
        let body = json!({
            "items": [
                {"added_at": "2024-01-01T00:00:00Z", "track": {"id": "t1", "name": "One"}},
                {"added_at": "2024-01-02T00:00:00Z", "track": null},
                {"added_at": "2024-01-03T00:00:00Z"},
                {"track": {"id": "t2", "name": "Two"}}
            ]
        });
        let tracks = tracks_of(&body);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0]["id"], json!("t1"));
        assert_eq!(tracks[1]["id"], json!("t2"));
    }

    #[test]
    fn no_items_means_no_tracks() {
        assert!(tracks_of(&json!({})).is_empty());
    }

    #[test]
    fn builds_playlist_url() {
        let api =
            SpotifyPlaylist::with_base_url(reqwest::Client::new(), "tok", "http://localhost:9/v1");
        assert_eq!(
            api.tracks_url("37i9dQZF1DXcBWIGoYBM5M"),
            "http://localhost:9/v1/playlists/37i9dQZF1DXcBWIGoYBM5M/tracks"
        );
    }
}
