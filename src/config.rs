use crate::constants::*;
use crate::error::{EtlError, Result};
use crate::storage::validate_collection;
use crate::types::SourceKind;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection string of the document store; `STORE_URI` takes precedence
    pub store_uri: Option<String>,
    pub max_results: u32,
    pub delay_ms: u64,
    pub timeout_seconds: u64,
    pub videos: VideosConfig,
    pub tracks: TracksConfig,
    #[serde(skip)]
    pub youtube_api_key: Option<String>,
    #[serde(skip)]
    pub spotify_access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideosConfig {
    pub enabled: bool,
    pub regions: Vec<String>,
    pub collection: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TracksConfig {
    pub enabled: bool,
    pub playlists: Vec<String>,
    pub collection: String,
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_uri: None,
            max_results: DEFAULT_PAGE_SIZE,
            delay_ms: DEFAULT_DELAY_MS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            videos: VideosConfig::default(),
            tracks: TracksConfig::default(),
            youtube_api_key: None,
            spotify_access_token: None,
        }
    }
}

impl Default for VideosConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            regions: vec![DEFAULT_REGION.to_string()],
            collection: VIDEOS_COLLECTION.to_string(),
            base_url: YOUTUBE_BASE_URL.to_string(),
        }
    }
}

impl Default for TracksConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            playlists: Vec::new(),
            collection: TRACKS_COLLECTION.to_string(),
            base_url: SPOTIFY_BASE_URL.to_string(),
        }
    }
}

/// Command-line overrides applied on top of the file and environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sources: Option<Vec<SourceKind>>,
    pub regions: Option<Vec<String>>,
    pub playlists: Option<Vec<String>>,
    pub max_results: Option<u32>,
    pub delay_ms: Option<u64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    /// Load the TOML file (optional unless explicitly named) and credentials
    /// from the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Credentials and connection string; blank values count as unset.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = non_blank(var(STORE_URI_ENV)) {
            self.store_uri = Some(uri);
        }
        self.youtube_api_key = non_blank(var(YOUTUBE_API_KEY_ENV));
        self.spotify_access_token = non_blank(var(SPOTIFY_TOKEN_ENV));
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(sources) = overrides.sources {
            self.videos.enabled = sources.contains(&SourceKind::Videos);
            self.tracks.enabled = sources.contains(&SourceKind::Tracks);
        }
        if let Some(regions) = overrides.regions {
            self.videos.regions = regions;
        }
        if let Some(playlists) = overrides.playlists {
            self.tracks.playlists = playlists;
        }
        if let Some(n) = overrides.max_results {
            self.max_results = n;
        }
        if let Some(ms) = overrides.delay_ms {
            self.delay_ms = ms;
        }
    }

    pub fn video_regions(&self) -> &[String] {
        if self.videos.enabled {
            &self.videos.regions
        } else {
            &[]
        }
    }

    pub fn track_playlists(&self) -> &[String] {
        if self.tracks.enabled {
            &self.tracks.playlists
        } else {
            &[]
        }
    }

    pub fn page_size(&self) -> u32 {
        self.max_results.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Fail fast on anything that would make a pair run with empty credentials.
    pub fn validate(&self) -> Result<()> {
        if non_blank(self.store_uri.clone()).is_none() {
            return Err(EtlError::Config(format!("{} is not set", STORE_URI_ENV)));
        }
        if self.timeout_seconds == 0 {
            return Err(EtlError::Config("timeout_seconds must be greater than 0".to_string()));
        }

        let regions = self.video_regions();
        for region in regions {
            let region = region.trim();
            if region.len() != 2 || !region.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(EtlError::Config(format!(
                    "invalid region code '{}': expected two letters",
                    region
                )));
            }
        }
        if !regions.is_empty() && self.youtube_api_key.is_none() {
            return Err(EtlError::Config(format!(
                "{} is required to fetch trending videos",
                YOUTUBE_API_KEY_ENV
            )));
        }

        let playlists = self.track_playlists();
        if playlists.iter().any(|p| p.trim().is_empty()) {
            return Err(EtlError::Config("playlist id must not be blank".to_string()));
        }
        if !playlists.is_empty() && self.spotify_access_token.is_none() {
            return Err(EtlError::Config(format!(
                "{} is required to fetch playlist tracks",
                SPOTIFY_TOKEN_ENV
            )));
        }

        if self.videos.enabled {
            validate_collection(&self.videos.collection)?;
        }
        if self.tracks.enabled {
            validate_collection(&self.tracks.collection)?;
        }

        if regions.is_empty() && playlists.is_empty() {
            return Err(EtlError::Config(
                "nothing to do: no regions or playlists configured".to_string(),
            ));
        }
        Ok(())
    }
}
