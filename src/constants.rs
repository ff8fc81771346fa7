/// Source name constants used by the CLI, logs and console reporting.

// User-facing source names (used in CLI)
pub const VIDEOS_SOURCE: &str = "videos";
pub const TRACKS_SOURCE: &str = "tracks";

// API names reported in errors and summaries
pub const YOUTUBE_API: &str = "youtube";
pub const SPOTIFY_API: &str = "spotify";

pub const YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const SPOTIFY_BASE_URL: &str = "https://api.spotify.com/v1";

// Store layout
pub const VIDEOS_COLLECTION: &str = "youtube_videos";
pub const TRACKS_COLLECTION: &str = "spotify_tracks";

// Natural keys
pub const VIDEO_KEY_FIELD: &str = "video_id";
pub const TRACK_KEY_FIELD: &str = "track_id";

// Credentials and connection string
pub const YOUTUBE_API_KEY_ENV: &str = "YOUTUBE_API_KEY";
pub const SPOTIFY_TOKEN_ENV: &str = "SPOTIFY_ACCESS_TOKEN";
pub const STORE_URI_ENV: &str = "STORE_URI";

/// Upper bound the external APIs accept for a single page.
pub const MAX_PAGE_SIZE: u32 = 50;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_DELAY_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_REGION: &str = "BR";

/// Label used whenever a category code has no mapping.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Get all supported source names
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![VIDEOS_SOURCE, TRACKS_SOURCE]
}
