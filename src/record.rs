use crate::constants::{TRACK_KEY_FIELD, VIDEO_KEY_FIELD};
use crate::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat trending-video record, keyed by `video_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: Option<String>,
    pub channel: Option<String>,
    pub category_id: Option<String>,
    pub category_title: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub duration_seconds: u64,
}

/// Flat playlist-track record, keyed by `track_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub track_id: String,
    pub name: Option<String>,
    /// Contributing artists in source order, duplicates kept
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub release_date: Option<String>,
    pub popularity: u64,
    pub explicit: bool,
    pub duration_ms: u64,
    /// `minutes:seconds` display form of `duration_ms`
    pub duration: String,
}

/// A record that can be stored under its natural key
pub trait Document {
    fn key_field(&self) -> &'static str;
    fn natural_key(&self) -> &str;
    fn to_document(&self) -> Result<Map<String, Value>>;
}

fn object_of<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(EtlError::Record(format!(
            "record did not serialize to an object: {}",
            other
        ))),
    }
}

impl Document for VideoRecord {
    fn key_field(&self) -> &'static str {
        VIDEO_KEY_FIELD
    }

    fn natural_key(&self) -> &str {
        &self.video_id
    }

    fn to_document(&self) -> Result<Map<String, Value>> {
        object_of(self)
    }
}

impl Document for TrackRecord {
    fn key_field(&self) -> &'static str {
        TRACK_KEY_FIELD
    }

    fn natural_key(&self) -> &str {
        &self.track_id
    }

    fn to_document(&self) -> Result<Map<String, Value>> {
        object_of(self)
    }
}

/// Output of any transformer
#[derive(Debug, Clone, PartialEq)]
pub enum OutputRecord {
    Video(VideoRecord),
    Track(TrackRecord),
}

impl Document for OutputRecord {
    fn key_field(&self) -> &'static str {
        match self {
            OutputRecord::Video(v) => v.key_field(),
            OutputRecord::Track(t) => t.key_field(),
        }
    }

    fn natural_key(&self) -> &str {
        match self {
            OutputRecord::Video(v) => v.natural_key(),
            OutputRecord::Track(t) => t.natural_key(),
        }
    }

    fn to_document(&self) -> Result<Map<String, Value>> {
        match self {
            OutputRecord::Video(v) => v.to_document(),
            OutputRecord::Track(t) => t.to_document(),
        }
    }
}

impl From<VideoRecord> for OutputRecord {
    fn from(record: VideoRecord) -> Self {
        OutputRecord::Video(record)
    }
}

impl From<TrackRecord> for OutputRecord {
    fn from(record: TrackRecord) -> Self {
        OutputRecord::Track(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn video_document_has_flat_fields() {
        let record = VideoRecord {
            video_id: "v1".into(),
            title: Some("T".into()),
            channel: None,
            category_id: Some("10".into()),
            category_title: "Music".into(),
            view_count: 100,
            like_count: 0,
            comment_count: 0,
            duration_seconds: 180,
        };
        let doc = OutputRecord::from(record).to_document().unwrap();
        assert_eq!(doc["video_id"], json!("v1"));
        assert_eq!(doc["channel"], Value::Null);
        assert_eq!(doc["view_count"], json!(100));
        assert_eq!(doc["duration_seconds"], json!(180));
        assert_eq!(doc.len(), 9);
    }

    #[test]
    fn track_document_keeps_artist_order() {
        let record = TrackRecord {
            track_id: "t1".into(),
            name: Some("Song".into()),
            artists: vec!["B".into(), "A".into(), "B".into()],
            album: None,
            release_date: None,
            popularity: 0,
            explicit: false,
            duration_ms: 198_000,
            duration: "3:18".into(),
        };
        assert_eq!(record.key_field(), "track_id");
        assert_eq!(record.natural_key(), "t1");
        let doc = record.to_document().unwrap();
        assert_eq!(doc["artists"], json!(["B", "A", "B"]));
        assert_eq!(doc["duration"], json!("3:18"));
    }
}
