use super::{natural_key, Section, Transformer};
use crate::duration::format_millis;
use crate::error::Result;
use crate::record::{OutputRecord, TrackRecord};
use crate::types::RawItem;
use serde_json::Value;

/// Playlist track object → [`TrackRecord`]; tracks carry no category
#[derive(Debug, Default)]
pub struct TrackTransformer;

impl TrackTransformer {
    pub fn new() -> Self {
        Self
    }

    pub fn track_record(&self, item: &RawItem) -> Result<TrackRecord> {
        let track_id = natural_key(item, "id")?;
        let track = Section::root(item);
        let album = track.section("album");

        // Absent duration reads as zero before formatting
        let duration_ms = track.count("duration_ms");

        Ok(TrackRecord {
            track_id,
            name: track.text("name"),
            artists: artist_names(item),
            album: album.text("name"),
            release_date: album.text("release_date"),
            popularity: track.count("popularity"),
            explicit: track.flag("explicit"),
            duration_ms,
            duration: format_millis(duration_ms),
        })
    }
}

fn artist_names(item: &Value) -> Vec<String> {
    item.get("artists")
        .and_then(Value::as_array)
        .map(|artists| {
            artists
                .iter()
                .filter_map(|a| a.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl Transformer for TrackTransformer {
    fn name(&self) -> &'static str {
        "track"
    }

    fn transform_item(&self, item: &RawItem) -> Result<OutputRecord> {
        self.track_record(item).map(OutputRecord::Track)
    }
}
