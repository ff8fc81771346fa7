use super::{natural_key, Section, Transformer};
use crate::category::CategoryMap;
use crate::duration::parse_iso_duration;
use crate::error::Result;
use crate::record::{OutputRecord, VideoRecord};
use crate::types::RawItem;
use std::sync::Arc;

/// Trending video item → [`VideoRecord`], classified through the shared category map
pub struct VideoTransformer {
    categories: Arc<CategoryMap>,
}

impl VideoTransformer {
    pub fn new(categories: Arc<CategoryMap>) -> Self {
        Self { categories }
    }

    pub fn video_record(&self, item: &RawItem) -> Result<VideoRecord> {
        let video_id = natural_key(item, "id")?;
        let snippet = Section::of(item, "snippet");
        let statistics = Section::of(item, "statistics");
        let details = Section::of(item, "contentDetails");

        let duration = parse_iso_duration(details.str("duration"));

        Ok(VideoRecord {
            video_id,
            title: snippet.text("title"),
            channel: snippet.text("channelTitle"),
            category_id: snippet.text("categoryId"),
            category_title: self.categories.label_for(snippet.get("categoryId")).to_string(),
            view_count: statistics.count("viewCount"),
            like_count: statistics.count("likeCount"),
            comment_count: statistics.count("commentCount"),
            duration_seconds: duration.seconds(),
        })
    }
}

impl Transformer for VideoTransformer {
    fn name(&self) -> &'static str {
        "video"
    }

    fn transform_item(&self, item: &RawItem) -> Result<OutputRecord> {
        self.video_record(item).map(OutputRecord::Video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transformer() -> VideoTransformer {
        VideoTransformer::new(Arc::new(CategoryMap::builtin().unwrap()))
    }

    #[test]
    fn transforms_full_item() {
        let item = json!({
            "id": "v1",
            "snippet": {"title": "T", "channelTitle": "C", "categoryId": "10"},
            "statistics": {"viewCount": "100"},
            "contentDetails": {"duration": "PT3M"}
        });
        let record = transformer().video_record(&item).unwrap();
        assert_eq!(record.video_id, "v1");
        assert_eq!(record.title.as_deref(), Some("T"));
        assert_eq!(record.channel.as_deref(), Some("C"));
        assert_eq!(record.category_id.as_deref(), Some("10"));
        assert_eq!(record.category_title, "Music");
        assert_eq!(record.view_count, 100);
        assert_eq!(record.like_count, 0);
        assert_eq!(record.comment_count, 0);
        assert_eq!(record.duration_seconds, 180);
    }

    #[test]
    fn bare_item_gets_defaults() {
        let record = transformer().video_record(&json!({"id": "v2"})).unwrap();
        assert_eq!(record.title, None);
        assert_eq!(record.category_id, None);
        assert_eq!(record.category_title, "Unknown");
        assert_eq!(record.view_count, 0);
        assert_eq!(record.duration_seconds, 0);
    }

    #[test]
    fn numeric_category_code_is_coerced() {
        let item = json!({"id": "v3", "snippet": {"categoryId": 20}});
        let record = transformer().video_record(&item).unwrap();
        assert_eq!(record.category_id.as_deref(), Some("20"));
        assert_eq!(record.category_title, "Gaming");
    }

    #[test]
    fn malformed_duration_is_zero() {
        let item = json!({"id": "v4", "contentDetails": {"duration": "three minutes"}});
        assert_eq!(transformer().video_record(&item).unwrap().duration_seconds, 0);
    }

    #[test]
    fn drops_items_without_id_and_keeps_order() {
        let items = vec![
            json!({"id": "a"}),
            json!({"snippet": {"title": "no id"}}),
            json!({"id": ""}),
            json!({"id": "b"}),
        ];
        let output = transformer().transform(&items);
        assert_eq!(output.dropped, 2);
        let keys: Vec<_> = output
            .records
            .iter()
            .map(|r| match r {
                OutputRecord::Video(v) => v.video_id.clone(),
                OutputRecord::Track(t) => t.track_id.clone(),
            })
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
