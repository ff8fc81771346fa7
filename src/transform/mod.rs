pub mod track;
pub mod video;

pub use track::TrackTransformer;
pub use video::VideoTransformer;

use crate::category::code_text;
use crate::error::{EtlError, Result};
use crate::record::{Document, OutputRecord};
use crate::types::RawItem;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Records produced from one page of raw items
#[derive(Debug, Default)]
pub struct TransformOutput {
    pub records: Vec<OutputRecord>,
    pub dropped: usize,
}

/// Maps raw API items to flat output records
pub trait Transformer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Transform a single item; `MissingField` means the item has no natural key.
    fn transform_item(&self, item: &RawItem) -> Result<OutputRecord>;

    /// Transform a page in input order, dropping items that cannot be keyed.
    fn transform(&self, items: &[RawItem]) -> TransformOutput {
        let mut output = TransformOutput {
            records: Vec::with_capacity(items.len()),
            dropped: 0,
        };
        for (i, item) in items.iter().enumerate() {
            match self.transform_item(item) {
                Ok(record) => {
                    debug!("Transformed {} item {} ({})", self.name(), i, record.natural_key());
                    output.records.push(record);
                }
                Err(e) => {
                    warn!("Dropping {} item {}: {}", self.name(), i, e);
                    output.dropped += 1;
                }
            }
        }
        output
    }
}

/// Nested sub-mapping of a raw item; a missing one reads as empty.
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> Section<'a> {
    pub fn of(item: &'a Value, key: &str) -> Self {
        Self {
            fields: item.get(key).and_then(Value::as_object),
        }
    }

    pub fn root(item: &'a Value) -> Self {
        Self {
            fields: item.as_object(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.and_then(|m| m.get(field))
    }

    pub fn section(&self, field: &str) -> Section<'a> {
        Section {
            fields: self.get(field).and_then(Value::as_object),
        }
    }

    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).and_then(code_text)
    }

    pub fn str(&self, field: &str) -> Option<&'a str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn flag(&self, field: &str) -> bool {
        self.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Non-negative count; statistics arrive as numbers or numeric strings.
    pub fn count(&self, field: &str) -> u64 {
        match self.get(field) {
            None | Some(Value::Null) => 0,
            Some(value) => parse_count(value).unwrap_or_else(|| {
                warn!("Non-numeric value for '{}': {}, using 0", field, value);
                0
            }),
        }
    }
}

fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Natural key of a raw item; absent or blank is a hard error for that item.
pub fn natural_key(item: &Value, field: &str) -> Result<String> {
    Section::root(item)
        .text(field)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EtlError::MissingField(field.to_string()))
}
