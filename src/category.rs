//! Video category classification.
//!
//! The code → label table lives in `data/categories.toml` and is embedded at
//! compile time so every pipeline reads the same versioned asset.

use crate::constants::UNKNOWN_CATEGORY;
use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const CATEGORY_TABLE: &str = include_str!("../data/categories.toml");

#[derive(Debug, Deserialize)]
struct CategoryTable {
    version: u32,
    categories: BTreeMap<String, String>,
}

/// Immutable mapping from category code to human-readable label.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    version: u32,
    labels: BTreeMap<String, String>,
}

impl CategoryMap {
    /// Parse the embedded category table.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(CATEGORY_TABLE)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let table: CategoryTable = toml::from_str(content)?;
        Ok(Self {
            version: table.version,
            labels: table.categories,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Label for a textual code, `"Unknown"` when unmapped or blank.
    pub fn label_for_str(&self, code: &str) -> &str {
        self.labels
            .get(code.trim())
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    /// Label for a code as it arrives in a raw item: string, number, or absent.
    pub fn label_for(&self, code: Option<&Value>) -> &str {
        match code.and_then(code_text) {
            Some(text) => self.label_for_str(&text),
            None => UNKNOWN_CATEGORY,
        }
    }
}

/// Coerce a raw code to text; null, booleans and containers have no code.
pub(crate) fn code_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
