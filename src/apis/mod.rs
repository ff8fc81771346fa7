pub mod spotify;
pub mod youtube;

use crate::constants::MAX_PAGE_SIZE;
use crate::error::{EtlError, Result};
use crate::types::RawItem;
use serde_json::Value;
use std::time::Duration;

/// Build the HTTP client shared by every extractor for the whole run.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("media_etl/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Clamp a requested page size to what the APIs accept.
pub fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(1, MAX_PAGE_SIZE)
}

/// `items` array of a list response; absent or non-array means no items.
pub(crate) fn items_of(body: &Value) -> Vec<RawItem> {
    body.get("items")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Turn a non-success response into an API error, preferring the API's own message.
pub(crate) async fn error_for_status(api: &str, resp: reqwest::Response) -> EtlError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    EtlError::Api {
        api: api.to_string(),
        status,
        message: api_error_message(&body),
    }
}

pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty response body".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        })
}
