use crate::domain::model::{PartIdentifier, PartSearchResult, SearchOutcome};
use crate::domain::ports::PartSearch;
use crate::utils::error::{PricerError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.mouser.com/api/v1/search/partnumber";
pub const DEFAULT_SEARCH_OPTION: &str = "Exact";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SearchRequest<'a> {
    search_by_part_request: SearchByPartRequest<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchByPartRequest<'a> {
    mouser_part_number: &'a str,
    part_search_options: &'a str,
}

/// Mouser part-number search client.
pub struct MouserClient {
    client: Client,
    endpoint: String,
    api_key: String,
    search_option: String,
    timeout: Option<Duration>,
}

impl MouserClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            search_option: DEFAULT_SEARCH_OPTION.to_string(),
            timeout: None,
        }
    }

    pub fn with_search_option(mut self, option: impl Into<String>) -> Self {
        self.search_option = option.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// 空回應視為被限流：null、空值，或只有 Errors 沒有 SearchResults
fn looks_rate_limited(body: &serde_json::Value) -> bool {
    match body {
        serde_json::Value::Null | serde_json::Value::Bool(false) => true,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::Object(map) if map.is_empty() => true,
        serde_json::Value::Object(map) => {
            let no_results = map.get("SearchResults").map_or(true, |v| v.is_null());
            let has_errors = map
                .get("Errors")
                .and_then(|e| e.as_array())
                .is_some_and(|e| !e.is_empty());
            no_results && has_errors
        }
        _ => false,
    }
}

#[async_trait]
impl PartSearch for MouserClient {
    async fn search(&self, part: &PartIdentifier) -> Result<SearchOutcome> {
        let payload = SearchRequest {
            search_by_part_request: SearchByPartRequest {
                mouser_part_number: part.as_str(),
                part_search_options: &self.search_option,
            },
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .query(&[("apiKey", self.api_key.as_str())])
            .json(&payload);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        // reqwest 錯誤訊息含完整 URL（含 apiKey），先移除
        let response = request
            .send()
            .await
            .map_err(|e| PricerError::ApiError(e.without_url()))?;
        let status = response.status();
        tracing::debug!("API response status for '{}': {}", part, status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(SearchOutcome::RateLimited);
        }
        if !status.is_success() {
            return Err(PricerError::ApiStatusError {
                part: part.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PricerError::ApiError(e.without_url()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(SearchOutcome::RateLimited);
        }

        let body: serde_json::Value = serde_json::from_slice(&bytes)?;
        if looks_rate_limited(&body) {
            tracing::debug!("Empty search result for '{}': {}", part, body);
            return Ok(SearchOutcome::RateLimited);
        }

        Ok(SearchOutcome::Found(PartSearchResult::new(body)))
    }
}
