use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, SearchError};
use crate::search::RawSearchResult;

/// The backend answers either with a bare array or with its `MessagesResponse` wrapper.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Batch(Vec<RawSearchResult>),
    Messages { messages: Vec<RawSearchResult> },
}

pub struct SearchClient {
    client: reqwest::Client,
    base_url: String,
    search_path: String,
}

impl SearchClient {
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = dotenv::var("CHOIR_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let search_path = dotenv::var("CHOIR_SEARCH_PATH")
            .unwrap_or_else(|_| "/api/resonance_search".to_string());
        let timeout_secs = match dotenv::var("CHOIR_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("CHOIR_TIMEOUT_SECS is not a number: {}", raw))?,
            Err(_) => 30,
        };

        Self::new(base_url, search_path, Duration::from_secs(timeout_secs))
    }

    pub fn new(
        base_url: impl Into<String>,
        search_path: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            search_path: search_path.into(),
        })
    }

    /// Join base URL and search path with exactly one slash between them.
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.search_path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Post a query and return the raw batch. Any non-2xx status is a request failure.
    pub async fn search(&self, input_text: &str) -> Result<Vec<RawSearchResult>> {
        let body = serde_json::json!({ "input_text": input_text });
        let resp = self.client.post(self.endpoint()).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "search backend returned an error");
            return Err(SearchError::RequestFailure {
                status: status.as_u16(),
            });
        }

        let text = resp.text().await?;
        let batch = decode_batch(&text)?;
        debug!(count = batch.len(), "search response received");
        Ok(batch)
    }
}

pub fn decode_batch(text: &str) -> Result<Vec<RawSearchResult>> {
    let response: SearchResponse = serde_json::from_str(text)?;
    Ok(match response {
        SearchResponse::Batch(batch) => batch,
        SearchResponse::Messages { messages } => messages,
    })
}
