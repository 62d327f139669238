//! HTTP client for the job search endpoint.

use crate::error::{RequestError, Result};
use crate::wire::{ErrorBody, RawResponse, SearchEnvelope};
use async_trait::async_trait;
use gurubell_core::{BearerToken, SourceConfig};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};

/// Anything that can fetch the first page of recent jobs.
///
/// The poll scheduler only talks to this trait so tests can script responses.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetch the unfiltered first page of jobs.
    ///
    /// The caller checks the token is non-empty; `BearerToken` enforces it.
    async fn fetch_jobs(&self, token: &BearerToken) -> Result<RawResponse>;
}

/// `JobSource` backed by the real search API.
pub struct GuruClient {
    client: Client,
    search_url: String,
    category_id: u32,
    sort_order: String,
    page: u32,
}

impl GuruClient {
    /// Create a client for the configured endpoint.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RequestError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            search_url: format!("{}/api/search/job", config.base_url.trim_end_matches('/')),
            category_id: config.category_id,
            sort_order: config.sort_order.clone(),
            page: config.page,
        })
    }

    /// Full URL of the search endpoint, without query string.
    #[must_use]
    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    fn query(&self) -> [(&'static str, String); 3] {
        [
            ("Category.Id", self.category_id.to_string()),
            ("SortOrder", self.sort_order.clone()),
            ("Page", self.page.to_string()),
        ]
    }
}

#[async_trait]
impl JobSource for GuruClient {
    async fn fetch_jobs(&self, token: &BearerToken) -> Result<RawResponse> {
        tracing::debug!(url = %self.search_url, "Fetching jobs");

        let response = self
            .client
            .get(&self.search_url)
            .header(AUTHORIZATION, format!("Bearer {}", token.expose()))
            .header(CONTENT_TYPE, "application/json")
            .query(&self.query())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestError::http(
                status.as_u16(),
                error_message(status, &body),
            ));
        }

        let body = response.text().await?;
        let envelope: SearchEnvelope = serde_json::from_str(&body).map_err(|e| {
            RequestError::http(status.as_u16(), format!("malformed response: {e}"))
        })?;

        let raw = RawResponse::from(envelope);
        tracing::debug!(count = raw.results.len(), "Fetched jobs");
        Ok(raw)
    }
}

/// Pick the most useful message out of an error response.
///
/// Prefers the JSON `message` field, then the raw body, then the reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(ErrorBody {
        message: Some(message),
    }) = serde_json::from_str::<ErrorBody>(body)
    {
        if !message.trim().is_empty() {
            return message;
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
}
