//! Web evidence search client
//!
//! Fetches ranked source snippets for a claim from a hosted search API.
//! Calls are token-bucket rate limited (the search service throttles
//! aggressive clients) and retried on transient failures. Result content is
//! trimmed before it is handed to the structuring engine so a single long
//! article cannot crowd the fact-check context.

use crate::models::Evidence;
use crate::types::{EvidenceSearch, ServiceError};
use crate::utils::retry::retry_transient;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use serde_json::json;
use std::num::NonZeroU32;
use std::time::Duration;

/// Requests per second against the search API
const SEARCH_RATE_PER_SECOND: u32 = 2;
/// Search result content is trimmed to this many chars
const CONTENT_TRIM_CHARS: usize = 3500;
const SEARCH_RETRIES: u32 = 3;
const SEARCH_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    published_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Web-search API client
pub struct WebSearchClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_results: usize,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl WebSearchClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        max_results: usize,
    ) -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(clipcheck_common::config::get_user_agent())
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let rate_limiter = RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(SEARCH_RATE_PER_SECOND).expect("rate is non-zero"),
        ));

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            max_results: max_results.max(1),
            rate_limiter,
        })
    }

    fn evidence_from_result(result: SearchResult) -> Evidence {
        let mut text = result.content;
        if let Some((idx, _)) = text.char_indices().nth(CONTENT_TRIM_CHARS) {
            text.truncate(idx);
            text.push_str("...");
        }
        Evidence {
            source: if result.url.is_empty() {
                result.title
            } else {
                result.url
            },
            timestamp: result.published_date,
            text,
        }
    }
}

#[async_trait::async_trait]
impl EvidenceSearch for WebSearchClient {
    async fn search(&self, claim_text: &str) -> Result<Vec<Evidence>, ServiceError> {
        // Wait for a rate-limit permit before every attempt
        self.rate_limiter.until_ready().await;

        let url = format!("{}/search", self.base_url);
        let body = json!({
            "query": claim_text,
            "max_results": self.max_results,
            "search_depth": "basic",
            "include_answer": false,
            "include_raw_content": false,
            "include_images": false,
        });

        let response: SearchResponse = retry_transient(
            "web search",
            SEARCH_RETRIES,
            SEARCH_RETRY_BASE_DELAY,
            || async {
                let response = self
                    .http_client
                    .post(&url)
                    .header("x-api-key", &self.api_key)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| ServiceError::Network(e.to_string()))?;

                let status = response.status();
                if status.as_u16() == 429 {
                    return Err(ServiceError::RateLimited);
                }
                if !status.is_success() {
                    let message = response.text().await.unwrap_or_default();
                    return Err(ServiceError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }
                response
                    .json()
                    .await
                    .map_err(|e| ServiceError::Parse(e.to_string()))
            },
        )
        .await?;

        tracing::debug!(
            query = %claim_text.chars().take(60).collect::<String>(),
            results = response.results.len(),
            "Web search complete"
        );

        Ok(response
            .results
            .into_iter()
            .map(Self::evidence_from_result)
            .collect())
    }
}
