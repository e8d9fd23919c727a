//! Video-understanding service client
//!
//! Drives a hosted video-understanding API through its three-step flow:
//! upload the raw bytes as an asset, poll until the service has indexed it,
//! then run prompt-based analysis against the indexed asset. The same flow
//! backs both the transcript/scene extraction pass and the splice pass.

use crate::models::{SpliceSignal, Understanding};
use crate::types::{ServiceError, VideoUnderstanding};
use crate::utils::json_extract::parse_json_response;
use crate::utils::retry::retry_transient;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const ASSET_POLL_INTERVAL: Duration = Duration::from_millis(1500);
const UPLOAD_RETRIES: u32 = 4;
const UPLOAD_RETRY_BASE_DELAY: Duration = Duration::from_millis(1500);
const ANALYZE_TEMPERATURE: f64 = 0.2;

/// Prompt for the transcript / on-screen text / scene summary pass
const UNDERSTANDING_PROMPT: &str = "\
Return under EXACT headings:
TRANSCRIPT:
VISIBLE_TEXT:
SCENE_SUMMARY:
";

/// Prompt for the context-shift / splice pass
const SPLICE_PROMPT: &str = r#"
Return ONLY JSON:
{
  "has_sudden_shifts": true/false,
  "splice_risk_score": 0-100,
  "summary": ""
}

Rules:
- Ignore normal editing: tip cards, title screens, jump cuts, camera angles, b-roll.
- Give HIGH splice_risk_score only for real context mismatches:
  different locations as same, mismatched time/events, conflicting audio/visuals,
  repurposed footage, conflicting labels.
- Single coherent video with edit cards: keep splice_risk_score low (0-30).
"#;

#[derive(Debug, Deserialize)]
struct AssetResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AssetStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
struct SpliceWire {
    #[serde(default)]
    has_sudden_shifts: bool,
    #[serde(default)]
    splice_risk_score: f64,
    #[serde(default)]
    summary: String,
}

/// Video-understanding API client
pub struct VideoIndexClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
}

impl VideoIndexClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(clipcheck_common::config::get_user_agent())
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            poll_interval: ASSET_POLL_INTERVAL,
        })
    }

    /// Upload and index one video, returning the indexed asset id
    async fn upload_and_index(&self, video: &[u8]) -> Result<String, ServiceError> {
        let url = format!("{}/assets", self.base_url);
        let video = video.to_vec();

        let asset: AssetResponse = retry_transient(
            "asset upload",
            UPLOAD_RETRIES,
            UPLOAD_RETRY_BASE_DELAY,
            || async {
                let response = self
                    .http_client
                    .post(&url)
                    .header("x-api-key", &self.api_key)
                    .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                    .body(video.clone())
                    .send()
                    .await
                    .map_err(|e| ServiceError::Network(e.to_string()))?;
                Self::json_or_error(response).await
            },
        )
        .await?;

        tracing::debug!(asset_id = %asset.id, "Video asset uploaded, waiting for indexing");

        loop {
            let status_url = format!("{}/assets/{}", self.base_url, asset.id);
            let response = self
                .http_client
                .get(&status_url)
                .header("x-api-key", &self.api_key)
                .send()
                .await
                .map_err(|e| ServiceError::Network(e.to_string()))?;
            let status: AssetStatus = Self::json_or_error(response).await?;

            match status.status.as_str() {
                "ready" => {
                    tracing::debug!(asset_id = %asset.id, "Video asset ready");
                    return Ok(asset.id);
                }
                "failed" => {
                    return Err(ServiceError::Internal("asset processing failed".to_string()))
                }
                other => {
                    tracing::trace!(asset_id = %asset.id, status = other, "Asset still indexing");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Run a prompt against an indexed asset
    async fn analyze(&self, asset_id: &str, prompt: &str) -> Result<String, ServiceError> {
        let url = format!("{}/analyze", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&json!({
                "asset_id": asset_id,
                "prompt": prompt,
                "temperature": ANALYZE_TEMPERATURE,
            }))
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let body: AnalyzeResponse = Self::json_or_error(response).await?;
        Ok(body.data.trim().to_string())
    }

    async fn json_or_error<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
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
    }

    /// Split heading-structured analysis text into the understanding model
    fn parse_understanding(text: &str) -> Understanding {
        let transcript = Self::section(text, "TRANSCRIPT:", &["VISIBLE_TEXT:", "SCENE_SUMMARY:"]);
        let on_screen_text = Self::section(text, "VISIBLE_TEXT:", &["SCENE_SUMMARY:", "TRANSCRIPT:"]);
        let scene_block = Self::section(text, "SCENE_SUMMARY:", &["TRANSCRIPT:", "VISIBLE_TEXT:"]);

        Understanding {
            transcript,
            on_screen_text,
            scene_summaries: scene_block
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Text between `heading` and the nearest following heading (or the end)
    fn section(text: &str, heading: &str, other_headings: &[&str]) -> String {
        let Some(start) = text.find(heading) else {
            return String::new();
        };
        let body_start = start + heading.len();
        let body = &text[body_start..];

        let end = other_headings
            .iter()
            .filter_map(|h| body.find(h))
            .min()
            .unwrap_or(body.len());

        body[..end].trim().to_string()
    }
}

#[async_trait::async_trait]
impl VideoUnderstanding for VideoIndexClient {
    async fn understand(&self, video: &[u8]) -> Result<Understanding, ServiceError> {
        let asset_id = self.upload_and_index(video).await?;
        let text = self.analyze(&asset_id, UNDERSTANDING_PROMPT).await?;

        if text.is_empty() {
            return Err(ServiceError::Parse("empty analysis response".to_string()));
        }

        let understanding = Self::parse_understanding(&text);
        tracing::info!(
            transcript_chars = understanding.transcript.len(),
            scenes = understanding.scene_summaries.len(),
            "Video understanding extracted"
        );
        Ok(understanding)
    }

    async fn splice_analysis(
        &self,
        video: &[u8],
        _context: &Understanding,
    ) -> Result<SpliceSignal, ServiceError> {
        let asset_id = self.upload_and_index(video).await?;
        let text = self.analyze(&asset_id, SPLICE_PROMPT).await?;

        let wire: SpliceWire = parse_json_response(&text)?;
        Ok(SpliceSignal {
            has_sudden_shifts: wire.has_sudden_shifts,
            risk_score: wire.splice_risk_score,
            summary: wire.summary,
        }
        .normalized())
    }
}
