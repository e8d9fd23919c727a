//! Language-model service client
//!
//! Backs the structuring engine seam: claim extraction, per-claim
//! fact-checking, timeline judgment, and the multimodal AI-generation
//! judgment. Every call asks the model for strict JSON and converts the
//! response into the data model immediately; prompt text and parsing quirks
//! stay inside this file.

use crate::models::{
    Citation, Claim, ClaimExtraction, ClaimKind, ClaimSource, Evidence, FactCheckResult,
    ModelTrustSignal, TimelineSignal, Understanding, VideoMetadata,
};
use crate::types::{ServiceError, StructuringEngine};
use crate::utils::json_extract::parse_json_response;
use base64::Engine as _;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Understanding text is trimmed to this many chars before structuring
const MAX_VIDEO_TEXT_CHARS: usize = 3200;
/// Understanding context passed to the multimodal judgment is trimmed harder
const MAX_JUDGMENT_CONTEXT_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct EvidenceWire {
    #[serde(default)]
    source: String,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ClaimWire {
    #[serde(default)]
    claim: String,
    #[serde(default)]
    claim_source: String,
    #[serde(default)]
    claim_type: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    evidence: Vec<EvidenceWire>,
}

#[derive(Debug, Deserialize)]
struct StructureWire {
    #[serde(default)]
    video_summary: String,
    #[serde(default)]
    caption_summary: String,
    #[serde(default)]
    combined_summary: String,
    #[serde(default)]
    claims: Vec<ClaimWire>,
}

#[derive(Debug, Deserialize)]
struct FactCheckWire {
    #[serde(default)]
    verdict: String,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    correct_information: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    verify_manually: Option<String>,
    #[serde(default)]
    citations: Vec<Citation>,
}

#[derive(Debug, Deserialize)]
struct JudgmentWire {
    #[serde(default)]
    is_ai: bool,
    #[serde(default)]
    trust_score: f64,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    note: String,
}

/// Language-model API client
pub struct LanguageModelClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    text_model: String,
    video_model: String,
}

impl LanguageModelClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        text_model: impl Into<String>,
        video_model: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(clipcheck_common::config::get_user_agent())
            .timeout(Duration::from_secs(180))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            text_model: text_model.into(),
            video_model: video_model.into(),
        })
    }

    /// One text-model generation call
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        self.generate_request(json!({
            "model": self.text_model,
            "prompt": prompt,
        }))
        .await
    }

    /// One multimodal generation call with inline video bytes
    async fn generate_with_media(&self, prompt: &str, video: &[u8]) -> Result<String, ServiceError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(video);
        self.generate_request(json!({
            "model": self.video_model,
            "prompt": prompt,
            "media": [{ "mime_type": "video/mp4", "data": encoded }],
        }))
        .await
    }

    async fn generate_request(&self, body: serde_json::Value) -> Result<String, ServiceError> {
        let url = format!("{}/generate", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
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

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))?;
        Ok(body.text)
    }

    fn structure_prompt(video_text: &str, caption: &str) -> String {
        format!(
            r#"
Return ONLY JSON.

{{
  "video_summary": "",
  "caption_summary": "",
  "combined_summary": "",
  "claims": [
    {{
      "claim": "",
      "claim_source": "video/caption/both",
      "claim_type": "date/person/place/event/number/other",
      "confidence": 0-100,
      "evidence": [{{"source":"Video/Caption","text":""}}]
    }}
  ]
}}

Rules:
- If caption is empty, set caption_summary="" and claim_source should be "video".
- Extract 8-12 CHECKABLE claims when possible. Prefer factual / testable claims.
- confidence is how clearly the claim is asserted by the content.
- Evidence must be short and directly copied/summarized from the input.
- No markdown.

CAPTION:
{caption}

VIDEO_TEXT:
{video_text}
"#
        )
    }

    fn fact_check_prompt(claim: &Claim, sources_json: &str) -> String {
        format!(
            r#"
Return ONLY JSON.

{{
  "verdict": "true/false/mixed/unclear",
  "confidence": 0-100,
  "correct_information": "",
  "explanation": "",
  "verify_manually": null,
  "citations": [{{"url":"", "supporting_text":""}}]
}}

Rules:
- Use ONLY the SOURCES below.
- If SOURCES do not support the claim, verdict MUST be "unclear".
- If SOURCES contradict each other, verdict="mixed".
- Provide 1-3 citations. supporting_text must be short.
- No markdown.

CLAIM:
{claim_text}

SOURCES:
{sources}
"#,
            claim_text = claim.text,
            sources = sources_json,
        )
    }

    fn timeline_prompt(scene_data: &str, posted_date: &str) -> String {
        format!(
            r#"
Return ONLY JSON.

{{
  "posted_date": "{posted_date}",
  "likely_event_year": null,
  "time_relation": "same_year/past_years/future/unclear",
  "timeline_mismatch_risk_score": 0-100,
  "why": "",
  "what_is_correct": null
}}

Goal:
- If the content implies an event year far from posted_date, flag it.
- If no explicit year/date clues, use unclear and a low risk score.

SCENE_DATA:
{scene_data}
"#
        )
    }

    fn judgment_prompt(metadata_json: &str, context: &str) -> String {
        format!(
            r#"
You are a misinformation detection expert.

METADATA: {metadata_json}
Video Analysis Context: {context}

TASK:
1. Cross-reference visual and audio elements for consistency
2. Look for visual-audio inconsistency (e.g., environment doesn't match claims)
3. Detect signs of AI generation or deepfake manipulation
4. Check whether the provenance metadata indicates AI generation

Return EXACTLY this JSON structure:
{{ "is_ai": bool, "trust_score": 0-100, "confidence": 0-100, "note": "string" }}
"#
        )
    }

    fn parse_claim_source(raw: &str) -> ClaimSource {
        match raw.trim().to_ascii_lowercase().as_str() {
            "caption" => ClaimSource::Caption,
            "both" => ClaimSource::Both,
            _ => ClaimSource::Video,
        }
    }

    fn parse_claim_kind(raw: &str) -> ClaimKind {
        match raw.trim().to_ascii_lowercase().as_str() {
            "date" => ClaimKind::Date,
            "person" => ClaimKind::Person,
            "place" => ClaimKind::Place,
            "event" => ClaimKind::Event,
            "number" => ClaimKind::Number,
            _ => ClaimKind::Other,
        }
    }

    fn claim_from_wire(wire: ClaimWire) -> Claim {
        Claim {
            text: wire.claim.trim().to_string(),
            confidence: wire.confidence,
            source: Self::parse_claim_source(&wire.claim_source),
            kind: Self::parse_claim_kind(&wire.claim_type),
            evidence: wire
                .evidence
                .into_iter()
                .map(|e| Evidence {
                    source: e.source,
                    timestamp: e.timestamp,
                    text: e.text,
                })
                .collect(),
        }
        .normalized()
    }

    fn truncated(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }
}

#[async_trait::async_trait]
impl StructuringEngine for LanguageModelClient {
    async fn extract_claims(
        &self,
        understanding: &Understanding,
        caption: Option<&str>,
    ) -> Result<ClaimExtraction, ServiceError> {
        let video_text = understanding.combined_text();
        let prompt = Self::structure_prompt(
            Self::truncated(&video_text, MAX_VIDEO_TEXT_CHARS),
            caption.unwrap_or(""),
        );

        let text = self.generate(&prompt).await?;
        let wire: StructureWire = parse_json_response(&text)?;

        let extraction = ClaimExtraction {
            video_summary: wire.video_summary,
            caption_summary: wire.caption_summary,
            combined_summary: wire.combined_summary,
            claims: wire
                .claims
                .into_iter()
                .map(Self::claim_from_wire)
                .filter(|claim| !claim.text.is_empty())
                .collect(),
        };

        tracing::info!(claims = extraction.claims.len(), "Claims structured");
        Ok(extraction)
    }

    async fn fact_check(
        &self,
        claim: &Claim,
        evidence: &[Evidence],
    ) -> Result<FactCheckResult, ServiceError> {
        let sources_json =
            serde_json::to_string(evidence).map_err(|e| ServiceError::Internal(e.to_string()))?;
        let prompt = Self::fact_check_prompt(claim, &sources_json);

        let text = self.generate(&prompt).await?;
        let wire: FactCheckWire = parse_json_response(&text)?;

        let verdict = if wire.verdict.trim().is_empty() {
            "unclear".to_string()
        } else {
            wire.verdict
        };

        Ok(FactCheckResult {
            verdict,
            confidence: wire.confidence,
            explanation: wire.explanation,
            correction: Some(wire.correct_information)
                .filter(|correction| !correction.trim().is_empty()),
            verify_note: wire.verify_manually.filter(|note| !note.trim().is_empty()),
            citations: wire.citations,
        }
        .normalized())
    }

    async fn timeline_check(
        &self,
        understanding: &Understanding,
        posted_date: Option<NaiveDate>,
    ) -> Result<TimelineSignal, ServiceError> {
        let posted = posted_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let scene_data = understanding.combined_text();
        let prompt = Self::timeline_prompt(
            Self::truncated(&scene_data, MAX_VIDEO_TEXT_CHARS),
            &posted,
        );

        let text = self.generate(&prompt).await?;
        let mut signal: TimelineSignal = parse_json_response(&text)?;
        signal.posted_date = signal.posted_date.filter(|date| !date.trim().is_empty());
        Ok(signal.normalized())
    }

    async fn ai_judgment(
        &self,
        video: &[u8],
        metadata: Option<&VideoMetadata>,
        context: Option<&Understanding>,
    ) -> Result<ModelTrustSignal, ServiceError> {
        let metadata_json = match metadata {
            Some(metadata) => serde_json::to_string_pretty(metadata)
                .map_err(|e| ServiceError::Internal(e.to_string()))?,
            None => "{}".to_string(),
        };
        let context_text = context.map(Understanding::combined_text).unwrap_or_default();
        let prompt = Self::judgment_prompt(
            &metadata_json,
            Self::truncated(&context_text, MAX_JUDGMENT_CONTEXT_CHARS),
        );

        let text = self.generate_with_media(&prompt, video).await?;
        let wire: JudgmentWire = parse_json_response(&text)?;

        Ok(ModelTrustSignal {
            is_ai: wire.is_ai,
            trust_score: wire.trust_score,
            confidence: wire.confidence,
            note: wire.note,
        }
        .normalized())
    }
}
