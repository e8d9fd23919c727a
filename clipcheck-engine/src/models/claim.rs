//! Claims, evidence, and per-claim fact-check results

use serde::{Deserialize, Serialize};

/// Where a claim was asserted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClaimSource {
    /// Spoken or shown inside the video itself
    #[default]
    Video,
    /// Asserted in the uploader's caption text
    Caption,
    /// Asserted in both
    Both,
}

/// Rough category of the checkable assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClaimKind {
    Date,
    Person,
    Place,
    Event,
    Number,
    #[default]
    Other,
}

/// A single evidence snippet, either grounding a claim in the video/caption
/// or retrieved from web search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Where the snippet came from ("Video", "Caption", or a URL)
    pub source: String,
    /// Optional timestamp (in-video position or publication date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// The snippet text
    pub text: String,
}

/// A discrete, checkable factual assertion extracted from the video
///
/// Claims are produced once per job and never mutated. Each claim maps to at
/// most one FactCheckResult, matched by position in the claim list (claim
/// text is free-form and not guaranteed unique).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Claim text
    pub text: String,
    /// Extraction confidence in [0, 100], clamped on construction
    pub confidence: f64,
    /// Where the claim was asserted
    #[serde(default)]
    pub source: ClaimSource,
    /// Rough claim category
    #[serde(default)]
    pub kind: ClaimKind,
    /// Grounding evidence from the video/caption, in extraction order
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

impl Claim {
    /// Create a claim with a clamped confidence score
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence: clamp_score(confidence),
            source: ClaimSource::default(),
            kind: ClaimKind::default(),
            evidence: Vec::new(),
        }
    }

    /// Clamp scores after deserializing an external payload
    pub fn normalized(mut self) -> Self {
        self.confidence = clamp_score(self.confidence);
        self
    }
}

/// Structuring-engine output: summaries plus the extracted claim list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimExtraction {
    /// Summary of the video content
    #[serde(default)]
    pub video_summary: String,
    /// Summary of the caption (empty when no caption was supplied)
    #[serde(default)]
    pub caption_summary: String,
    /// Combined summary used in the final report
    #[serde(default)]
    pub combined_summary: String,
    /// Extracted claims in extraction order
    #[serde(default)]
    pub claims: Vec<Claim>,
}

impl ClaimExtraction {
    /// The summary shown to the user: combined when present, video otherwise
    pub fn display_summary(&self) -> &str {
        if self.combined_summary.is_empty() {
            &self.video_summary
        } else {
            &self.combined_summary
        }
    }
}

/// A supporting citation attached to a fact-check verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Source URL
    #[serde(default)]
    pub url: String,
    /// Short quote supporting the verdict
    #[serde(default)]
    pub supporting_text: String,
}

/// Fact-check verdict for one claim
///
/// `verdict` is a free-form label stored verbatim; the fusion layer
/// classifies it separately and never rewrites it. A confidence of 0 means
/// "not computed", and such results are excluded from the aggregate
/// confidence average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckResult {
    /// Verdict label as the structuring engine produced it
    pub verdict: String,
    /// Confidence in [0, 100]; 0 means not computed
    #[serde(default)]
    pub confidence: f64,
    /// Why the verdict was reached
    #[serde(default)]
    pub explanation: String,
    /// Corrected information, when the claim is wrong
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<String>,
    /// Note asking the user to verify manually
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_note: Option<String>,
    /// Supporting citations
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl FactCheckResult {
    /// Construct a result with a clamped confidence
    pub fn new(verdict: impl Into<String>, confidence: f64, explanation: impl Into<String>) -> Self {
        Self {
            verdict: verdict.into(),
            confidence: clamp_score(confidence),
            explanation: explanation.into(),
            correction: None,
            verify_note: None,
            citations: Vec::new(),
        }
    }

    /// The result produced for a claim with no usable web sources
    pub fn unclear_no_sources() -> Self {
        Self::new("unclear", 0.0, "No web sources found for this claim.")
    }

    /// Clamp scores after deserializing an external payload
    pub fn normalized(mut self) -> Self {
        self.confidence = clamp_score(self.confidence);
        self
    }
}

/// Clamp a percentage-range score into [0, 100], mapping non-finite input to 0
pub fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
