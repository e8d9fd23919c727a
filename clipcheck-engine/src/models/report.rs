//! Final report artifacts
//!
//! A report is created once, at the end of the pipeline, and never mutated
//! after return. Optional fields distinguish "analysis not computed" from a
//! computed low/zero score; the numeric risk fields always carry a value
//! (0 when the corresponding analysis was unavailable).

use crate::models::claim::{Citation, Claim, FactCheckResult};
use crate::models::signals::{
    ModelTrustSignal, ProvenanceSignal, SpliceSignal, TimelineSignal, VideoMetadata,
};
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Overall fact-check verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Real,
    Misleading,
    Fake,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Real => "REAL",
            Verdict::Misleading => "MISLEADING",
            Verdict::Fake => "FAKE",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fused verdict and score set for the fact-check track
#[derive(Debug, Clone, Serialize)]
pub struct VerdictBlock {
    /// Overall verdict
    pub verdict: Verdict,
    /// Fusion's confidence in its own verdict, 0-100
    pub confidence_percent: u8,
    /// Verdict plus the dominant contributing signal, one line
    pub one_line_label: String,
    /// Misinformation risk, 0-100 (0 when no fact-check produced a negative)
    pub misinformation_risk_score: f64,
    /// Splice risk pass-through, 0-100 (0 when the analysis was unavailable)
    pub splice_risk_score: f64,
    /// Timeline-mismatch risk pass-through, 0-100 (0 when unavailable)
    pub timeline_mismatch_risk_score: f64,
    /// Mean confidence over produced fact-check results with confidence > 0
    pub avg_factcheck_confidence: f64,
    /// Count of negative-classified fact-check results
    pub negative_claims: usize,
    /// Count of ambiguous fact-check results
    pub ambiguous_claims: usize,
}

/// A correction attached to a claim that checked out wrong
#[derive(Debug, Clone, Serialize)]
pub struct Correction {
    /// The claim as made in the video/caption
    pub incorrect_claim: String,
    /// What the sources say instead
    pub correct_information: String,
    /// Confidence of the underlying fact-check, 0-100
    pub confidence: f64,
    /// Why the claim is wrong
    pub explanation: String,
    /// Supporting citations
    pub citations: Vec<Citation>,
}

/// Final report for the fact-check track
///
/// `fact_checks` is index-aligned with `claims`; a `None` entry means the
/// check for that claim failed, which is distinct from a produced result
/// with a low score.
#[derive(Debug, Clone, Serialize)]
pub struct FactCheckReport {
    /// Job UUID this report answers
    pub job_id: Uuid,
    /// Fused verdict and scores
    #[serde(rename = "final")]
    pub final_verdict: VerdictBlock,
    /// Content summary (combined video + caption, trimmed)
    pub summary: String,
    /// Short human-readable reasons behind the verdict
    pub top_reasons: Vec<String>,
    /// Extracted claims, in extraction order
    pub claims: Vec<Claim>,
    /// Per-claim results, aligned by index with `claims`
    pub fact_checks: Vec<Option<FactCheckResult>>,
    /// Corrections for claims that checked out wrong
    pub corrections: Vec<Correction>,
    /// Splice finding; absent when the analysis failed or was skipped
    pub splice: Option<SpliceSignal>,
    /// Timeline finding; absent when the analysis failed or was skipped
    pub timeline: Option<TimelineSignal>,
    /// Container metadata; absent when the probe was unavailable
    pub metadata: Option<VideoMetadata>,
    /// Embedded-provenance finding; absent without a manifest
    pub provenance: Option<ProvenanceSignal>,
    /// Model AI-generation judgment; absent when the pass failed
    pub model_trust: Option<ModelTrustSignal>,
    /// When the report was assembled
    pub generated_at: DateTime<Utc>,
}

/// Final report for the AI-detection track
///
/// The stored model signal is rendered under both its current name and the
/// legacy `synthid` / `detection_methods.synthid_analysis` names at
/// serialization time; there is exactly one source of truth in memory.
#[derive(Debug, Clone)]
pub struct DetectionReport {
    /// Job UUID this report answers
    pub job_id: Uuid,
    /// OR of provenance markers and the model judgment
    pub is_ai_generated: bool,
    /// Model trust score pass-through, 0 when the model was unavailable
    pub trust_score: f64,
    /// Model confidence pass-through, 0 when the model was unavailable
    pub confidence: f64,
    /// Embedded-provenance finding; absent without a manifest
    pub provenance: Option<ProvenanceSignal>,
    /// Model AI-generation judgment; absent when the pass failed
    pub model_trust: Option<ModelTrustSignal>,
    /// Container metadata; absent when the probe was unavailable
    pub metadata: Option<VideoMetadata>,
    /// One-line status note
    pub note: String,
    /// When the report was assembled
    pub generated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct C2paMethod<'a> {
    detected: bool,
    data: Option<&'a serde_json::Value>,
}

#[derive(Serialize)]
struct DetectionMethods<'a> {
    c2pa_metadata: C2paMethod<'a>,
    synthid_analysis: &'a Option<ModelTrustSignal>,
}

impl Serialize for DetectionReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let methods = DetectionMethods {
            c2pa_metadata: C2paMethod {
                detected: self
                    .provenance
                    .as_ref()
                    .map(|p| p.ai_markers_present)
                    .unwrap_or(false),
                data: self.provenance.as_ref().map(|p| &p.manifest),
            },
            synthid_analysis: &self.model_trust,
        };

        let mut state = serializer.serialize_struct("DetectionReport", 10)?;
        state.serialize_field("job_id", &self.job_id)?;
        state.serialize_field("is_ai_generated", &self.is_ai_generated)?;
        state.serialize_field("trust_score", &self.trust_score)?;
        state.serialize_field("confidence", &self.confidence)?;
        state.serialize_field("provenance", &self.provenance)?;
        // Legacy wire names, both rendered from the single stored signal
        state.serialize_field("synthid", &self.model_trust)?;
        state.serialize_field("detection_methods", &methods)?;
        state.serialize_field("metadata", &self.metadata)?;
        state.serialize_field("note", &self.note)?;
        state.serialize_field("generated_at", &self.generated_at)?;
        state.end()
    }
}

/// The terminal artifact returned to the caller, one shape per track
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FinalReport {
    FactCheck(Box<FactCheckReport>),
    AiDetection(Box<DetectionReport>),
}

impl FinalReport {
    /// The fact-check report, when this job ran that track
    pub fn as_fact_check(&self) -> Option<&FactCheckReport> {
        match self {
            FinalReport::FactCheck(report) => Some(report),
            FinalReport::AiDetection(_) => None,
        }
    }

    /// The detection report, when this job ran that track
    pub fn as_detection(&self) -> Option<&DetectionReport> {
        match self {
            FinalReport::FactCheck(_) => None,
            FinalReport::AiDetection(report) => Some(report),
        }
    }
}
