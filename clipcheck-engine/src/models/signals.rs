//! Per-phase analysis signals and container metadata

use crate::models::claim::clamp_score;
use serde::{Deserialize, Serialize};

/// Container metadata returned by the metadata probe
///
/// Immutable once fetched. `duration_seconds` is absent when the container
/// reports an unparsable duration, `encoder` when the container says
/// "unknown".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Container format name (e.g. "mov,mp4,m4a,3gp,3g2,mj2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    /// Encoder tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoder: Option<String>,
    /// Container creation-time tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    /// Recording device tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Raw embedded provenance manifest, when the container carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance_manifest: Option<serde_json::Value>,
}

/// Video-understanding output: what the video actually says and shows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Understanding {
    /// Spoken-word transcript
    pub transcript: String,
    /// Text visible on screen
    pub on_screen_text: String,
    /// Per-scene summaries in scene order
    pub scene_summaries: Vec<String>,
}

impl Understanding {
    /// Single text block fed to the structuring engine, in the order the
    /// understanding service reports it
    pub fn combined_text(&self) -> String {
        let mut text = String::new();
        text.push_str("TRANSCRIPT:\n");
        text.push_str(&self.transcript);
        text.push_str("\n\nVISIBLE_TEXT:\n");
        text.push_str(&self.on_screen_text);
        text.push_str("\n\nSCENE_SUMMARY:\n");
        for scene in &self.scene_summaries {
            text.push_str(scene);
            text.push('\n');
        }
        text
    }
}

/// Splice / context-shift analysis finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpliceSignal {
    /// Whether the analysis saw sudden context shifts
    pub has_sudden_shifts: bool,
    /// Risk score in [0, 100], clamped on construction
    pub risk_score: f64,
    /// Free-text finding summary
    #[serde(default)]
    pub summary: String,
}

impl SpliceSignal {
    /// Clamp scores after deserializing an external payload
    pub fn normalized(mut self) -> Self {
        self.risk_score = clamp_score(self.risk_score);
        self
    }
}

/// Relation between posted date and the likely event date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeRelation {
    SameYear,
    PastYears,
    Future,
    #[default]
    #[serde(other)]
    Unclear,
}

/// Timeline-consistency analysis finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineSignal {
    /// Posted date the analysis was given, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
    /// Year the content most likely depicts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likely_event_year: Option<i32>,
    /// How the posted date relates to the likely event date
    #[serde(default)]
    pub time_relation: TimeRelation,
    /// Risk score in [0, 100], clamped on construction
    #[serde(rename = "timeline_mismatch_risk_score")]
    pub risk_score: f64,
    /// Why the analysis reached this conclusion
    #[serde(default)]
    pub why: String,
    /// What the correct timing appears to be, when a mismatch was found
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what_is_correct: Option<String>,
}

impl TimelineSignal {
    /// Clamp scores after deserializing an external payload
    pub fn normalized(mut self) -> Self {
        self.risk_score = clamp_score(self.risk_score);
        self
    }
}

/// Embedded-provenance finding derived from the container manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceSignal {
    /// Whether the manifest asserts AI authorship
    pub ai_markers_present: bool,
    /// Manifest snippet the finding is based on
    pub manifest: serde_json::Value,
}

impl ProvenanceSignal {
    /// Evaluate a raw provenance manifest for AI-generation markers.
    ///
    /// A manifest asserts AI authorship when its active manifest carries a
    /// `c2pa.created` action whose `digitalSourceType` names
    /// `trainedAlgorithmicMedia`.
    pub fn from_manifest(manifest: &serde_json::Value) -> Self {
        let markers = Self::digital_source_type(manifest)
            .map(|source_type| source_type.contains("trainedAlgorithmicMedia"))
            .unwrap_or(false);

        Self {
            ai_markers_present: markers,
            manifest: manifest.clone(),
        }
    }

    fn digital_source_type(manifest: &serde_json::Value) -> Option<&str> {
        let active_id = manifest.get("active_manifest")?.as_str()?;
        let active = manifest.get("manifests")?.get(active_id)?;

        for assertion in active.get("assertions")?.as_array()? {
            if assertion.get("label").and_then(|l| l.as_str()) != Some("c2pa.actions.v2") {
                continue;
            }
            let actions = assertion.get("data")?.get("actions")?.as_array()?;
            for action in actions {
                if action.get("action").and_then(|a| a.as_str()) == Some("c2pa.created") {
                    return action.get("digitalSourceType").and_then(|d| d.as_str());
                }
            }
        }
        None
    }
}

/// Model-based AI-generation judgment
///
/// The single stored entity behind both the `synthid` and
/// `detection_methods.synthid_analysis` report fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTrustSignal {
    /// Whether the model judges the content AI-generated
    pub is_ai: bool,
    /// Trust score in [0, 100], clamped on construction
    pub trust_score: f64,
    /// Judgment confidence in [0, 100], clamped on construction
    pub confidence: f64,
    /// Free-text rationale
    #[serde(default)]
    pub note: String,
}

impl ModelTrustSignal {
    /// Clamp scores after deserializing an external payload
    pub fn normalized(mut self) -> Self {
        self.trust_score = clamp_score(self.trust_score);
        self.confidence = clamp_score(self.confidence);
        self
    }
}
