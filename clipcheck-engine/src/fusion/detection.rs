//! Provenance / model-trust fusion for the AI-detection track
//!
//! Policy: an embedded manifest asserting AI authorship is stronger evidence
//! than a visual/audio heuristic, so `is_ai_generated` is the logical OR of
//! the two signals and a disagreeing model never overrides present markers.
//! The numeric trust score and confidence always pass through the model
//! signal untouched; with no model signal both default to 0 and the boolean
//! is driven by provenance alone.

use crate::models::{ModelTrustSignal, ProvenanceSignal};
use crate::types::PhaseOutcome;

/// Fused AI-detection verdict
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionVerdict {
    /// Provenance markers OR model judgment
    pub is_ai_generated: bool,
    /// Model trust score pass-through (0 when the model was unavailable)
    pub trust_score: f64,
    /// Model confidence pass-through (0 when the model was unavailable)
    pub confidence: f64,
}

/// Combine the provenance and model-trust signals
pub fn fuse_detection(
    provenance: &PhaseOutcome<ProvenanceSignal>,
    model_trust: &PhaseOutcome<ModelTrustSignal>,
) -> DetectionVerdict {
    let markers_present = provenance
        .available()
        .map(|p| p.ai_markers_present)
        .unwrap_or(false);

    match model_trust.available() {
        Some(model) => DetectionVerdict {
            is_ai_generated: markers_present || model.is_ai,
            trust_score: model.trust_score,
            confidence: model.confidence,
        },
        None => DetectionVerdict {
            is_ai_generated: markers_present,
            trust_score: 0.0,
            confidence: 0.0,
        },
    }
}
