//! Signal fusion for the fact-check track
//!
//! Combines whatever signals the pipeline managed to produce into one verdict
//! and score set. The combination is deterministic and tolerant of gaps:
//! averages run over produced results only, risk pass-throughs default to a
//! neutral zero when an analyzer was unavailable, and the verdict policy
//! requires corroboration before escalating to FAKE.
//!
//! # Verdict policy
//! - **FAKE**: misinformation and splice risk both above the high threshold,
//!   or any negative-classified fact-check with confidence ≥ the fake-claim
//!   threshold.
//! - **MISLEADING**: any risk score above the moderate threshold, or an
//!   AI-generation signal fired.
//! - **REAL**: otherwise.
//!
//! Threshold values are tunable policy; the structural contract (monotone
//! misinformation risk, absent-signal neutrality, FAKE needing two risk
//! dimensions or one high-confidence false claim) is what the tests pin.

use crate::fusion::verdict_classifier::{classify_verdict_label, VerdictClass};
use crate::models::{
    clamp_score, Claim, ClaimExtraction, Correction, FactCheckResult, ModelTrustSignal,
    ProvenanceSignal, SpliceSignal, TimelineSignal, Verdict, VerdictBlock,
};
use crate::types::PhaseOutcome;

/// Weight carried by a negative verdict whose confidence was not computed
const UNSCORED_NEGATIVE_WEIGHT: f64 = 0.5;
/// Ceiling for the fusion's self-reported confidence
const MAX_CONFIDENCE_PERCENT: f64 = 95.0;
/// Confidence base used when no fact-check produced a usable confidence
const NEUTRAL_CONFIDENCE_BASE: f64 = 50.0;

/// Everything the fact-check fusion consumes, availability-tagged
pub struct FusionInputs<'a> {
    /// Claim extraction outcome (claims live inside)
    pub claim_extraction: &'a PhaseOutcome<ClaimExtraction>,
    /// Per-claim results, aligned by index with the extracted claims
    pub fact_checks: &'a [Option<FactCheckResult>],
    /// Splice analysis outcome
    pub splice: &'a PhaseOutcome<SpliceSignal>,
    /// Timeline analysis outcome
    pub timeline: &'a PhaseOutcome<TimelineSignal>,
    /// Embedded-provenance outcome
    pub provenance: &'a PhaseOutcome<ProvenanceSignal>,
    /// Model AI-generation judgment outcome
    pub model_trust: &'a PhaseOutcome<ModelTrustSignal>,
}

/// Signal fusion scorer with tunable verdict thresholds
pub struct SignalScorer {
    /// Risk above this is enough for MISLEADING
    moderate_risk_threshold: f64,
    /// Risk above this on two dimensions is enough for FAKE
    high_risk_threshold: f64,
    /// A single negative fact-check at or above this confidence forces FAKE
    fake_claim_confidence: f64,
}

impl SignalScorer {
    /// Create a scorer with default thresholds
    pub fn new() -> Self {
        Self {
            moderate_risk_threshold: 40.0,
            high_risk_threshold: 75.0,
            fake_claim_confidence: 80.0,
        }
    }

    /// Create a scorer with custom thresholds
    pub fn with_thresholds(
        moderate_risk_threshold: f64,
        high_risk_threshold: f64,
        fake_claim_confidence: f64,
    ) -> Self {
        Self {
            moderate_risk_threshold,
            high_risk_threshold,
            fake_claim_confidence,
        }
    }

    /// Fuse all available signals into the final verdict block
    pub fn fuse(&self, inputs: &FusionInputs<'_>) -> VerdictBlock {
        let produced: Vec<&FactCheckResult> = inputs.fact_checks.iter().flatten().collect();

        let avg_factcheck_confidence = Self::avg_confidence(&produced);
        let (negative_claims, ambiguous_claims) = Self::classify_counts(&produced);
        let misinformation_risk_score = Self::misinformation_risk(&produced);

        // Risk pass-throughs: neutral zero when the analyzer was unavailable.
        // The report keeps the underlying finding optional, so a zero here is
        // still distinguishable from "analysis produced a zero".
        let splice_risk_score = inputs
            .splice
            .available()
            .map(|s| s.risk_score)
            .unwrap_or(0.0);
        let timeline_mismatch_risk_score = inputs
            .timeline
            .available()
            .map(|t| t.risk_score)
            .unwrap_or(0.0);

        let ai_signal_fired = Self::ai_signal_fired(inputs);

        let high_confidence_negative = produced.iter().any(|r| {
            classify_verdict_label(&r.verdict) == VerdictClass::Negative
                && r.confidence >= self.fake_claim_confidence
        });

        let verdict = if (misinformation_risk_score > self.high_risk_threshold
            && splice_risk_score > self.high_risk_threshold)
            || high_confidence_negative
        {
            Verdict::Fake
        } else if misinformation_risk_score > self.moderate_risk_threshold
            || splice_risk_score > self.moderate_risk_threshold
            || timeline_mismatch_risk_score > self.moderate_risk_threshold
            || ai_signal_fired
        {
            Verdict::Misleading
        } else {
            Verdict::Real
        };

        let completeness = Self::completeness(inputs, produced.len());
        let confidence_percent =
            Self::confidence_percent(avg_factcheck_confidence, completeness);

        let dominant = self.dominant_signal(
            misinformation_risk_score,
            splice_risk_score,
            timeline_mismatch_risk_score,
            ai_signal_fired,
        );
        let one_line_label = format!(
            "{} - {}% Confidence ({})",
            verdict, confidence_percent, dominant
        );

        tracing::debug!(
            verdict = %verdict,
            confidence_percent,
            misinformation_risk = misinformation_risk_score,
            splice_risk = splice_risk_score,
            timeline_risk = timeline_mismatch_risk_score,
            ai_signal_fired,
            completeness,
            "Signal fusion complete"
        );

        VerdictBlock {
            verdict,
            confidence_percent,
            one_line_label,
            misinformation_risk_score,
            splice_risk_score,
            timeline_mismatch_risk_score,
            avg_factcheck_confidence,
            negative_claims,
            ambiguous_claims,
        }
    }

    /// Mean confidence over produced results with confidence > 0.
    ///
    /// Exactly 0 when no result qualifies; a missing result is never an
    /// implicit zero sample.
    fn avg_confidence(produced: &[&FactCheckResult]) -> f64 {
        let scored: Vec<f64> = produced
            .iter()
            .filter(|r| r.confidence > 0.0)
            .map(|r| r.confidence)
            .collect();
        if scored.is_empty() {
            0.0
        } else {
            scored.iter().sum::<f64>() / scored.len() as f64
        }
    }

    fn classify_counts(produced: &[&FactCheckResult]) -> (usize, usize) {
        let mut negative = 0;
        let mut ambiguous = 0;
        for result in produced {
            match classify_verdict_label(&result.verdict) {
                VerdictClass::Negative => negative += 1,
                VerdictClass::Ambiguous => ambiguous += 1,
                VerdictClass::Positive => {}
            }
        }
        (negative, ambiguous)
    }

    /// Confidence-weighted share of negative-classified results, on a 0-100
    /// scale. Absent results contribute zero weight, never an assumed
    /// negative; a negative whose confidence was not computed carries a
    /// fixed partial weight.
    fn misinformation_risk(produced: &[&FactCheckResult]) -> f64 {
        if produced.is_empty() {
            return 0.0;
        }

        let negative_weight: f64 = produced
            .iter()
            .filter(|r| classify_verdict_label(&r.verdict) == VerdictClass::Negative)
            .map(|r| {
                if r.confidence > 0.0 {
                    r.confidence / 100.0
                } else {
                    UNSCORED_NEGATIVE_WEIGHT
                }
            })
            .sum();

        clamp_score(100.0 * negative_weight / produced.len() as f64)
    }

    fn ai_signal_fired(inputs: &FusionInputs<'_>) -> bool {
        let markers = inputs
            .provenance
            .available()
            .map(|p| p.ai_markers_present)
            .unwrap_or(false);
        let model_says_ai = inputs
            .model_trust
            .available()
            .map(|m| m.is_ai)
            .unwrap_or(false);
        markers || model_says_ai
    }

    /// Fraction of the pipeline that actually produced signals: the share of
    /// claims that got checked, plus splice and timeline availability.
    fn completeness(inputs: &FusionInputs<'_>, produced_count: usize) -> f64 {
        let claim_coverage = match inputs.claim_extraction.available() {
            Some(extraction) if extraction.claims.is_empty() => 1.0,
            Some(extraction) => produced_count as f64 / extraction.claims.len() as f64,
            None => 0.0,
        };
        let splice = if inputs.splice.is_complete() { 1.0 } else { 0.0 };
        let timeline = if inputs.timeline.is_complete() { 1.0 } else { 0.0 };

        (claim_coverage + splice + timeline) / 3.0
    }

    /// Self-reported verdict confidence: the fact-check average scaled by
    /// signal completeness, so a degraded job never reports more confidence
    /// than the same job with every phase completed.
    fn confidence_percent(avg_confidence: f64, completeness: f64) -> u8 {
        let base = if avg_confidence > 0.0 {
            avg_confidence
        } else {
            NEUTRAL_CONFIDENCE_BASE
        };
        let scaled = base * (0.5 + 0.5 * completeness.clamp(0.0, 1.0));
        scaled.round().clamp(0.0, MAX_CONFIDENCE_PERCENT) as u8
    }

    fn dominant_signal(
        &self,
        misinformation: f64,
        splice: f64,
        timeline: f64,
        ai_signal_fired: bool,
    ) -> &'static str {
        let max_risk = misinformation.max(splice).max(timeline);
        if max_risk <= 0.0 {
            return if ai_signal_fired {
                "AI-generation signals dominant"
            } else {
                "no risk signals"
            };
        }
        if ai_signal_fired && max_risk < self.moderate_risk_threshold {
            return "AI-generation signals dominant";
        }
        if misinformation >= splice && misinformation >= timeline {
            "web fact-checks dominant"
        } else if splice >= timeline {
            "splice indicators dominant"
        } else {
            "timeline mismatch dominant"
        }
    }

    /// Short human-readable reasons behind the verdict, strongest first
    pub fn top_reasons(&self, inputs: &FusionInputs<'_>, block: &VerdictBlock) -> Vec<String> {
        let mut reasons = Vec::new();

        if let Some(provenance) = inputs.provenance.available() {
            if provenance.ai_markers_present {
                reasons.push("Embedded provenance metadata indicates AI-generated content.".to_string());
            }
        }
        if let Some(model) = inputs.model_trust.available() {
            if model.is_ai {
                reasons.push("Model analysis detected AI-generation patterns.".to_string());
            }
        }

        match inputs.splice.available() {
            Some(splice) if splice.risk_score > self.moderate_risk_threshold => {
                reasons.push("Abrupt context shifts detected in the footage.".to_string())
            }
            Some(_) => reasons.push("Little to no abrupt editing detected.".to_string()),
            None => reasons.push("Splice analysis was unavailable for this video.".to_string()),
        }

        match inputs.timeline.available() {
            Some(timeline) if timeline.risk_score < 30.0 => {
                reasons.push("Timeline looks consistent with the posted date.".to_string())
            }
            Some(timeline) if timeline.risk_score < 60.0 => {
                reasons.push("Some timeline uncertainty.".to_string())
            }
            Some(_) => reasons
                .push("Posted date and event timing look inconsistent.".to_string()),
            None => reasons.push("Timeline analysis was unavailable for this video.".to_string()),
        }

        if block.negative_claims == 0 && block.ambiguous_claims == 0 {
            reasons.push("Key claims look consistent with web sources.".to_string());
        } else if block.negative_claims == 0 {
            reasons.push("Some claims could not be confirmed from web sources.".to_string());
        } else {
            reasons.push(
                "One or more claims appear false or misleading based on web sources.".to_string(),
            );
        }

        reasons.truncate(5);
        reasons
    }

    /// Corrections for claims whose check came back negative with corrected
    /// information attached
    pub fn corrections(
        claims: &[Claim],
        fact_checks: &[Option<FactCheckResult>],
    ) -> Vec<Correction> {
        let mut corrections = Vec::new();
        for (claim, result) in claims.iter().zip(fact_checks.iter()) {
            let Some(result) = result else { continue };
            if classify_verdict_label(&result.verdict) != VerdictClass::Negative {
                continue;
            }
            corrections.push(Correction {
                incorrect_claim: claim.text.clone(),
                correct_information: result.correction.clone().unwrap_or_default(),
                confidence: result.confidence,
                explanation: result.explanation.clone(),
                citations: result.citations.clone(),
            });
            if corrections.len() == 5 {
                break;
            }
        }
        corrections
    }
}

impl Default for SignalScorer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
