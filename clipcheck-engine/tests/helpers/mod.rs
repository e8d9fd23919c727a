//! Shared test helpers: scripted mock collaborators and fixture builders
#![allow(dead_code)]

use async_trait::async_trait;
use clipcheck_common::events::EventBus;
use clipcheck_engine::models::{
    Claim, ClaimExtraction, Evidence, FactCheckResult, ModelTrustSignal, SpliceSignal,
    TimelineSignal, Understanding, VideoMetadata,
};
use clipcheck_engine::services::AnalysisOrchestrator;
use clipcheck_engine::types::{
    EvidenceSearch, MetadataProbe, ServiceError, StructuringEngine, VideoUnderstanding,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Scripted behavior for one mock endpoint
#[derive(Clone)]
pub enum Behavior<T: Clone> {
    /// Return this value
    Ok(T),
    /// Report the capability unavailable
    NotAvailable,
    /// Fail with an internal error
    Fail(String),
    /// Never resolve (exercises phase timeouts)
    Hang,
}

impl<T: Clone> Behavior<T> {
    pub async fn resolve(&self) -> Result<T, ServiceError> {
        match self {
            Behavior::Ok(value) => Ok(value.clone()),
            Behavior::NotAvailable => Err(ServiceError::NotAvailable("mocked away".to_string())),
            Behavior::Fail(message) => Err(ServiceError::Internal(message.clone())),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

// ----------------------------------------------------------------------
// Mock collaborators
// ----------------------------------------------------------------------

pub struct MockProbe {
    pub behavior: Behavior<VideoMetadata>,
}

#[async_trait]
impl MetadataProbe for MockProbe {
    async fn probe(&self, _video: &[u8]) -> Result<VideoMetadata, ServiceError> {
        self.behavior.resolve().await
    }
}

pub struct MockUnderstanding {
    pub understand: Behavior<Understanding>,
    pub splice: Behavior<SpliceSignal>,
}

#[async_trait]
impl VideoUnderstanding for MockUnderstanding {
    async fn understand(&self, _video: &[u8]) -> Result<Understanding, ServiceError> {
        self.understand.resolve().await
    }

    async fn splice_analysis(
        &self,
        _video: &[u8],
        _context: &Understanding,
    ) -> Result<SpliceSignal, ServiceError> {
        self.splice.resolve().await
    }
}

pub struct MockEngine {
    pub extraction: Behavior<ClaimExtraction>,
    pub timeline: Behavior<TimelineSignal>,
    pub judgment: Behavior<ModelTrustSignal>,
    /// Per-claim fact-check scripts keyed by claim text; unscripted claims
    /// check out "true" with confidence 90
    pub fact_checks: HashMap<String, Behavior<FactCheckResult>>,
    /// Optional per-claim delay keyed by claim text, for ordering tests
    pub fact_check_delays_ms: HashMap<String, u64>,
}

impl MockEngine {
    pub fn with_extraction(extraction: Behavior<ClaimExtraction>) -> Self {
        Self {
            extraction,
            timeline: Behavior::Ok(quiet_timeline()),
            judgment: Behavior::Ok(human_judgment()),
            fact_checks: HashMap::new(),
            fact_check_delays_ms: HashMap::new(),
        }
    }
}

#[async_trait]
impl StructuringEngine for MockEngine {
    async fn extract_claims(
        &self,
        _understanding: &Understanding,
        _caption: Option<&str>,
    ) -> Result<ClaimExtraction, ServiceError> {
        self.extraction.resolve().await
    }

    async fn fact_check(
        &self,
        claim: &Claim,
        _evidence: &[Evidence],
    ) -> Result<FactCheckResult, ServiceError> {
        if let Some(delay_ms) = self.fact_check_delays_ms.get(&claim.text) {
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        }
        match self.fact_checks.get(&claim.text) {
            Some(behavior) => behavior.resolve().await,
            None => Ok(FactCheckResult::new("true", 90.0, "confirmed by sources")),
        }
    }

    async fn timeline_check(
        &self,
        _understanding: &Understanding,
        _posted_date: Option<chrono::NaiveDate>,
    ) -> Result<TimelineSignal, ServiceError> {
        self.timeline.resolve().await
    }

    async fn ai_judgment(
        &self,
        _video: &[u8],
        _metadata: Option<&VideoMetadata>,
        _context: Option<&Understanding>,
    ) -> Result<ModelTrustSignal, ServiceError> {
        self.judgment.resolve().await
    }
}

pub struct MockSearch {
    pub behavior: Behavior<Vec<Evidence>>,
    /// Delay per search call, for fan-out observation
    pub delay: Duration,
    in_flight: AtomicUsize,
    pub max_observed: Arc<AtomicUsize>,
}

impl MockSearch {
    pub fn returning(evidence: Vec<Evidence>) -> Self {
        Self {
            behavior: Behavior::Ok(evidence),
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_observed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl EvidenceSearch for MockSearch {
    async fn search(&self, _claim_text: &str) -> Result<Vec<Evidence>, ServiceError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_observed.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = self.behavior.resolve().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

// ----------------------------------------------------------------------
// Fixtures
// ----------------------------------------------------------------------

pub fn sample_understanding() -> Understanding {
    Understanding {
        transcript: "the river flooded the old town center this morning".to_string(),
        on_screen_text: "BREAKING: FLOODING DOWNTOWN".to_string(),
        scene_summaries: vec![
            "Reporter stands in flooded street".to_string(),
            "Aerial footage of the river".to_string(),
        ],
    }
}

pub fn extraction_with_claims(texts: &[&str]) -> ClaimExtraction {
    let mut extraction = ClaimExtraction {
        video_summary: "A news report about flooding in a town center.".to_string(),
        caption_summary: String::new(),
        combined_summary: "A news report about flooding in a town center.".to_string(),
        claims: Vec::new(),
    };
    for text in texts {
        extraction.claims.push(Claim::new(*text, 85.0));
    }
    extraction
}

pub fn web_evidence() -> Vec<Evidence> {
    vec![Evidence {
        source: "https://example.com/news/flood".to_string(),
        timestamp: Some("2026-03-01".to_string()),
        text: "Local outlets confirmed flooding in the town center.".to_string(),
    }]
}

pub fn quiet_splice() -> SpliceSignal {
    SpliceSignal {
        has_sudden_shifts: false,
        risk_score: 10.0,
        summary: "single coherent report".to_string(),
    }
}

pub fn quiet_timeline() -> TimelineSignal {
    TimelineSignal {
        posted_date: None,
        likely_event_year: Some(2026),
        time_relation: clipcheck_engine::models::TimeRelation::SameYear,
        risk_score: 5.0,
        why: "content matches posted date".to_string(),
        what_is_correct: None,
    }
}

pub fn human_judgment() -> ModelTrustSignal {
    ModelTrustSignal {
        is_ai: false,
        trust_score: 88.0,
        confidence: 80.0,
        note: "no synthesis artifacts".to_string(),
    }
}

pub fn ai_manifest() -> serde_json::Value {
    serde_json::json!({
        "active_manifest": "urn:manifest:1",
        "manifests": {
            "urn:manifest:1": {
                "assertions": [{
                    "label": "c2pa.actions.v2",
                    "data": { "actions": [{
                        "action": "c2pa.created",
                        "digitalSourceType":
                            "http://cv.iptc.org/newscodes/digitalsourcetype/trainedAlgorithmicMedia",
                    }]}
                }]
            }
        }
    })
}

pub fn metadata_with_manifest(manifest: serde_json::Value) -> VideoMetadata {
    VideoMetadata {
        format: Some("mov,mp4,m4a,3gp,3g2,mj2".to_string()),
        duration_seconds: Some(34.2),
        encoder: Some("Lavf60.3.100".to_string()),
        creation_time: None,
        device: None,
        provenance_manifest: Some(manifest),
    }
}

pub fn plain_metadata() -> VideoMetadata {
    VideoMetadata {
        format: Some("mov,mp4,m4a,3gp,3g2,mj2".to_string()),
        duration_seconds: Some(34.2),
        encoder: None,
        creation_time: None,
        device: None,
        provenance_manifest: None,
    }
}

// ----------------------------------------------------------------------
// Orchestrator wiring
// ----------------------------------------------------------------------

pub struct Fixture {
    pub probe: MockProbe,
    pub understanding: MockUnderstanding,
    pub engine: MockEngine,
    pub search: MockSearch,
    pub job_timeout: Duration,
    pub phase_timeout: Duration,
    pub factcheck_timeout: Duration,
    pub max_concurrent_factchecks: usize,
}

impl Fixture {
    /// A fixture whose every phase succeeds quietly
    pub fn quiet(claim_texts: &[&str]) -> Self {
        Self {
            probe: MockProbe {
                behavior: Behavior::Ok(plain_metadata()),
            },
            understanding: MockUnderstanding {
                understand: Behavior::Ok(sample_understanding()),
                splice: Behavior::Ok(quiet_splice()),
            },
            engine: MockEngine::with_extraction(Behavior::Ok(extraction_with_claims(claim_texts))),
            search: MockSearch::returning(web_evidence()),
            job_timeout: Duration::from_secs(60),
            phase_timeout: Duration::from_secs(10),
            factcheck_timeout: Duration::from_secs(10),
            max_concurrent_factchecks: 4,
        }
    }

    pub fn build(self, event_bus: EventBus) -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(
            Arc::new(self.probe),
            Arc::new(self.understanding),
            Arc::new(self.engine),
            Arc::new(self.search),
            event_bus,
            self.job_timeout,
            self.phase_timeout,
            self.factcheck_timeout,
            self.max_concurrent_factchecks,
        )
    }
}

/// Bytes that sniff as nothing in particular (accepted as raw video stream)
pub fn video_bytes() -> Vec<u8> {
    b"raw-video-stream-fixture".to_vec()
}

/// Route pipeline logs through the test harness when RUST_LOG is set
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
