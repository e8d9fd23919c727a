//! Core types and trait definitions for the analysis pipeline
//!
//! Defines the collaborator seams the orchestrator drives:
//! - **MetadataProbe**: container metadata + provenance manifest
//! - **VideoUnderstanding**: transcript/scene extraction and splice analysis
//! - **StructuringEngine**: model-backed claims, fact-checks, timeline and
//!   AI-generation judgments
//! - **EvidenceSearch**: ranked web snippets for a claim
//!
//! Every collaborator response is converted to a [`PhaseOutcome`] the moment
//! it crosses the boundary, so the scorer only ever sees typed,
//! availability-tagged signals.

use crate::models::{
    Claim, ClaimExtraction, Evidence, FactCheckResult, ModelTrustSignal, SpliceSignal,
    TimelineSignal, Understanding, VideoMetadata,
};
use chrono::NaiveDate;
use thiserror::Error;

/// Collaborator call errors, shared by all service clients
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// External API returned a failure status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// External API asked us to back off
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Response could not be parsed into the data model
    #[error("Parse error: {0}")]
    Parse(String),

    /// The capability is not available (unconfigured, binary missing, ...)
    #[error("Service not available: {0}")]
    NotAvailable(String),

    /// I/O error (subprocess plumbing)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal processing error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether retrying the same call can reasonably succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Network(_) | ServiceError::RateLimited => true,
            ServiceError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Tagged outcome of one analysis phase
///
/// `Unavailable` (the capability could not run) and `Failed` (it ran and
/// broke) both leave the signal absent from fusion math, but the report keeps
/// them distinguishable from a computed zero-risk finding.
#[derive(Debug, Clone)]
pub enum PhaseOutcome<T> {
    /// The phase produced its signal
    Complete(T),
    /// The capability was unavailable for this job
    Unavailable,
    /// The phase failed or timed out
    Failed(String),
}

impl<T> PhaseOutcome<T> {
    /// The signal, when the phase completed
    pub fn available(&self) -> Option<&T> {
        match self {
            PhaseOutcome::Complete(value) => Some(value),
            _ => None,
        }
    }

    /// Consume the outcome, yielding the signal when present
    pub fn into_available(self) -> Option<T> {
        match self {
            PhaseOutcome::Complete(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, PhaseOutcome::Complete(_))
    }

    /// Why the signal is absent, when it is
    pub fn absence_reason(&self) -> Option<&str> {
        match self {
            PhaseOutcome::Complete(_) => None,
            PhaseOutcome::Unavailable => Some("unavailable"),
            PhaseOutcome::Failed(reason) => Some(reason),
        }
    }

    /// Convert a collaborator result into a tagged outcome
    pub fn from_service(result: Result<T, ServiceError>) -> Self {
        match result {
            Ok(value) => PhaseOutcome::Complete(value),
            Err(ServiceError::NotAvailable(_)) => PhaseOutcome::Unavailable,
            Err(e) => PhaseOutcome::Failed(e.to_string()),
        }
    }
}

/// Raw container-metadata reader
#[async_trait::async_trait]
pub trait MetadataProbe: Send + Sync {
    /// Probe container metadata and any embedded provenance manifest
    async fn probe(&self, video: &[u8]) -> Result<VideoMetadata, ServiceError>;
}

/// Video-understanding service
#[async_trait::async_trait]
pub trait VideoUnderstanding: Send + Sync {
    /// Extract transcript, on-screen text, and per-scene summaries
    async fn understand(&self, video: &[u8]) -> Result<Understanding, ServiceError>;

    /// Run the context-shift / splice analysis pass
    async fn splice_analysis(
        &self,
        video: &[u8],
        context: &Understanding,
    ) -> Result<SpliceSignal, ServiceError>;
}

/// Model-backed structuring engine
#[async_trait::async_trait]
pub trait StructuringEngine: Send + Sync {
    /// Turn understanding output (plus optional caption) into discrete claims
    async fn extract_claims(
        &self,
        understanding: &Understanding,
        caption: Option<&str>,
    ) -> Result<ClaimExtraction, ServiceError>;

    /// Fact-check one claim against search evidence
    async fn fact_check(
        &self,
        claim: &Claim,
        evidence: &[Evidence],
    ) -> Result<FactCheckResult, ServiceError>;

    /// Judge timeline consistency of the scene/date data
    async fn timeline_check(
        &self,
        understanding: &Understanding,
        posted_date: Option<NaiveDate>,
    ) -> Result<TimelineSignal, ServiceError>;

    /// Judge whether the video is AI-generated
    async fn ai_judgment(
        &self,
        video: &[u8],
        metadata: Option<&VideoMetadata>,
        context: Option<&Understanding>,
    ) -> Result<ModelTrustSignal, ServiceError>;
}

/// Web evidence search
#[async_trait::async_trait]
pub trait EvidenceSearch: Send + Sync {
    /// Ranked source snippets for a claim, best first
    async fn search(&self, claim_text: &str) -> Result<Vec<Evidence>, ServiceError>;
}
