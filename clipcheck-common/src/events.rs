//! Event types for the clipcheck analysis pipeline
//!
//! Provides the shared event definitions and the EventBus used by the
//! orchestrator to publish per-job progress. Subscribers (the upload layer,
//! a CLI, tests) receive phase transitions as they actually happen; there is
//! no process-wide progress state and no simulated progress.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Analysis pipeline phases, in the order a fact-check job visits them.
///
/// The ai-detection track only visits `MetadataProbe`, `ModelJudgment` and
/// `Fusion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    /// Container metadata + provenance manifest probe
    MetadataProbe,
    /// Transcript / on-screen text / scene summary extraction
    Understanding,
    /// Discrete claim extraction from the understanding output
    ClaimExtraction,
    /// Per-claim web fact-checking
    FactCheck,
    /// Context-shift / splice analysis
    Splice,
    /// Posted-date vs. event-date consistency analysis
    Timeline,
    /// Model-based AI-generation judgment
    ModelJudgment,
    /// Deterministic signal fusion into the final verdict
    Fusion,
}

impl AnalysisPhase {
    /// Short human-readable phase name (for logs and progress text)
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisPhase::MetadataProbe => "metadata-probe",
            AnalysisPhase::Understanding => "understanding",
            AnalysisPhase::ClaimExtraction => "claim-extraction",
            AnalysisPhase::FactCheck => "fact-check",
            AnalysisPhase::Splice => "splice",
            AnalysisPhase::Timeline => "timeline",
            AnalysisPhase::ModelJudgment => "model-judgment",
            AnalysisPhase::Fusion => "fusion",
        }
    }
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// clipcheck event types
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to whatever surface is driving the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisEvent {
    /// A job was accepted and its pipeline is starting
    JobStarted {
        /// Job UUID
        job_id: Uuid,
        /// Selected track ("factcheck" or "ai-detection")
        track: String,
        /// When the job started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A pipeline phase began executing
    PhaseStarted {
        job_id: Uuid,
        phase: AnalysisPhase,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A pipeline phase completed and produced its signal
    PhaseCompleted {
        job_id: Uuid,
        phase: AnalysisPhase,
        /// Wall-clock phase duration in milliseconds
        duration_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A non-critical phase failed or timed out; its signal is absent from
    /// the report but the job continues
    PhaseDegraded {
        job_id: Uuid,
        phase: AnalysisPhase,
        /// Failure cause ("timeout", service error text, ...)
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// One claim finished fact-checking (or failed to)
    ClaimChecked {
        job_id: Uuid,
        /// Index into the job's claim list
        claim_index: usize,
        /// Verdict label, or None if the check failed for this claim
        verdict: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The job finished and a complete report was produced
    JobCompleted {
        job_id: Uuid,
        /// Final verdict label ("REAL"/"MISLEADING"/"FAKE" or
        /// "ai-generated"/"authentic" for the detection track)
        verdict: String,
        /// Total job duration in seconds
        duration_seconds: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The job failed terminally (critical phase, timeout, invalid input)
    JobFailed {
        job_id: Uuid,
        /// Phase that caused the failure, when attributable
        phase: Option<AnalysisPhase>,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus for per-job progress events
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block the pipeline)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AnalysisEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    ///
    /// # Arguments
    /// * `capacity` - Number of events buffered before old events are dropped
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` otherwise.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: AnalysisEvent,
    ) -> Result<usize, broadcast::error::SendError<AnalysisEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// Progress events are advisory; a job runs identically with zero
    /// subscribers.
    pub fn emit_lossy(&self, event: AnalysisEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
