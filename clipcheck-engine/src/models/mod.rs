//! Data model for the analysis pipeline
//!
//! External service payloads are converted into these types at the client
//! boundary; nothing downstream of a client handles untyped JSON.

pub mod claim;
pub mod job;
pub mod report;
pub mod signals;

pub use claim::{
    clamp_score, Citation, Claim, ClaimExtraction, ClaimKind, ClaimSource, Evidence,
    FactCheckResult,
};
pub use job::{AnalysisJob, AnalysisTrack};
pub use report::{Correction, DetectionReport, FactCheckReport, FinalReport, Verdict, VerdictBlock};
pub use signals::{
    ModelTrustSignal, ProvenanceSignal, SpliceSignal, TimeRelation, TimelineSignal, Understanding,
    VideoMetadata,
};
