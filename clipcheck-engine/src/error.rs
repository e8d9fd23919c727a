//! Error types for clipcheck-engine
//!
//! Callers of the engine see exactly three terminal failure kinds; every
//! other upstream failure is folded into the report as an absent signal and
//! never surfaces as a job error.

use clipcheck_common::events::AnalysisPhase;
use thiserror::Error;

/// Terminal job failure returned by the analysis entry points
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The uploaded bytes are empty or clearly not a video container
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A phase the selected track cannot proceed without has failed
    /// (video understanding on the fact-check track)
    #[error("Critical phase {phase} failed: {cause}")]
    CriticalPhaseFailed {
        /// Phase that failed
        phase: AnalysisPhase,
        /// Underlying failure description
        cause: String,
    },

    /// The overall job deadline elapsed (or the caller cancelled) before
    /// signal fusion could start
    #[error("Job timed out: {cause}")]
    JobTimedOut {
        /// What exhausted the job ("deadline exceeded", "cancelled")
        cause: String,
    },
}

/// Result type for the analysis entry points
pub type AnalysisResult<T> = Result<T, AnalysisError>;
