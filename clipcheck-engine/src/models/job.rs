//! Analysis job lifecycle state

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Which analysis track the caller selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisTrack {
    /// Misinformation / fact-check analysis with splice and timeline signals
    #[serde(rename = "factcheck")]
    FactCheck,
    /// AI-generation / deepfake detection
    #[serde(rename = "ai-detection")]
    AiDetection,
}

impl AnalysisTrack {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisTrack::FactCheck => "factcheck",
            AnalysisTrack::AiDetection => "ai-detection",
        }
    }
}

impl std::fmt::Display for AnalysisTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analysis job: a single uploaded video plus a selected track
///
/// Owned exclusively by the orchestrator for its lifetime and dropped once
/// the report is returned or the job fails terminally. Nothing about a job
/// survives the request.
#[derive(Debug)]
pub struct AnalysisJob {
    /// Job UUID
    pub job_id: Uuid,
    /// Selected analysis track
    pub track: AnalysisTrack,
    /// Uploader caption text, when supplied
    pub caption: Option<String>,
    /// Date the video was posted, when supplied
    pub posted_date: Option<NaiveDate>,
    /// When the job was accepted
    pub created_at: DateTime<Utc>,
    deadline: Instant,
}

impl AnalysisJob {
    /// Create a job whose deadline is `timeout` from now
    pub fn new(
        track: AnalysisTrack,
        caption: Option<String>,
        posted_date: Option<NaiveDate>,
        timeout: Duration,
    ) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            track,
            caption: caption.filter(|c| !c.trim().is_empty()),
            posted_date,
            created_at: Utc::now(),
            deadline: Instant::now() + timeout,
        }
    }

    /// Absolute deadline for this job
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline (zero once exceeded)
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has already passed
    pub fn deadline_exceeded(&self) -> bool {
        Instant::now() >= self.deadline
    }
}
