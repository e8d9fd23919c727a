//! Deterministic signal fusion
//!
//! Turns the pipeline's availability-tagged signals into the final verdict
//! and score set. Fusion runs exactly once per job, after every phase has
//! completed or been marked failed/unavailable.

pub mod detection;
pub mod scorer;
pub mod verdict_classifier;

pub use detection::{fuse_detection, DetectionVerdict};
pub use scorer::{FusionInputs, SignalScorer};
pub use verdict_classifier::{classify_verdict_label, VerdictClass};
