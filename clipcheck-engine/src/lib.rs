//! clipcheck-engine - video forensics analysis pipeline
//!
//! Ingests uploaded video bytes and produces a forensic report along one of
//! two tracks: misinformation fact-checking (claims, splice, timeline) or
//! AI-generation detection (embedded provenance + model judgment). The
//! engine coordinates several independently-failing external analyses and
//! fuses whatever signals they produce into one deterministic verdict.
//!
//! The public boundary is [`AnalysisOrchestrator`] with one operation per
//! track: `analyze_fact_check` and `analyze_ai_detection`. Each returns a
//! complete [`models::FinalReport`] or exactly one of the three terminal
//! error kinds in [`error::AnalysisError`].

pub mod config;
pub mod error;
pub mod fusion;
pub mod models;
pub mod services;
pub mod types;
pub mod utils;

pub use crate::error::{AnalysisError, AnalysisResult};
pub use crate::services::AnalysisOrchestrator;
