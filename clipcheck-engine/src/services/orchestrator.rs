//! Analysis pipeline orchestrator
//!
//! Sequences the per-job phase graph, enforces timeouts, and assembles the
//! final report:
//!
//! - metadata probe ∥ video understanding (no data dependency)
//! - after understanding: claim extraction, splice analysis, timeline
//!   analysis, and the model judgment run concurrently
//! - per-claim fact-checks start as soon as claims exist, overlapping the
//!   other analyses, with bounded fan-out inside the fact-checker
//! - fusion runs last, after every phase completed or was marked degraded
//!
//! Each phase carries an independent timeout; a blown budget marks that
//! signal absent rather than failing the job. Only video understanding is
//! critical, and only on the fact-check track. The whole job races its
//! deadline and the caller's cancellation token: dropping the phase futures
//! aborts every in-flight external call.

use crate::config::EngineConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::fusion::{fuse_detection, FusionInputs, SignalScorer};
use crate::models::{
    AnalysisJob, AnalysisTrack, ClaimExtraction, DetectionReport, FactCheckReport, FinalReport,
    ProvenanceSignal, VideoMetadata,
};
use crate::services::fact_checker::ClaimFactChecker;
use crate::services::llm_client::LanguageModelClient;
use crate::services::probe_client::FfprobeClient;
use crate::services::search_client::WebSearchClient;
use crate::services::video_index_client::VideoIndexClient;
use crate::types::{
    EvidenceSearch, MetadataProbe, PhaseOutcome, ServiceError, StructuringEngine,
    VideoUnderstanding,
};
use chrono::{NaiveDate, Utc};
use clipcheck_common::events::{AnalysisEvent, AnalysisPhase, EventBus};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Report summaries are trimmed to this many chars
const MAX_SUMMARY_CHARS: usize = 900;

/// Pipeline orchestrator
///
/// Owns the collaborator handles and the per-job event bus. Jobs share no
/// mutable state; every `run` call is independent and all job state is
/// dropped when the report is returned.
pub struct AnalysisOrchestrator {
    probe: Arc<dyn MetadataProbe>,
    understanding: Arc<dyn VideoUnderstanding>,
    engine: Arc<dyn StructuringEngine>,
    fact_checker: ClaimFactChecker,
    scorer: SignalScorer,
    event_bus: EventBus,
    job_timeout: Duration,
    phase_timeout: Duration,
}

impl AnalysisOrchestrator {
    /// Create an orchestrator over explicit collaborator handles
    pub fn new(
        probe: Arc<dyn MetadataProbe>,
        understanding: Arc<dyn VideoUnderstanding>,
        engine: Arc<dyn StructuringEngine>,
        search: Arc<dyn EvidenceSearch>,
        event_bus: EventBus,
        job_timeout: Duration,
        phase_timeout: Duration,
        factcheck_timeout: Duration,
        max_concurrent_factchecks: usize,
    ) -> Self {
        let fact_checker = ClaimFactChecker::new(
            search,
            Arc::clone(&engine),
            max_concurrent_factchecks,
            factcheck_timeout,
            event_bus.clone(),
        );

        Self {
            probe,
            understanding,
            engine,
            fact_checker,
            scorer: SignalScorer::new(),
            event_bus,
            job_timeout,
            phase_timeout,
        }
    }

    /// Create an orchestrator wired to the production service clients
    pub fn from_config(
        config: &EngineConfig,
        event_bus: EventBus,
    ) -> clipcheck_common::Result<Self> {
        let probe = Arc::new(FfprobeClient::new());
        let understanding = Arc::new(
            VideoIndexClient::new(&config.understanding_url, &config.understanding_api_key)
                .map_err(|e| clipcheck_common::Error::Internal(e.to_string()))?,
        );
        let engine = Arc::new(
            LanguageModelClient::new(
                &config.model_url,
                &config.model_api_key,
                &config.text_model,
                &config.video_model,
            )
            .map_err(|e| clipcheck_common::Error::Internal(e.to_string()))?,
        );
        let search = Arc::new(
            WebSearchClient::new(
                &config.search_url,
                &config.search_api_key,
                config.max_search_results,
            )
            .map_err(|e| clipcheck_common::Error::Internal(e.to_string()))?,
        );

        Ok(Self::new(
            probe,
            understanding,
            engine,
            search,
            event_bus,
            config.job_timeout,
            config.phase_timeout,
            config.factcheck_timeout,
            config.max_concurrent_factchecks,
        ))
    }

    /// Run the misinformation / fact-check track
    pub async fn analyze_fact_check(
        &self,
        video: &[u8],
        caption: Option<String>,
        posted_date: Option<NaiveDate>,
    ) -> AnalysisResult<FinalReport> {
        let job = AnalysisJob::new(
            AnalysisTrack::FactCheck,
            caption,
            posted_date,
            self.job_timeout,
        );
        self.run(job, video, CancellationToken::new()).await
    }

    /// Run the AI-generation detection track
    pub async fn analyze_ai_detection(&self, video: &[u8]) -> AnalysisResult<FinalReport> {
        let job = AnalysisJob::new(AnalysisTrack::AiDetection, None, None, self.job_timeout);
        self.run(job, video, CancellationToken::new()).await
    }

    /// Run one job to completion
    ///
    /// Returns a complete report or exactly one of the three terminal error
    /// kinds. Cancelling the token, like exceeding the deadline, drops every
    /// in-flight phase future and with them the underlying external calls.
    pub async fn run(
        &self,
        job: AnalysisJob,
        video: &[u8],
        cancel_token: CancellationToken,
    ) -> AnalysisResult<FinalReport> {
        Self::validate_input(video)?;

        let job_id = job.job_id;
        let started = tokio::time::Instant::now();

        tracing::info!(
            job_id = %job_id,
            track = %job.track,
            video_bytes = video.len(),
            "Starting analysis job"
        );
        self.event_bus.emit_lossy(AnalysisEvent::JobStarted {
            job_id,
            track: job.track.as_str().to_string(),
            timestamp: Utc::now(),
        });

        let result = tokio::select! {
            _ = cancel_token.cancelled() => Err(AnalysisError::JobTimedOut {
                cause: "cancelled".to_string(),
            }),
            _ = tokio::time::sleep_until(job.deadline()) => Err(AnalysisError::JobTimedOut {
                cause: "deadline exceeded".to_string(),
            }),
            report = self.run_pipeline(&job, video) => report,
        };

        match &result {
            Ok(report) => {
                let verdict = match report {
                    FinalReport::FactCheck(r) => r.final_verdict.verdict.to_string(),
                    FinalReport::AiDetection(r) => {
                        if r.is_ai_generated { "ai-generated" } else { "authentic" }.to_string()
                    }
                };
                let duration_seconds = started.elapsed().as_secs();
                tracing::info!(
                    job_id = %job_id,
                    verdict = %verdict,
                    duration_seconds,
                    "Analysis job completed"
                );
                self.event_bus.emit_lossy(AnalysisEvent::JobCompleted {
                    job_id,
                    verdict,
                    duration_seconds,
                    timestamp: Utc::now(),
                });
            }
            Err(error) => {
                let phase = match error {
                    AnalysisError::CriticalPhaseFailed { phase, .. } => Some(*phase),
                    _ => None,
                };
                tracing::error!(job_id = %job_id, error = %error, "Analysis job failed");
                self.event_bus.emit_lossy(AnalysisEvent::JobFailed {
                    job_id,
                    phase,
                    error: error.to_string(),
                    timestamp: Utc::now(),
                });
            }
        }

        // `job` drops here; nothing about it outlives the request
        result
    }

    fn validate_input(video: &[u8]) -> AnalysisResult<()> {
        if video.is_empty() {
            return Err(AnalysisError::InvalidInput("empty video upload".to_string()));
        }
        // Content sniffing: reject uploads that are positively identified as
        // something other than video; unknown byte patterns pass through to
        // the understanding service, which is the real authority.
        if let Some(kind) = infer::get(video) {
            if kind.matcher_type() != infer::MatcherType::Video {
                return Err(AnalysisError::InvalidInput(format!(
                    "unsupported content type: {}",
                    kind.mime_type()
                )));
            }
        }
        Ok(())
    }

    async fn run_pipeline(&self, job: &AnalysisJob, video: &[u8]) -> AnalysisResult<FinalReport> {
        match job.track {
            AnalysisTrack::FactCheck => self.run_fact_check(job, video).await,
            AnalysisTrack::AiDetection => self.run_ai_detection(job, video).await,
        }
    }

    // ------------------------------------------------------------------
    // Fact-check track
    // ------------------------------------------------------------------

    async fn run_fact_check(&self, job: &AnalysisJob, video: &[u8]) -> AnalysisResult<FinalReport> {
        let job_id = job.job_id;

        // Metadata probe and understanding have no data dependency
        let (metadata_outcome, understanding_result) = tokio::join!(
            self.phase(job_id, AnalysisPhase::MetadataProbe, self.probe.probe(video)),
            self.critical_phase(
                job_id,
                AnalysisPhase::Understanding,
                self.understanding.understand(video),
            ),
        );
        let understanding = understanding_result?;
        let provenance_outcome = Self::provenance_outcome(&metadata_outcome);

        // Everything below depends only on the understanding output, so it
        // all runs concurrently; fact-checks begin the moment claims exist
        // while splice/timeline/judgment are still in flight.
        let caption = job.caption.as_deref();
        let metadata_ref = metadata_outcome.available();

        let claims_then_checks = async {
            let extraction_outcome = self
                .phase(
                    job_id,
                    AnalysisPhase::ClaimExtraction,
                    self.engine.extract_claims(&understanding, caption),
                )
                .await;

            let fact_checks = match extraction_outcome.available() {
                Some(extraction) if !extraction.claims.is_empty() => {
                    self.fact_check_phase(job_id, extraction).await
                }
                _ => Vec::new(),
            };
            (extraction_outcome, fact_checks)
        };

        let ((extraction_outcome, fact_checks), splice_outcome, timeline_outcome, model_outcome) =
            tokio::join!(
                claims_then_checks,
                self.phase(
                    job_id,
                    AnalysisPhase::Splice,
                    self.understanding.splice_analysis(video, &understanding),
                ),
                self.phase(
                    job_id,
                    AnalysisPhase::Timeline,
                    self.engine.timeline_check(&understanding, job.posted_date),
                ),
                self.phase(
                    job_id,
                    AnalysisPhase::ModelJudgment,
                    self.engine.ai_judgment(video, metadata_ref, Some(&understanding)),
                ),
            );

        if job.deadline_exceeded() {
            return Err(AnalysisError::JobTimedOut {
                cause: "deadline exceeded before fusion".to_string(),
            });
        }

        self.event_bus.emit_lossy(AnalysisEvent::PhaseStarted {
            job_id,
            phase: AnalysisPhase::Fusion,
            timestamp: Utc::now(),
        });

        let inputs = FusionInputs {
            claim_extraction: &extraction_outcome,
            fact_checks: &fact_checks,
            splice: &splice_outcome,
            timeline: &timeline_outcome,
            provenance: &provenance_outcome,
            model_trust: &model_outcome,
        };
        let final_verdict = self.scorer.fuse(&inputs);
        let top_reasons = self.scorer.top_reasons(&inputs, &final_verdict);

        let extraction = extraction_outcome
            .into_available()
            .unwrap_or_else(ClaimExtraction::default);
        let corrections = SignalScorer::corrections(&extraction.claims, &fact_checks);
        let mut summary = extraction.display_summary().to_string();
        if let Some((idx, _)) = summary.char_indices().nth(MAX_SUMMARY_CHARS) {
            summary.truncate(idx);
        }

        self.event_bus.emit_lossy(AnalysisEvent::PhaseCompleted {
            job_id,
            phase: AnalysisPhase::Fusion,
            duration_ms: 0,
            timestamp: Utc::now(),
        });

        Ok(FinalReport::FactCheck(Box::new(FactCheckReport {
            job_id,
            final_verdict,
            summary,
            top_reasons,
            claims: extraction.claims,
            fact_checks,
            corrections,
            splice: splice_outcome.into_available(),
            timeline: timeline_outcome.into_available(),
            metadata: metadata_outcome.into_available(),
            provenance: provenance_outcome.into_available(),
            model_trust: model_outcome.into_available(),
            generated_at: Utc::now(),
        })))
    }

    /// The fact-check fan-out, bracketed with its own phase events
    async fn fact_check_phase(
        &self,
        job_id: Uuid,
        extraction: &ClaimExtraction,
    ) -> Vec<Option<crate::models::FactCheckResult>> {
        self.event_bus.emit_lossy(AnalysisEvent::PhaseStarted {
            job_id,
            phase: AnalysisPhase::FactCheck,
            timestamp: Utc::now(),
        });
        let started = tokio::time::Instant::now();

        let fact_checks = self.fact_checker.check_all(job_id, &extraction.claims).await;

        let produced = fact_checks.iter().flatten().count();
        tracing::info!(
            job_id = %job_id,
            claims = extraction.claims.len(),
            produced,
            "Fact-check phase complete"
        );
        self.event_bus.emit_lossy(AnalysisEvent::PhaseCompleted {
            job_id,
            phase: AnalysisPhase::FactCheck,
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        });

        fact_checks
    }

    // ------------------------------------------------------------------
    // AI-detection track
    // ------------------------------------------------------------------

    async fn run_ai_detection(&self, job: &AnalysisJob, video: &[u8]) -> AnalysisResult<FinalReport> {
        let job_id = job.job_id;

        // The judgment prompt consumes the probe's metadata, so these two
        // are sequenced by data availability rather than run concurrently
        let metadata_outcome = self
            .phase(job_id, AnalysisPhase::MetadataProbe, self.probe.probe(video))
            .await;
        let provenance_outcome = Self::provenance_outcome(&metadata_outcome);

        let model_outcome = self
            .phase(
                job_id,
                AnalysisPhase::ModelJudgment,
                self.engine.ai_judgment(video, metadata_outcome.available(), None),
            )
            .await;

        if job.deadline_exceeded() {
            return Err(AnalysisError::JobTimedOut {
                cause: "deadline exceeded before fusion".to_string(),
            });
        }

        let verdict = fuse_detection(&provenance_outcome, &model_outcome);
        let note = model_outcome
            .available()
            .map(|m| m.note.clone())
            .filter(|note| !note.is_empty())
            .unwrap_or_else(|| "Analysis complete".to_string());

        Ok(FinalReport::AiDetection(Box::new(DetectionReport {
            job_id,
            is_ai_generated: verdict.is_ai_generated,
            trust_score: verdict.trust_score,
            confidence: verdict.confidence,
            provenance: provenance_outcome.into_available(),
            model_trust: model_outcome.into_available(),
            metadata: metadata_outcome.into_available(),
            note,
            generated_at: Utc::now(),
        })))
    }

    // ------------------------------------------------------------------
    // Phase plumbing
    // ------------------------------------------------------------------

    /// Run one non-critical phase under its timeout, emitting progress events
    async fn phase<T>(
        &self,
        job_id: Uuid,
        phase: AnalysisPhase,
        fut: impl Future<Output = Result<T, ServiceError>>,
    ) -> PhaseOutcome<T> {
        self.event_bus.emit_lossy(AnalysisEvent::PhaseStarted {
            job_id,
            phase,
            timestamp: Utc::now(),
        });
        let started = tokio::time::Instant::now();

        let outcome = match tokio::time::timeout(self.phase_timeout, fut).await {
            Ok(result) => PhaseOutcome::from_service(result),
            Err(_) => PhaseOutcome::Failed(format!(
                "timed out after {}s",
                self.phase_timeout.as_secs()
            )),
        };

        match &outcome {
            PhaseOutcome::Complete(_) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                tracing::info!(job_id = %job_id, phase = %phase, duration_ms, "Phase completed");
                self.event_bus.emit_lossy(AnalysisEvent::PhaseCompleted {
                    job_id,
                    phase,
                    duration_ms,
                    timestamp: Utc::now(),
                });
            }
            degraded => {
                let reason = degraded.absence_reason().unwrap_or("unknown").to_string();
                tracing::warn!(
                    job_id = %job_id,
                    phase = %phase,
                    reason = %reason,
                    "Phase degraded, signal will be absent"
                );
                self.event_bus.emit_lossy(AnalysisEvent::PhaseDegraded {
                    job_id,
                    phase,
                    reason,
                    timestamp: Utc::now(),
                });
            }
        }

        outcome
    }

    /// Run a phase the track cannot proceed without
    async fn critical_phase<T>(
        &self,
        job_id: Uuid,
        phase: AnalysisPhase,
        fut: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, AnalysisError> {
        match self.phase(job_id, phase, fut).await {
            PhaseOutcome::Complete(value) => Ok(value),
            PhaseOutcome::Unavailable => Err(AnalysisError::CriticalPhaseFailed {
                phase,
                cause: "service unavailable".to_string(),
            }),
            PhaseOutcome::Failed(cause) => Err(AnalysisError::CriticalPhaseFailed { phase, cause }),
        }
    }

    /// Derive the provenance signal from the probe's manifest, keeping the
    /// availability distinction: a probed container without a manifest is
    /// "no provenance data", not a zero-risk finding
    fn provenance_outcome(
        metadata: &PhaseOutcome<VideoMetadata>,
    ) -> PhaseOutcome<ProvenanceSignal> {
        match metadata {
            PhaseOutcome::Complete(metadata) => match &metadata.provenance_manifest {
                Some(manifest) => PhaseOutcome::Complete(ProvenanceSignal::from_manifest(manifest)),
                None => PhaseOutcome::Unavailable,
            },
            PhaseOutcome::Unavailable => PhaseOutcome::Unavailable,
            PhaseOutcome::Failed(reason) => PhaseOutcome::Failed(reason.clone()),
        }
    }
}
