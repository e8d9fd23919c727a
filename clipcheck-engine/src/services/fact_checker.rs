//! Per-claim fact-checking with bounded fan-out
//!
//! Drives evidence search plus the structuring engine's fact-check for each
//! claim. Claims are checked concurrently up to a configured in-flight limit
//! (external search/model services are rate-sensitive); excess claims queue
//! rather than being rejected. A claim whose check fails yields a gap at its
//! index and is logged, never retried here; the caller may resubmit the
//! whole job.

use crate::models::{Claim, FactCheckResult};
use crate::types::{EvidenceSearch, ServiceError, StructuringEngine};
use clipcheck_common::events::{AnalysisEvent, EventBus};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Claim fact-checker
pub struct ClaimFactChecker {
    search: Arc<dyn EvidenceSearch>,
    engine: Arc<dyn StructuringEngine>,
    max_in_flight: usize,
    check_timeout: Duration,
    event_bus: EventBus,
}

impl ClaimFactChecker {
    /// Create a fact-checker over the given collaborator handles
    ///
    /// # Arguments
    /// * `max_in_flight` - Maximum claims checked concurrently (floored at 1)
    /// * `check_timeout` - Budget for one claim's search + judgment
    pub fn new(
        search: Arc<dyn EvidenceSearch>,
        engine: Arc<dyn StructuringEngine>,
        max_in_flight: usize,
        check_timeout: Duration,
        event_bus: EventBus,
    ) -> Self {
        Self {
            search,
            engine,
            max_in_flight: max_in_flight.max(1),
            check_timeout,
            event_bus,
        }
    }

    /// Check every claim, returning results aligned by index with the input.
    ///
    /// The output always has the same length as `claims`; an entry is `None`
    /// exactly when that claim's check failed or timed out. Ordering is
    /// preserved regardless of completion order.
    pub async fn check_all(&self, job_id: Uuid, claims: &[Claim]) -> Vec<Option<FactCheckResult>> {
        let mut results: Vec<Option<FactCheckResult>> =
            (0..claims.len()).map(|_| None).collect();
        if claims.is_empty() {
            return results;
        }

        tracing::info!(
            job_id = %job_id,
            claims = claims.len(),
            max_in_flight = self.max_in_flight,
            "Fact-checking claims"
        );

        let completed: Vec<(usize, Option<FactCheckResult>)> =
            stream::iter(claims.iter().enumerate())
                .map(|(index, claim)| async move {
                    let result = self.check_one(job_id, index, claim).await;
                    (index, result)
                })
                .buffer_unordered(self.max_in_flight)
                .collect()
                .await;

        for (index, result) in completed {
            results[index] = result;
        }
        results
    }

    /// Check one claim: search, then judge against the evidence
    async fn check_one(&self, job_id: Uuid, index: usize, claim: &Claim) -> Option<FactCheckResult> {
        let outcome = tokio::time::timeout(self.check_timeout, self.search_and_judge(claim)).await;

        let result = match outcome {
            Ok(Ok(result)) => Some(result),
            Ok(Err(e)) => {
                tracing::warn!(
                    job_id = %job_id,
                    claim_index = index,
                    error = %e,
                    "Fact-check failed for claim"
                );
                None
            }
            Err(_) => {
                tracing::warn!(
                    job_id = %job_id,
                    claim_index = index,
                    timeout_secs = self.check_timeout.as_secs(),
                    "Fact-check timed out for claim"
                );
                None
            }
        };

        self.event_bus.emit_lossy(AnalysisEvent::ClaimChecked {
            job_id,
            claim_index: index,
            verdict: result.as_ref().map(|r| r.verdict.clone()),
            timestamp: chrono::Utc::now(),
        });

        result
    }

    async fn search_and_judge(&self, claim: &Claim) -> Result<FactCheckResult, ServiceError> {
        let evidence = self.search.search(&claim.text).await?;

        if evidence.is_empty() {
            // A produced "unclear" result, not a gap: the check ran and the
            // web simply had nothing to say
            return Ok(FactCheckResult::unclear_no_sources());
        }

        self.engine.fact_check(claim, &evidence).await
    }
}
