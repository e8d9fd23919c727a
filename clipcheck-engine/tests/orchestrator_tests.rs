//! End-to-end pipeline tests against scripted collaborators

mod helpers;

use clipcheck_common::events::{AnalysisEvent, AnalysisPhase, EventBus};
use clipcheck_engine::models::{
    AnalysisJob, AnalysisTrack, FactCheckResult, SpliceSignal, Verdict,
};
use clipcheck_engine::AnalysisError;
use helpers::*;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_happy_path_real_verdict_with_one_failed_claim() {
    init_tracing();
    let mut fixture = Fixture::quiet(&["c0", "c1", "c2"]);
    fixture.engine.fact_checks.insert(
        "c0".to_string(),
        Behavior::Ok(FactCheckResult::new("True", 90.0, "confirmed")),
    );
    fixture.engine.fact_checks.insert(
        "c1".to_string(),
        Behavior::Ok(FactCheckResult::new("True", 85.0, "confirmed")),
    );
    fixture
        .engine
        .fact_checks
        .insert("c2".to_string(), Behavior::Fail("model hiccup".to_string()));

    let orchestrator = fixture.build(EventBus::new(256));
    let report = orchestrator
        .analyze_fact_check(&video_bytes(), Some("flood caption".to_string()), None)
        .await
        .unwrap();

    let report = report.as_fact_check().expect("fact-check shaped report");
    assert_eq!(report.final_verdict.verdict, Verdict::Real);
    assert_eq!(report.final_verdict.avg_factcheck_confidence, 87.5);
    assert_eq!(report.fact_checks.len(), 3);
    assert!(report.fact_checks[0].is_some());
    assert!(report.fact_checks[1].is_some());
    assert!(report.fact_checks[2].is_none());
    assert_eq!(report.claims.len(), 3);
    assert!(report.splice.is_some());
    assert!(report.timeline.is_some());
    assert!(report.metadata.is_some());
    assert!(!report.summary.is_empty());
    assert!(!report.top_reasons.is_empty());
}

#[tokio::test]
async fn test_high_splice_risk_yields_misleading() {
    let mut fixture = Fixture::quiet(&["c0", "c1"]);
    fixture.understanding.splice = Behavior::Ok(SpliceSignal {
        has_sudden_shifts: true,
        risk_score: 70.0,
        summary: "two unrelated events cut together".to_string(),
    });

    let orchestrator = fixture.build(EventBus::new(256));
    let report = orchestrator
        .analyze_fact_check(&video_bytes(), None, None)
        .await
        .unwrap();

    let report = report.as_fact_check().unwrap();
    assert_eq!(report.final_verdict.verdict, Verdict::Misleading);
    assert_eq!(report.final_verdict.splice_risk_score, 70.0);
    assert!(report.final_verdict.misinformation_risk_score < 10.0);
}

#[tokio::test]
async fn test_understanding_failure_is_critical_for_fact_check_only() {
    let mut fixture = Fixture::quiet(&["c0"]);
    fixture.understanding.understand = Behavior::Fail("index service down".to_string());

    let orchestrator = fixture.build(EventBus::new(256));
    let error = orchestrator
        .analyze_fact_check(&video_bytes(), None, None)
        .await
        .unwrap_err();

    match error {
        AnalysisError::CriticalPhaseFailed { phase, cause } => {
            assert_eq!(phase, AnalysisPhase::Understanding);
            assert!(cause.contains("index service down"));
        }
        other => panic!("expected CriticalPhaseFailed, got {:?}", other),
    }

    // Same broken understanding service: the detection track never touches
    // it and must still produce a report
    let mut fixture = Fixture::quiet(&["c0"]);
    fixture.understanding.understand = Behavior::Fail("index service down".to_string());
    let orchestrator = fixture.build(EventBus::new(256));

    let report = orchestrator.analyze_ai_detection(&video_bytes()).await;
    assert!(report.is_ok(), "ai-detection track must not fail: {:?}", report.err());
}

#[tokio::test]
async fn test_degraded_phases_leave_absent_fields_but_job_succeeds() {
    let mut fixture = Fixture::quiet(&["c0"]);
    fixture.probe.behavior = Behavior::NotAvailable;
    fixture.understanding.splice = Behavior::NotAvailable;
    fixture.engine.timeline = Behavior::Fail("timeline pass crashed".to_string());

    let orchestrator = fixture.build(EventBus::new(256));
    let report = orchestrator
        .analyze_fact_check(&video_bytes(), None, None)
        .await
        .unwrap();

    let report = report.as_fact_check().unwrap();
    // Absent signals are distinguishable from computed zeros
    assert!(report.splice.is_none());
    assert!(report.timeline.is_none());
    assert!(report.metadata.is_none());
    assert_eq!(report.final_verdict.splice_risk_score, 0.0);
    assert_eq!(report.final_verdict.timeline_mismatch_risk_score, 0.0);
    assert_eq!(report.final_verdict.verdict, Verdict::Real);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_phase_times_out_and_degrades() {
    let mut fixture = Fixture::quiet(&["c0"]);
    fixture.understanding.splice = Behavior::Hang;
    fixture.phase_timeout = Duration::from_millis(200);

    let orchestrator = fixture.build(EventBus::new(256));
    let report = orchestrator
        .analyze_fact_check(&video_bytes(), None, None)
        .await
        .unwrap();

    let report = report.as_fact_check().unwrap();
    assert!(report.splice.is_none());
    assert_eq!(report.final_verdict.splice_risk_score, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_job_deadline_yields_timed_out() {
    let mut fixture = Fixture::quiet(&["c0"]);
    fixture.understanding.understand = Behavior::Hang;
    fixture.job_timeout = Duration::from_millis(100);
    // Phase budget larger than the job budget: the overall deadline wins
    fixture.phase_timeout = Duration::from_secs(60);

    let orchestrator = fixture.build(EventBus::new(256));
    let error = orchestrator
        .analyze_fact_check(&video_bytes(), None, None)
        .await
        .unwrap_err();

    assert!(matches!(error, AnalysisError::JobTimedOut { .. }));
}

#[tokio::test]
async fn test_caller_cancellation_aborts_job() {
    let fixture = Fixture::quiet(&["c0"]);
    let orchestrator = fixture.build(EventBus::new(256));

    let job = AnalysisJob::new(
        AnalysisTrack::FactCheck,
        None,
        None,
        Duration::from_secs(60),
    );
    let token = CancellationToken::new();
    token.cancel();

    let error = orchestrator
        .run(job, &video_bytes(), token)
        .await
        .unwrap_err();
    match error {
        AnalysisError::JobTimedOut { cause } => assert!(cause.contains("cancelled")),
        other => panic!("expected JobTimedOut, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_input_rejected() {
    let orchestrator = Fixture::quiet(&[]).build(EventBus::new(64));
    let error = orchestrator
        .analyze_fact_check(&[], None, None)
        .await
        .unwrap_err();
    assert!(matches!(error, AnalysisError::InvalidInput(_)));
}

#[tokio::test]
async fn test_detection_or_policy_with_model_disagreement() {
    // Provenance markers present; model says not-AI with trust 90
    let mut fixture = Fixture::quiet(&[]);
    fixture.probe.behavior = Behavior::Ok(metadata_with_manifest(ai_manifest()));
    fixture.engine.judgment = Behavior::Ok(clipcheck_engine::models::ModelTrustSignal {
        is_ai: false,
        trust_score: 90.0,
        confidence: 80.0,
        note: "looks camera-original".to_string(),
    });

    let orchestrator = fixture.build(EventBus::new(256));
    let report = orchestrator.analyze_ai_detection(&video_bytes()).await.unwrap();
    let report = report.as_detection().unwrap();

    assert!(report.is_ai_generated, "provenance markers must win the OR");
    assert_eq!(report.trust_score, 90.0, "model value still passes through");
    assert!(report.provenance.as_ref().unwrap().ai_markers_present);
}

#[tokio::test]
async fn test_detection_model_unavailable_defaults_to_zero_scores() {
    let mut fixture = Fixture::quiet(&[]);
    fixture.probe.behavior = Behavior::Ok(metadata_with_manifest(ai_manifest()));
    fixture.engine.judgment = Behavior::NotAvailable;

    let orchestrator = fixture.build(EventBus::new(256));
    let report = orchestrator.analyze_ai_detection(&video_bytes()).await.unwrap();
    let report = report.as_detection().unwrap();

    assert!(report.is_ai_generated);
    assert_eq!(report.trust_score, 0.0);
    assert_eq!(report.confidence, 0.0);
    assert!(report.model_trust.is_none());
}

#[tokio::test]
async fn test_ai_markers_make_fact_check_track_misleading() {
    let mut fixture = Fixture::quiet(&["c0"]);
    fixture.probe.behavior = Behavior::Ok(metadata_with_manifest(ai_manifest()));

    let orchestrator = fixture.build(EventBus::new(256));
    let report = orchestrator
        .analyze_fact_check(&video_bytes(), None, None)
        .await
        .unwrap();

    let report = report.as_fact_check().unwrap();
    assert_eq!(report.final_verdict.verdict, Verdict::Misleading);
    assert!(report.provenance.as_ref().unwrap().ai_markers_present);
}

#[tokio::test]
async fn test_high_confidence_false_claim_yields_fake_with_correction() {
    let mut fixture = Fixture::quiet(&["the dam failed in 2020", "c1"]);
    let mut wrong = FactCheckResult::new("false", 88.0, "sources date the failure to 2017");
    wrong.correction = Some("The dam failure occurred in 2017.".to_string());
    fixture
        .engine
        .fact_checks
        .insert("the dam failed in 2020".to_string(), Behavior::Ok(wrong));

    let orchestrator = fixture.build(EventBus::new(256));
    let report = orchestrator
        .analyze_fact_check(&video_bytes(), None, None)
        .await
        .unwrap();

    let report = report.as_fact_check().unwrap();
    assert_eq!(report.final_verdict.verdict, Verdict::Fake);
    assert_eq!(report.corrections.len(), 1);
    assert_eq!(report.corrections[0].incorrect_claim, "the dam failed in 2020");
}

#[tokio::test]
async fn test_progress_events_follow_real_phase_transitions() {
    let event_bus = EventBus::new(1024);
    let mut rx = event_bus.subscribe();

    let orchestrator = Fixture::quiet(&["c0"]).build(event_bus);
    orchestrator
        .analyze_fact_check(&video_bytes(), None, None)
        .await
        .unwrap();

    let mut started_phases = Vec::new();
    let mut completed_job = false;
    let mut saw_job_started = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            AnalysisEvent::JobStarted { track, .. } => {
                saw_job_started = true;
                assert_eq!(track, "factcheck");
            }
            AnalysisEvent::PhaseStarted { phase, .. } => started_phases.push(phase),
            AnalysisEvent::JobCompleted { verdict, .. } => {
                completed_job = true;
                assert_eq!(verdict, "REAL");
            }
            _ => {}
        }
    }

    assert!(saw_job_started);
    assert!(completed_job);
    for phase in [
        AnalysisPhase::MetadataProbe,
        AnalysisPhase::Understanding,
        AnalysisPhase::ClaimExtraction,
        AnalysisPhase::FactCheck,
        AnalysisPhase::Splice,
        AnalysisPhase::Timeline,
        AnalysisPhase::ModelJudgment,
        AnalysisPhase::Fusion,
    ] {
        assert!(
            started_phases.contains(&phase),
            "missing phase start event for {}",
            phase
        );
    }
}

#[tokio::test]
async fn test_claim_extraction_failure_degrades_to_empty_claims() {
    let mut fixture = Fixture::quiet(&[]);
    fixture.engine.extraction = Behavior::Fail("structuring pass failed".to_string());

    let orchestrator = fixture.build(EventBus::new(256));
    let report = orchestrator
        .analyze_fact_check(&video_bytes(), None, None)
        .await
        .unwrap();

    let report = report.as_fact_check().unwrap();
    assert!(report.claims.is_empty());
    assert!(report.fact_checks.is_empty());
    assert_eq!(report.final_verdict.avg_factcheck_confidence, 0.0);
    // No evidence either way: degraded inputs cannot push past REAL
    assert_eq!(report.final_verdict.verdict, Verdict::Real);
}
