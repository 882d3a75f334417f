use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::pipeline::clock::ManualClock;
use crate::pipeline::domain::{Candidate, NewCandidate, StageId, StageType};
use crate::pipeline::service::{PipelineOptions, PipelineService};

pub(super) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

/// Service on a manual clock with the four-stage layout used across these tests.
pub(super) fn board() -> (PipelineService, Arc<ManualClock>, [StageId; 4]) {
    let clock = Arc::new(ManualClock::new(start()));
    let mut service = PipelineService::with_clock(PipelineOptions::default(), clock.clone());

    let applied = service
        .add_stage("Applied", StageType::Screening)
        .expect("applied stage");
    let interview = service
        .add_stage("Interview", StageType::Interview)
        .expect("interview stage");
    let offer = service
        .add_stage("Offer", StageType::Decision)
        .expect("offer stage");
    let rejected = service
        .add_stage("Rejected", StageType::Final)
        .expect("rejected stage");

    (
        service,
        clock,
        [applied.id, interview.id, offer.id, rejected.id],
    )
}

pub(super) fn applicant(name: &str, position: &str, stage: StageId) -> NewCandidate {
    let mut fields = NewCandidate::new(name, position, "Priya Nair", stage);
    fields.email = Some(format!(
        "{}@email.com",
        name.to_ascii_lowercase().replace(' ', ".")
    ));
    fields
}

pub(super) fn add(service: &mut PipelineService, name: &str, stage: StageId) -> Candidate {
    service
        .add_candidate(applicant(name, "Backend Developer", stage))
        .expect("candidate added")
}

pub(super) fn assert_single_current(candidate: &Candidate) {
    let current: Vec<_> = candidate
        .timeline()
        .iter()
        .filter(|entry| entry.status == crate::pipeline::TimelineStatus::Current)
        .collect();
    assert_eq!(current.len(), 1, "exactly one current timeline entry");
    assert_eq!(current[0].stage_id, candidate.current_stage());
    assert_eq!(
        candidate.timeline().last().map(|entry| entry.stage_id),
        Some(candidate.current_stage())
    );
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
