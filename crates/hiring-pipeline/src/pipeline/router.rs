use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    CandidateFilter, CandidateId, CandidateUpdate, NewCandidate, Page, PipelineError, Stage,
    StageId, StageType,
};
use super::service::PipelineService;

/// Pipeline state shared across request handlers.
pub type SharedPipeline = Arc<Mutex<PipelineService>>;

pub fn shared(service: PipelineService) -> SharedPipeline {
    Arc::new(Mutex::new(service))
}

/// Router builder exposing the pipeline facade as JSON endpoints.
pub fn pipeline_router(pipeline: SharedPipeline) -> Router {
    Router::new()
        .route(
            "/api/v1/pipeline/stages",
            get(list_stages_handler).post(add_stage_handler),
        )
        .route(
            "/api/v1/pipeline/stages/:stage_id",
            patch(update_stage_handler).delete(delete_stage_handler),
        )
        .route(
            "/api/v1/pipeline/stages/:stage_id/reorder",
            post(reorder_stage_handler),
        )
        .route(
            "/api/v1/pipeline/candidates",
            get(list_candidates_handler).post(add_candidate_handler),
        )
        .route(
            "/api/v1/pipeline/candidates/:candidate_id",
            get(candidate_handler)
                .patch(update_candidate_handler)
                .delete(remove_candidate_handler),
        )
        .route(
            "/api/v1/pipeline/candidates/:candidate_id/move",
            post(move_candidate_handler),
        )
        .route(
            "/api/v1/pipeline/candidates/:candidate_id/reject",
            post(reject_candidate_handler),
        )
        .route(
            "/api/v1/pipeline/candidates/:candidate_id/assign",
            post(reassign_handler),
        )
        .route(
            "/api/v1/pipeline/candidates/:candidate_id/comments",
            post(comment_handler),
        )
        .route("/api/v1/pipeline/board", get(board_handler))
        .route("/api/v1/pipeline/summary", get(summary_handler))
        .route("/api/v1/pipeline/notifications", get(notifications_handler))
        .route(
            "/api/v1/pipeline/notifications/:notification_id",
            delete(dismiss_notification_handler),
        )
        .with_state(pipeline)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StageRequest {
    pub(crate) name: String,
    #[serde(rename = "type", default)]
    pub(crate) stage_type: StageType,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StageUpdateRequest {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(rename = "type", default)]
    pub(crate) stage_type: Option<StageType>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReorderRequest {
    pub(crate) target: StageId,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CandidateQuery {
    pub(crate) search: Option<String>,
    pub(crate) position: Option<String>,
    pub(crate) recruiter: Option<String>,
    pub(crate) stage: Option<u32>,
    pub(crate) page: Option<usize>,
    pub(crate) size: Option<usize>,
}

impl CandidateQuery {
    fn filter(&self) -> CandidateFilter {
        CandidateFilter {
            search: self.search.clone(),
            position: self.position.clone(),
            recruiter: self.recruiter.clone(),
            stage: self.stage.map(StageId),
        }
    }

    fn page(&self) -> Page {
        let defaults = Page::default();
        Page {
            number: self.page.unwrap_or(defaults.number),
            size: self.size.unwrap_or(defaults.size),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoveRequest {
    pub(crate) stage_id: StageId,
    #[serde(default)]
    pub(crate) note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignRequest {
    pub(crate) recruiter: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentRequest {
    pub(crate) author: String,
    pub(crate) text: String,
}

fn lock(pipeline: &SharedPipeline) -> MutexGuard<'_, PipelineService> {
    pipeline.lock().unwrap_or_else(PoisonError::into_inner)
}

fn error_response(error: PipelineError) -> Response {
    let status = match error {
        PipelineError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::DuplicateStageName(_) => StatusCode::CONFLICT,
        PipelineError::StageNotFound(_)
        | PipelineError::CandidateNotFound(_)
        | PipelineError::StageNameNotFound(_)
        | PipelineError::CandidateNameNotFound(_) => StatusCode::NOT_FOUND,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, PipelineError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_stages_handler(State(pipeline): State<SharedPipeline>) -> Response {
    let stages = lock(&pipeline).list_stages().to_vec();
    (StatusCode::OK, Json(stages)).into_response()
}

pub(crate) async fn add_stage_handler(
    State(pipeline): State<SharedPipeline>,
    Json(request): Json<StageRequest>,
) -> Response {
    let result = lock(&pipeline).add_stage(&request.name, request.stage_type);
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn update_stage_handler(
    State(pipeline): State<SharedPipeline>,
    Path(stage_id): Path<u32>,
    Json(request): Json<StageUpdateRequest>,
) -> Response {
    let result = apply_stage_update(&mut lock(&pipeline), StageId(stage_id), request);
    respond(StatusCode::OK, result)
}

fn apply_stage_update(
    service: &mut PipelineService,
    id: StageId,
    request: StageUpdateRequest,
) -> Result<Stage, PipelineError> {
    if let Some(name) = request.name.as_deref() {
        service.rename_stage(id, name)?;
    }
    if let Some(stage_type) = request.stage_type {
        service.set_stage_type(id, stage_type)?;
    }
    service.stage(id).cloned()
}

pub(crate) async fn reorder_stage_handler(
    State(pipeline): State<SharedPipeline>,
    Path(stage_id): Path<u32>,
    Json(request): Json<ReorderRequest>,
) -> Response {
    let mut service = lock(&pipeline);
    let result = service
        .reorder_stage(StageId(stage_id), request.target)
        .map(|()| service.list_stages().to_vec());
    respond(StatusCode::OK, result)
}

pub(crate) async fn delete_stage_handler(
    State(pipeline): State<SharedPipeline>,
    Path(stage_id): Path<u32>,
) -> Response {
    let result = lock(&pipeline).delete_stage(StageId(stage_id));
    respond(StatusCode::OK, result)
}

pub(crate) async fn list_candidates_handler(
    State(pipeline): State<SharedPipeline>,
    Query(query): Query<CandidateQuery>,
) -> Response {
    let page = lock(&pipeline).candidates_page(&query.filter(), query.page());
    (StatusCode::OK, Json(page)).into_response()
}

pub(crate) async fn add_candidate_handler(
    State(pipeline): State<SharedPipeline>,
    Json(fields): Json<NewCandidate>,
) -> Response {
    let result = lock(&pipeline).add_candidate(fields);
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn candidate_handler(
    State(pipeline): State<SharedPipeline>,
    Path(candidate_id): Path<u64>,
) -> Response {
    let result = lock(&pipeline)
        .candidate(CandidateId(candidate_id))
        .cloned();
    respond(StatusCode::OK, result)
}

pub(crate) async fn update_candidate_handler(
    State(pipeline): State<SharedPipeline>,
    Path(candidate_id): Path<u64>,
    Json(update): Json<CandidateUpdate>,
) -> Response {
    let result = lock(&pipeline).update_candidate(CandidateId(candidate_id), update);
    respond(StatusCode::OK, result)
}

pub(crate) async fn remove_candidate_handler(
    State(pipeline): State<SharedPipeline>,
    Path(candidate_id): Path<u64>,
) -> Response {
    match lock(&pipeline).remove_candidate(CandidateId(candidate_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn move_candidate_handler(
    State(pipeline): State<SharedPipeline>,
    Path(candidate_id): Path<u64>,
    Json(request): Json<MoveRequest>,
) -> Response {
    let id = CandidateId(candidate_id);
    let mut service = lock(&pipeline);
    let result = match request.note.as_deref() {
        Some(note) => service.move_candidate_with_note(id, request.stage_id, note),
        None => service.move_candidate(id, request.stage_id),
    };
    respond(StatusCode::OK, result)
}

pub(crate) async fn reject_candidate_handler(
    State(pipeline): State<SharedPipeline>,
    Path(candidate_id): Path<u64>,
) -> Response {
    let result = lock(&pipeline).reject(CandidateId(candidate_id));
    respond(StatusCode::OK, result)
}

pub(crate) async fn reassign_handler(
    State(pipeline): State<SharedPipeline>,
    Path(candidate_id): Path<u64>,
    Json(request): Json<AssignRequest>,
) -> Response {
    let result = lock(&pipeline).reassign(CandidateId(candidate_id), &request.recruiter);
    respond(StatusCode::OK, result)
}

pub(crate) async fn comment_handler(
    State(pipeline): State<SharedPipeline>,
    Path(candidate_id): Path<u64>,
    Json(request): Json<CommentRequest>,
) -> Response {
    let result =
        lock(&pipeline).add_comment(CandidateId(candidate_id), &request.author, &request.text);
    respond(StatusCode::CREATED, result)
}

pub(crate) async fn board_handler(
    State(pipeline): State<SharedPipeline>,
    Query(query): Query<CandidateQuery>,
) -> Response {
    let board = lock(&pipeline).board(&query.filter());
    (StatusCode::OK, Json(board)).into_response()
}

pub(crate) async fn summary_handler(State(pipeline): State<SharedPipeline>) -> Response {
    let summary = lock(&pipeline).summary();
    (StatusCode::OK, Json(summary)).into_response()
}

pub(crate) async fn notifications_handler(State(pipeline): State<SharedPipeline>) -> Response {
    let notifications = lock(&pipeline).notifications();
    (StatusCode::OK, Json(notifications)).into_response()
}

pub(crate) async fn dismiss_notification_handler(
    State(pipeline): State<SharedPipeline>,
    Path(notification_id): Path<u64>,
) -> Response {
    if lock(&pipeline).dismiss_notification(notification_id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        let payload = json!({ "error": format!("notification {notification_id} not found") });
        (StatusCode::NOT_FOUND, Json(payload)).into_response()
    }
}
