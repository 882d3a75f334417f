use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use hiring_pipeline::pipeline::{pipeline_router, SharedPipeline, StageType};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
pub(crate) struct StageTypeView {
    pub(crate) value: StageType,
    pub(crate) label: &'static str,
}

pub(crate) fn with_pipeline_routes(pipeline: SharedPipeline) -> axum::Router {
    pipeline_router(pipeline)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/pipeline/stage-types",
            axum::routing::get(stage_types_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Options for the stage type picker.
pub(crate) async fn stage_types_endpoint() -> Json<Vec<StageTypeView>> {
    Json(
        StageType::ordered()
            .into_iter()
            .map(|stage_type| StageTypeView {
                value: stage_type,
                label: stage_type.label(),
            })
            .collect(),
    )
}
