use crate::cli::ServeArgs;
use crate::infra::{build_pipeline, AppState};
use crate::routes::with_pipeline_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hiring_pipeline::config::AppConfig;
use hiring_pipeline::error::AppError;
use hiring_pipeline::pipeline::shared;
use hiring_pipeline::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let seed_demo = args.seed_demo || config.pipeline.seed_demo;
    let pipeline = shared(build_pipeline(&config.pipeline, seed_demo)?);

    let app = with_pipeline_routes(pipeline)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, seed_demo, "hiring pipeline ready");

    axum::serve(listener, app).await?;
    Ok(())
}
