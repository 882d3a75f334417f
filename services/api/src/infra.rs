use hiring_pipeline::config::PipelineConfig;
use hiring_pipeline::pipeline::{seed, PipelineError, PipelineOptions, PipelineService, StageType};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Fresh pipeline with the default seven stages, plus the demo roster when `seed_demo` is set.
pub(crate) fn build_pipeline(
    config: &PipelineConfig,
    seed_demo: bool,
) -> Result<PipelineService, PipelineError> {
    let mut service = PipelineService::new(PipelineOptions::from(config));
    let stages = seed::install_default_stages(&mut service)?;

    let candidates = if seed_demo {
        seed::seed_demo_candidates(&mut service)?
    } else {
        0
    };

    info!(
        stages = stages.len(),
        candidates,
        unique_stage_names = config.unique_stage_names,
        "pipeline initialised"
    );
    Ok(service)
}

pub(crate) fn parse_stage_type(raw: &str) -> Result<StageType, String> {
    StageType::ordered()
        .into_iter()
        .find(|stage_type| stage_type.label().eq_ignore_ascii_case(raw.trim()))
        .ok_or_else(|| format!("'{raw}' is not one of Screening, Interview, Decision, Final"))
}
