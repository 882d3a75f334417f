use crate::infra::{build_pipeline, parse_stage_type};
use clap::Args;
use hiring_pipeline::config::PipelineConfig;
use hiring_pipeline::error::AppError;
use hiring_pipeline::pipeline::{
    CandidateFilter, CandidateId, PipelineBoard, PipelineError, PipelineService, PipelineSummary,
    StageId, StageType, TransitionOutcome,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Only show candidates whose name or role contains this text.
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Append an extra stage to the default layout before the walkthrough.
    #[arg(long)]
    pub(crate) extra_stage: Option<String>,
    /// Type for --extra-stage (Screening, Interview, Decision, Final).
    #[arg(long, value_parser = parse_stage_type, default_value = "Interview")]
    pub(crate) extra_stage_type: StageType,
    /// Print the board and summary as JSON instead of text.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let mut service = build_pipeline(&PipelineConfig::default(), true)?;

    if let Some(name) = args.extra_stage.as_deref() {
        service.add_stage(name, args.extra_stage_type)?;
    }

    let activity = walkthrough(&mut service)?;

    let filter = CandidateFilter {
        search: args.search,
        ..CandidateFilter::default()
    };
    let board = service.board(&filter);
    let summary = service.summary();

    if args.json {
        let payload = serde_json::json!({ "board": board, "summary": summary });
        let rendered = serde_json::to_string_pretty(&payload).map_err(std::io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Hiring Pipeline Demo");
    println!("====================\n");
    println!("Activity:");
    for line in &activity {
        println!("  - {line}");
    }
    if let Some(toast) = service.current_toast() {
        println!("\nToast: {}", toast.message);
    }

    render_board(&board);
    render_summary(&summary);
    Ok(())
}

/// Scripted moves on top of the demo roster. Returns the notification messages it produced.
fn walkthrough(service: &mut PipelineService) -> Result<Vec<String>, PipelineError> {
    let phone_screen = stage_id(service, "Phone Screen")?;
    let interview = stage_id(service, "Interview")?;

    let priya = candidate_id(service, "Priya Singh")?;
    let vikram = candidate_id(service, "Vikram Gupta")?;
    let aisha = candidate_id(service, "Aisha Sharma")?;

    service.move_candidate(priya, phone_screen)?;
    if let TransitionOutcome::Unchanged = service.move_candidate(priya, phone_screen)? {
        tracing::debug!("repeat move ignored");
    }
    service.move_candidate_with_note(aisha, interview, "Strong screening call")?;
    service.add_comment(aisha, "Kavya Iyer", "Schedule the system design round")?;
    service.reassign(vikram, "Arjun Patel")?;
    service.reject(vikram)?;

    Ok(service
        .notifications()
        .into_iter()
        .map(|notification| notification.message)
        .collect())
}

fn stage_id(service: &PipelineService, name: &str) -> Result<StageId, PipelineError> {
    service
        .registry()
        .find_by_name(name)
        .map(|stage| stage.id)
        .ok_or_else(|| PipelineError::StageNameNotFound(name.to_string()))
}

fn candidate_id(service: &PipelineService, name: &str) -> Result<CandidateId, PipelineError> {
    service
        .list_candidates(&CandidateFilter::search(name))
        .first()
        .map(|candidate| candidate.id)
        .ok_or_else(|| PipelineError::CandidateNameNotFound(name.to_string()))
}

fn render_board(board: &PipelineBoard) {
    println!("\nBoard ({} candidates shown):", board.total);
    for column in &board.columns {
        println!(
            "  {}. {} [{}] ({})",
            column.order,
            column.name,
            column.stage_type_label,
            column.candidates.len()
        );
        for card in &column.candidates {
            println!(
                "     {} {} - {} | {} | {} comments{}",
                card.initials,
                card.name,
                card.position,
                card.assigned_recruiter,
                card.comment_count,
                card.last_note
                    .as_deref()
                    .map(|note| format!(" | {note}"))
                    .unwrap_or_default()
            );
        }
    }

    for column in &board.orphaned {
        println!(
            "  (deleted {}) {} candidates",
            column.stage_id,
            column.candidates.len()
        );
    }
}

fn render_summary(summary: &PipelineSummary) {
    println!("\nSummary:");
    println!("  Total candidates: {}", summary.total_candidates);
    for entry in &summary.by_type {
        println!("  {:<10} {}", entry.label, entry.count);
    }
    if summary.orphaned > 0 {
        println!("  Orphaned: {}", summary.orphaned);
    }
}
