use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    Candidate, CandidateId, PipelineError, StageId, TimelineEntry, TimelineStatus,
};
use super::stages::StageRegistry;

/// Record of a stage change applied to a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub candidate_id: CandidateId,
    pub candidate_name: String,
    pub from: StageId,
    pub to: StageId,
    pub stage_name: String,
    pub entry: TimelineEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    Moved(Transition),
    /// Target equals the current stage; nothing was recorded.
    Unchanged,
}

impl TransitionOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved(_))
    }
}

/// Moves candidates between stages of a registry.
///
/// Any stage may follow any other: backward moves, skips, and moves out of `Final` stages are all
/// accepted.
#[derive(Debug, Clone, Copy)]
pub struct TransitionEngine<'a> {
    registry: &'a StageRegistry,
}

impl<'a> TransitionEngine<'a> {
    pub fn new(registry: &'a StageRegistry) -> Self {
        Self { registry }
    }

    /// Apply a move. The previous current entry is marked completed and a new current entry is
    /// appended, noted `Moved to <stage>` unless `note` overrides it.
    pub fn apply(
        &self,
        candidate: &mut Candidate,
        target: StageId,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, PipelineError> {
        let stage = self
            .registry
            .get(target)
            .ok_or(PipelineError::StageNotFound(target))?;

        if candidate.current_stage == target {
            return Ok(TransitionOutcome::Unchanged);
        }

        for entry in candidate
            .timeline
            .iter_mut()
            .filter(|entry| entry.status == TimelineStatus::Current)
        {
            entry.status = TimelineStatus::Completed;
        }

        let note = note
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Moved to {}", stage.name));

        let entry = TimelineEntry {
            stage_id: stage.id,
            stage: stage.name.clone(),
            date: now.date_naive(),
            note,
            status: TimelineStatus::Current,
        };

        let from = candidate.current_stage;
        candidate.current_stage = target;
        candidate.timeline.push(entry.clone());
        candidate.last_activity = now;

        Ok(TransitionOutcome::Moved(Transition {
            candidate_id: candidate.id,
            candidate_name: candidate.name.clone(),
            from,
            to: target,
            stage_name: stage.name.clone(),
            entry,
        }))
    }
}
