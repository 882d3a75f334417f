use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::candidates::CandidateStore;
use super::clock::{Clock, SystemClock};
use super::domain::{
    Candidate, CandidateFilter, CandidateId, CandidateUpdate, Comment, NewCandidate, Page,
    Paginated, PipelineError, Stage, StageId, StageType,
};
use super::notifications::{
    Listener, Notification, NotificationHub, PipelineEvent, Subscription,
    DEFAULT_NOTIFICATION_TTL_MS, MAX_NOTIFICATION_TTL_MS,
};
use super::stages::StageRegistry;
use super::transition::{TransitionEngine, TransitionOutcome};
use super::views::{PipelineBoard, PipelineSummary};
use crate::config::PipelineConfig;

const REJECTED_STAGE: &str = "Rejected";
const QUICK_REJECT_NOTE: &str = "Candidate rejected from quick actions";

/// Tunables for a [`PipelineService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub unique_stage_names: bool,
    pub notification_ttl: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            unique_stage_names: true,
            notification_ttl: Duration::milliseconds(DEFAULT_NOTIFICATION_TTL_MS as i64),
        }
    }
}

impl From<&PipelineConfig> for PipelineOptions {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            unique_stage_names: config.unique_stage_names,
            notification_ttl: Duration::milliseconds(
                config.notification_ttl_ms.min(MAX_NOTIFICATION_TTL_MS) as i64,
            ),
        }
    }
}

/// Result of deleting a stage. Candidates that sat in it keep pointing at the removed id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRemoval {
    pub stage: Stage,
    pub orphaned: Vec<CandidateId>,
}

/// Facade composing the stage registry, candidate store, transition engine, and notification
/// hub. Single writer: callers sharing it across threads wrap it in a lock.
pub struct PipelineService {
    stages: StageRegistry,
    candidates: CandidateStore,
    notifications: NotificationHub,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for PipelineService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineService")
            .field("stages", &self.stages.len())
            .field("candidates", &self.candidates.len())
            .field("notifications", &self.notifications)
            .finish()
    }
}

impl Default for PipelineService {
    fn default() -> Self {
        Self::new(PipelineOptions::default())
    }
}

impl PipelineService {
    pub fn new(options: PipelineOptions) -> Self {
        Self::with_clock(options, Arc::new(SystemClock))
    }

    pub fn with_clock(options: PipelineOptions, clock: Arc<dyn Clock>) -> Self {
        Self {
            stages: StageRegistry::new(options.unique_stage_names),
            candidates: CandidateStore::default(),
            notifications: NotificationHub::new(options.notification_ttl),
            clock,
        }
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.stages
    }

    pub fn store(&self) -> &CandidateStore {
        &self.candidates
    }

    // Stage registry

    pub fn list_stages(&self) -> &[Stage] {
        self.stages.list()
    }

    pub fn stage(&self, id: StageId) -> Result<&Stage, PipelineError> {
        self.stages.get(id).ok_or(PipelineError::StageNotFound(id))
    }

    pub fn add_stage(&mut self, name: &str, stage_type: StageType) -> Result<Stage, PipelineError> {
        let stage = self.stages.add(name, stage_type)?;
        info!(stage_id = %stage.id, name = %stage.name, order = stage.order, "stage added");
        Ok(stage)
    }

    pub fn rename_stage(&mut self, id: StageId, name: &str) -> Result<(), PipelineError> {
        self.stages.rename(id, name)?;
        info!(stage_id = %id, name = %name.trim(), "stage renamed");
        Ok(())
    }

    pub fn set_stage_type(
        &mut self,
        id: StageId,
        stage_type: StageType,
    ) -> Result<(), PipelineError> {
        self.stages.set_type(id, stage_type)?;
        info!(stage_id = %id, stage_type = stage_type.label(), "stage type changed");
        Ok(())
    }

    pub fn reorder_stage(&mut self, dragged: StageId, target: StageId) -> Result<(), PipelineError> {
        self.stages.reorder(dragged, target)?;
        info!(dragged = %dragged, target = %target, "stages reordered");
        Ok(())
    }

    /// Remove a stage. Its candidates are neither deleted nor reassigned.
    pub fn delete_stage(&mut self, id: StageId) -> Result<StageRemoval, PipelineError> {
        let stage = self.stages.remove(id)?;
        let orphaned: Vec<CandidateId> = self
            .candidates
            .in_stage(id)
            .iter()
            .map(|candidate| candidate.id)
            .collect();

        if orphaned.is_empty() {
            info!(stage_id = %id, name = %stage.name, "stage deleted");
        } else {
            warn!(
                stage_id = %id,
                name = %stage.name,
                orphaned = orphaned.len(),
                "stage deleted while candidates still assigned"
            );
        }

        Ok(StageRemoval { stage, orphaned })
    }

    // Candidate records

    pub fn candidate(&self, id: CandidateId) -> Result<&Candidate, PipelineError> {
        self.candidates
            .get(id)
            .ok_or(PipelineError::CandidateNotFound(id))
    }

    pub fn list_candidates(&self, filter: &CandidateFilter) -> Vec<&Candidate> {
        self.candidates.filter(filter)
    }

    pub fn candidates_page(&self, filter: &CandidateFilter, page: Page) -> Paginated<Candidate> {
        let matches = self
            .candidates
            .filter(filter)
            .into_iter()
            .cloned()
            .collect();
        Paginated::from_items(matches, page)
    }

    pub fn group_by_stage(&self) -> BTreeMap<StageId, Vec<&Candidate>> {
        self.candidates.group_by_stage(&self.stages)
    }

    pub fn orphaned_candidates(&self) -> Vec<&Candidate> {
        self.candidates.orphaned(&self.stages)
    }

    pub fn add_candidate(&mut self, fields: NewCandidate) -> Result<Candidate, PipelineError> {
        let stage = self
            .stages
            .get(fields.stage)
            .ok_or(PipelineError::StageNotFound(fields.stage))?
            .clone();
        let now = self.clock.now();
        let candidate = self.candidates.insert(fields, &stage, now)?.clone();

        info!(
            candidate_id = %candidate.id,
            stage_id = %stage.id,
            recruiter = %candidate.assigned_recruiter,
            "candidate added"
        );
        self.notify(PipelineEvent::CandidateAdded {
            candidate_id: candidate.id,
            candidate_name: candidate.name.clone(),
            stage_name: stage.name,
        });

        Ok(candidate)
    }

    pub fn update_candidate(
        &mut self,
        id: CandidateId,
        update: CandidateUpdate,
    ) -> Result<Candidate, PipelineError> {
        let now = self.clock.now();
        let candidate = self.candidates.update(id, update, now)?.clone();
        info!(candidate_id = %id, "candidate updated");
        Ok(candidate)
    }

    pub fn remove_candidate(&mut self, id: CandidateId) -> Result<Candidate, PipelineError> {
        let candidate = self.candidates.remove(id)?;
        info!(candidate_id = %id, "candidate removed");
        Ok(candidate)
    }

    pub fn reassign(
        &mut self,
        id: CandidateId,
        recruiter: &str,
    ) -> Result<Candidate, PipelineError> {
        let now = self.clock.now();
        let candidate = self.candidates.reassign(id, recruiter, now)?.clone();

        info!(candidate_id = %id, recruiter = %candidate.assigned_recruiter, "candidate reassigned");
        self.notify(PipelineEvent::CandidateAssigned {
            candidate_id: id,
            candidate_name: candidate.name.clone(),
            recruiter: candidate.assigned_recruiter.clone(),
        });

        Ok(candidate)
    }

    pub fn add_comment(
        &mut self,
        id: CandidateId,
        author: &str,
        text: &str,
    ) -> Result<Comment, PipelineError> {
        let now = self.clock.now();
        let comment = self.candidates.add_comment(id, author, text, now)?;
        let candidate_name = self.candidate(id)?.name.clone();

        info!(candidate_id = %id, author = %comment.author, "comment added");
        self.notify(PipelineEvent::CommentAdded {
            candidate_id: id,
            candidate_name,
            author: comment.author.clone(),
        });

        Ok(comment)
    }

    // Transitions

    pub fn move_candidate(
        &mut self,
        id: CandidateId,
        target: StageId,
    ) -> Result<TransitionOutcome, PipelineError> {
        self.transition(id, target, None)
    }

    /// Same as [`Self::move_candidate`] with a custom timeline note.
    pub fn move_candidate_with_note(
        &mut self,
        id: CandidateId,
        target: StageId,
        note: &str,
    ) -> Result<TransitionOutcome, PipelineError> {
        self.transition(id, target, Some(note))
    }

    /// Move a candidate into the stage named `Rejected`.
    pub fn reject(&mut self, id: CandidateId) -> Result<TransitionOutcome, PipelineError> {
        let target = self
            .stages
            .find_by_name(REJECTED_STAGE)
            .map(|stage| stage.id)
            .ok_or_else(|| PipelineError::StageNameNotFound(REJECTED_STAGE.to_string()))?;
        self.transition(id, target, Some(QUICK_REJECT_NOTE))
    }

    fn transition(
        &mut self,
        id: CandidateId,
        target: StageId,
        note: Option<&str>,
    ) -> Result<TransitionOutcome, PipelineError> {
        let now = self.clock.now();
        let candidate = self.candidates.get_mut(id)?;
        let outcome = TransitionEngine::new(&self.stages).apply(candidate, target, note, now)?;

        match &outcome {
            TransitionOutcome::Moved(transition) => {
                info!(
                    candidate_id = %id,
                    from = %transition.from,
                    to = %transition.to,
                    "candidate moved"
                );
                self.notify(PipelineEvent::CandidateMoved {
                    candidate_id: id,
                    candidate_name: transition.candidate_name.clone(),
                    stage_id: transition.to,
                    stage_name: transition.stage_name.clone(),
                });
            }
            TransitionOutcome::Unchanged => {
                debug!(candidate_id = %id, stage_id = %target, "move ignored; already in stage");
            }
        }

        Ok(outcome)
    }

    // Notifications

    pub fn on_notification(&mut self, listener: Listener) -> Subscription {
        self.notifications.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.notifications.unsubscribe(subscription)
    }

    /// Live notifications at the current clock reading.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .active(self.clock.now())
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn current_toast(&self) -> Option<Notification> {
        self.notifications.latest(self.clock.now()).cloned()
    }

    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        self.notifications.dismiss(id)
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    fn notify(&mut self, event: PipelineEvent) {
        let now = self.clock.now();
        let pruned = self.notifications.prune(now);
        if pruned > 0 {
            debug!(pruned, "expired notifications dropped");
        }
        self.notifications.emit(event, now);
    }

    // Projections

    pub fn board(&self, filter: &CandidateFilter) -> PipelineBoard {
        PipelineBoard::build(&self.stages, &self.candidates, filter)
    }

    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary::build(&self.stages, &self.candidates)
    }
}
