use chrono::{DateTime, Utc};
use serde::Serialize;

use super::candidates::CandidateStore;
use super::domain::{Candidate, CandidateFilter, CandidateId, StageId, StageType};
use super::stages::StageRegistry;

#[derive(Debug, Clone, Serialize)]
pub struct CandidateCard {
    pub id: CandidateId,
    pub name: String,
    pub initials: String,
    pub position: String,
    pub assigned_recruiter: String,
    pub comment_count: u32,
    pub last_activity: DateTime<Utc>,
    pub last_note: Option<String>,
}

impl From<&Candidate> for CandidateCard {
    fn from(candidate: &Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name.clone(),
            initials: candidate.initials(),
            position: candidate.position.clone(),
            assigned_recruiter: candidate.assigned_recruiter.clone(),
            comment_count: candidate.comment_count,
            last_activity: candidate.last_activity,
            last_note: candidate.timeline().last().map(|entry| entry.note.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageColumn {
    pub stage_id: StageId,
    pub name: String,
    pub stage_type: StageType,
    pub stage_type_label: &'static str,
    pub order: u32,
    pub candidates: Vec<CandidateCard>,
}

/// Candidates left behind by a deleted stage.
#[derive(Debug, Clone, Serialize)]
pub struct OrphanColumn {
    pub stage_id: StageId,
    pub candidates: Vec<CandidateCard>,
}

/// Board projection: one column per stage in pipeline order.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineBoard {
    pub columns: Vec<StageColumn>,
    pub orphaned: Vec<OrphanColumn>,
    pub total: usize,
}

impl PipelineBoard {
    pub fn build(registry: &StageRegistry, store: &CandidateStore, filter: &CandidateFilter) -> Self {
        let visible = store.filter(filter);
        let total = visible.len();

        let columns = registry
            .list()
            .iter()
            .map(|stage| StageColumn {
                stage_id: stage.id,
                name: stage.name.clone(),
                stage_type: stage.stage_type,
                stage_type_label: stage.stage_type.label(),
                order: stage.order,
                candidates: visible
                    .iter()
                    .filter(|candidate| candidate.current_stage() == stage.id)
                    .map(|candidate| CandidateCard::from(*candidate))
                    .collect(),
            })
            .collect();

        let mut orphaned: Vec<OrphanColumn> = Vec::new();
        for candidate in visible
            .iter()
            .filter(|candidate| !registry.contains(candidate.current_stage()))
        {
            let stage_id = candidate.current_stage();
            let card = CandidateCard::from(*candidate);
            match orphaned.iter_mut().find(|column| column.stage_id == stage_id) {
                Some(column) => column.candidates.push(card),
                None => orphaned.push(OrphanColumn {
                    stage_id,
                    candidates: vec![card],
                }),
            }
        }

        Self {
            columns,
            orphaned,
            total,
        }
    }

    pub fn column(&self, stage_id: StageId) -> Option<&StageColumn> {
        self.columns.iter().find(|column| column.stage_id == stage_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageCountEntry {
    pub stage_id: StageId,
    pub stage_name: String,
    pub order: u32,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageTypeEntry {
    pub stage_type: StageType,
    pub label: &'static str,
    pub count: usize,
}

/// Headcount rollup per stage and per stage type.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub total_candidates: usize,
    pub stages: Vec<StageCountEntry>,
    pub by_type: Vec<StageTypeEntry>,
    pub orphaned: usize,
}

impl PipelineSummary {
    pub fn build(registry: &StageRegistry, store: &CandidateStore) -> Self {
        let groups = store.group_by_stage(registry);

        let stages: Vec<StageCountEntry> = registry
            .list()
            .iter()
            .map(|stage| StageCountEntry {
                stage_id: stage.id,
                stage_name: stage.name.clone(),
                order: stage.order,
                count: groups.get(&stage.id).map_or(0, Vec::len),
            })
            .collect();

        let by_type = StageType::ordered()
            .into_iter()
            .map(|stage_type| StageTypeEntry {
                stage_type,
                label: stage_type.label(),
                count: registry
                    .list()
                    .iter()
                    .filter(|stage| stage.stage_type == stage_type)
                    .map(|stage| groups.get(&stage.id).map_or(0, Vec::len))
                    .sum(),
            })
            .collect();

        Self {
            total_candidates: store.len(),
            stages,
            by_type,
            orphaned: store.orphaned(registry).len(),
        }
    }
}
