use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::domain::{
    required, Candidate, CandidateFilter, CandidateId, CandidateUpdate, Comment, NewCandidate,
    PipelineError, Stage, StageId, TimelineEntry, TimelineStatus,
};
use super::stages::StageRegistry;

pub(crate) const ADDED_NOTE: &str = "Added";

/// Owns candidate records and their timelines, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct CandidateStore {
    candidates: Vec<Candidate>,
    last_id: u64,
}

impl CandidateStore {
    pub fn list(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|candidate| candidate.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: CandidateId) -> Result<&mut Candidate, PipelineError> {
        self.candidates
            .iter_mut()
            .find(|candidate| candidate.id == id)
            .ok_or(PipelineError::CandidateNotFound(id))
    }

    /// Create a candidate in `stage`, seeding the timeline with a single current entry.
    pub fn insert(
        &mut self,
        fields: NewCandidate,
        stage: &Stage,
        now: DateTime<Utc>,
    ) -> Result<&Candidate, PipelineError> {
        let name = required(&fields.name, "name")?;
        let position = required(&fields.position, "position")?;
        let assigned_recruiter = required(&fields.assigned_recruiter, "recruiter")?;

        self.last_id += 1;
        let candidate = Candidate {
            id: CandidateId(self.last_id),
            name,
            position,
            email: optional(fields.email),
            phone: optional(fields.phone),
            location: optional(fields.location),
            assigned_recruiter,
            comment_count: 0,
            last_activity: now,
            current_stage: stage.id,
            timeline: vec![TimelineEntry {
                stage_id: stage.id,
                stage: stage.name.clone(),
                date: now.date_naive(),
                note: ADDED_NOTE.to_string(),
                status: TimelineStatus::Current,
            }],
            comments: Vec::new(),
        };

        self.candidates.push(candidate);
        let index = self.candidates.len() - 1;
        Ok(&self.candidates[index])
    }

    pub fn update(
        &mut self,
        id: CandidateId,
        update: CandidateUpdate,
        now: DateTime<Utc>,
    ) -> Result<&Candidate, PipelineError> {
        let name = update
            .name
            .as_deref()
            .map(|value| required(value, "name"))
            .transpose()?;
        let position = update
            .position
            .as_deref()
            .map(|value| required(value, "position"))
            .transpose()?;

        let candidate = self.get_mut(id)?;
        if let Some(name) = name {
            candidate.name = name;
        }
        if let Some(position) = position {
            candidate.position = position;
        }
        if update.email.is_some() {
            candidate.email = optional(update.email);
        }
        if update.phone.is_some() {
            candidate.phone = optional(update.phone);
        }
        if update.location.is_some() {
            candidate.location = optional(update.location);
        }
        candidate.last_activity = now;

        Ok(&*candidate)
    }

    /// Overwrite the assigned recruiter. The timeline is left untouched.
    pub fn reassign(
        &mut self,
        id: CandidateId,
        recruiter: &str,
        now: DateTime<Utc>,
    ) -> Result<&Candidate, PipelineError> {
        let recruiter = required(recruiter, "recruiter")?;
        let candidate = self.get_mut(id)?;
        candidate.assigned_recruiter = recruiter;
        candidate.last_activity = now;
        Ok(&*candidate)
    }

    pub fn remove(&mut self, id: CandidateId) -> Result<Candidate, PipelineError> {
        let index = self
            .candidates
            .iter()
            .position(|candidate| candidate.id == id)
            .ok_or(PipelineError::CandidateNotFound(id))?;
        Ok(self.candidates.remove(index))
    }

    pub fn add_comment(
        &mut self,
        id: CandidateId,
        author: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Comment, PipelineError> {
        let text = required(text, "comment")?;
        let author = required(author, "author")?;
        let candidate = self.get_mut(id)?;

        let comment = Comment {
            author,
            text,
            timestamp: now,
        };
        candidate.comments.push(comment.clone());
        candidate.comment_count = candidate.comment_count.saturating_add(1);
        candidate.last_activity = now;

        Ok(comment)
    }

    /// Linear scan, insertion order preserved.
    pub fn filter(&self, filter: &CandidateFilter) -> Vec<&Candidate> {
        self.candidates
            .iter()
            .filter(|candidate| filter.matches(candidate))
            .collect()
    }

    /// Partition every candidate by current stage.
    ///
    /// Each registry stage gets an entry even when empty. Candidates whose stage has been deleted
    /// are keyed under that stale id, so the groups always cover the whole store exactly once.
    pub fn group_by_stage<'a>(
        &'a self,
        registry: &StageRegistry,
    ) -> BTreeMap<StageId, Vec<&'a Candidate>> {
        let mut groups: BTreeMap<StageId, Vec<&Candidate>> = registry
            .list()
            .iter()
            .map(|stage| (stage.id, Vec::new()))
            .collect();

        for candidate in &self.candidates {
            groups
                .entry(candidate.current_stage)
                .or_default()
                .push(candidate);
        }

        groups
    }

    pub fn in_stage(&self, stage: StageId) -> Vec<&Candidate> {
        self.candidates
            .iter()
            .filter(|candidate| candidate.current_stage == stage)
            .collect()
    }

    /// Candidates pointing at a stage the registry no longer holds.
    pub fn orphaned<'a>(&'a self, registry: &StageRegistry) -> Vec<&'a Candidate> {
        self.candidates
            .iter()
            .filter(|candidate| !registry.contains(candidate.current_stage))
            .collect()
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::domain::StageType;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_706_000_000, 0).expect("valid timestamp")
    }

    fn registry() -> StageRegistry {
        let mut registry = StageRegistry::default();
        registry
            .add("Applied", StageType::Screening)
            .expect("stage added");
        registry
            .add("Phone Screen", StageType::Screening)
            .expect("stage added");
        registry
    }

    fn store_with(names: &[(&str, &str, StageId)], registry: &StageRegistry) -> CandidateStore {
        let mut store = CandidateStore::default();
        for (name, position, stage) in names {
            let stage = registry.get(*stage).expect("stage exists").clone();
            store
                .insert(
                    NewCandidate::new(*name, *position, "Nagendra Uggirala", stage.id),
                    &stage,
                    now(),
                )
                .expect("candidate inserted");
        }
        store
    }

    #[test]
    fn insert_seeds_single_current_timeline_entry() {
        let registry = registry();
        let store = store_with(&[("Raj Kumar", "Backend Engineer", StageId(1))], &registry);
        let candidate = store.get(CandidateId(1)).expect("candidate stored");

        assert_eq!(candidate.current_stage(), StageId(1));
        assert_eq!(candidate.timeline().len(), 1);
        let entry = &candidate.timeline()[0];
        assert_eq!(entry.stage, "Applied");
        assert_eq!(entry.note, "Added");
        assert_eq!(entry.status, TimelineStatus::Current);
        assert_eq!(entry.date, now().date_naive());
    }

    #[test]
    fn insert_rejects_blank_name_or_position() {
        let registry = registry();
        let stage = registry.get(StageId(1)).expect("stage").clone();
        let mut store = CandidateStore::default();

        let blank_name = NewCandidate::new(" ", "Data Scientist", "Aisha Sharma", stage.id);
        assert_eq!(
            store.insert(blank_name, &stage, now()).map(|c| c.id),
            Err(PipelineError::Validation { field: "name" })
        );

        let blank_position = NewCandidate::new("Meera Singh", "", "Aisha Sharma", stage.id);
        assert_eq!(
            store.insert(blank_position, &stage, now()).map(|c| c.id),
            Err(PipelineError::Validation { field: "position" })
        );
        assert!(store.is_empty());
    }

    #[test]
    fn insert_and_reassign_share_the_recruiter_rule() {
        let registry = registry();
        let stage = registry.get(StageId(1)).expect("stage").clone();
        let mut store = CandidateStore::default();

        let unassigned = NewCandidate::new("Raj Kumar", "Backend Engineer", "   ", stage.id);
        assert_eq!(
            store.insert(unassigned, &stage, now()).map(|c| c.id),
            Err(PipelineError::Validation { field: "recruiter" })
        );
        assert!(store.is_empty());

        let assigned = NewCandidate::new("Raj Kumar", "Backend Engineer", " Priya Nair ", stage.id);
        let candidate = store.insert(assigned, &stage, now()).expect("inserted");
        assert_eq!(candidate.id, CandidateId(1));
        assert_eq!(candidate.assigned_recruiter, "Priya Nair");
        assert_eq!(
            store.reassign(CandidateId(1), "", now()).map(|c| c.id),
            Err(PipelineError::Validation { field: "recruiter" })
        );
    }

    #[test]
    fn reassign_overwrites_recruiter_without_timeline_entry() {
        let registry = registry();
        let mut store = store_with(&[("Raj Kumar", "Backend Engineer", StageId(1))], &registry);

        let updated = store
            .reassign(CandidateId(1), "Priya Nair", now())
            .expect("reassigned");
        assert_eq!(updated.assigned_recruiter, "Priya Nair");
        assert_eq!(updated.timeline().len(), 1);

        assert_eq!(
            store.reassign(CandidateId(7), "Priya Nair", now()).map(|c| c.id),
            Err(PipelineError::CandidateNotFound(CandidateId(7)))
        );
    }

    #[test]
    fn update_keeps_unset_fields_and_validates_blank_names() {
        let registry = registry();
        let mut store = store_with(&[("Raj Kumar", "Backend Engineer", StageId(1))], &registry);

        let updated = store
            .update(
                CandidateId(1),
                CandidateUpdate {
                    location: Some("Pune, India".to_string()),
                    ..CandidateUpdate::default()
                },
                now(),
            )
            .expect("updated");
        assert_eq!(updated.name, "Raj Kumar");
        assert_eq!(updated.location.as_deref(), Some("Pune, India"));

        let blank = CandidateUpdate {
            position: Some("   ".to_string()),
            ..CandidateUpdate::default()
        };
        assert_eq!(
            store.update(CandidateId(1), blank, now()).map(|c| c.id),
            Err(PipelineError::Validation { field: "position" })
        );
    }

    #[test]
    fn add_comment_bumps_counter() {
        let registry = registry();
        let mut store = store_with(&[("Raj Kumar", "Backend Engineer", StageId(1))], &registry);

        store
            .add_comment(CandidateId(1), "Arjun Patel", "Strong coding test results.", now())
            .expect("comment added");
        let candidate = store.get(CandidateId(1)).expect("candidate");
        assert_eq!(candidate.comment_count, 1);
        assert_eq!(candidate.comments()[0].author, "Arjun Patel");

        assert_eq!(
            store.add_comment(CandidateId(1), "Arjun Patel", "  ", now()),
            Err(PipelineError::Validation { field: "comment" })
        );
    }

    #[test]
    fn group_by_stage_covers_every_candidate_once() {
        let mut registry = registry();
        let mut store = store_with(
            &[
                ("Raj Kumar", "Backend Engineer", StageId(1)),
                ("Meera Singh", "Data Scientist", StageId(1)),
                ("Aisha Sharma", "Frontend Engineer", StageId(2)),
            ],
            &registry,
        );
        registry
            .add("Offer", StageType::Decision)
            .expect("stage added");
        store.remove(CandidateId(2)).expect("removed");
        registry.remove(StageId(2)).expect("stage removed");

        let groups = store.group_by_stage(&registry);
        assert_eq!(groups.get(&StageId(1)).map(Vec::len), Some(1));
        assert_eq!(groups.get(&StageId(3)).map(Vec::len), Some(0));
        assert_eq!(groups.get(&StageId(2)).map(Vec::len), Some(1));

        let mut ids: Vec<CandidateId> = groups
            .values()
            .flat_map(|group| group.iter().map(|c| c.id))
            .collect();
        ids.sort();
        assert_eq!(ids, vec![CandidateId(1), CandidateId(3)]);
        assert_eq!(store.orphaned(&registry).len(), 1);
    }

    #[test]
    fn filter_and_in_stage_preserve_insertion_order() {
        let registry = registry();
        let store = store_with(
            &[
                ("Raj Kumar", "Backend Engineer", StageId(1)),
                ("Karthik Reddy", "DevOps Engineer", StageId(2)),
                ("Meera Singh", "Data Scientist", StageId(1)),
            ],
            &registry,
        );

        let engineers: Vec<&str> = store
            .filter(&CandidateFilter::search("engineer"))
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(engineers, vec!["Raj Kumar", "Karthik Reddy"]);

        let applied: Vec<&str> = store
            .in_stage(StageId(1))
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(applied, vec!["Raj Kumar", "Meera Singh"]);
    }
}
