use super::domain::{required, PipelineError, Stage, StageId, StageType};

/// Ordered, typed list of pipeline stages.
///
/// Stages are held sorted by `order`, and `order` is always the dense sequence `1..=N`.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    stages: Vec<Stage>,
    unique_names: bool,
    /// Ids are never reused, so candidates left on a deleted stage stay orphaned.
    last_id: u32,
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StageRegistry {
    /// `unique_names` rejects case-insensitive duplicate names on add and rename.
    pub fn new(unique_names: bool) -> Self {
        Self {
            stages: Vec::new(),
            unique_names,
            last_id: 0,
        }
    }

    pub fn enforces_unique_names(&self) -> bool {
        self.unique_names
    }

    pub fn list(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn get(&self, id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.id == id)
    }

    pub fn contains(&self, id: StageId) -> bool {
        self.get(id).is_some()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Stage> {
        let name = name.trim();
        self.stages
            .iter()
            .find(|stage| stage.name.eq_ignore_ascii_case(name))
    }

    pub fn add(&mut self, name: &str, stage_type: StageType) -> Result<Stage, PipelineError> {
        let name = required(name, "stage name")?;
        self.check_unique(&name, None)?;

        self.last_id += 1;
        let stage = Stage {
            id: StageId(self.last_id),
            name,
            stage_type,
            order: self.order_for(self.stages.len()),
        };

        self.stages.push(stage.clone());
        Ok(stage)
    }

    pub fn rename(&mut self, id: StageId, new_name: &str) -> Result<(), PipelineError> {
        let new_name = required(new_name, "stage name")?;
        self.check_unique(&new_name, Some(id))?;
        let stage = self.get_mut(id)?;
        stage.name = new_name;
        Ok(())
    }

    pub fn set_type(&mut self, id: StageId, stage_type: StageType) -> Result<(), PipelineError> {
        self.get_mut(id)?.stage_type = stage_type;
        Ok(())
    }

    /// Pull `dragged` out of the sequence and reinsert it at the index `target` held before the
    /// move, then renumber every stage.
    pub fn reorder(&mut self, dragged: StageId, target: StageId) -> Result<(), PipelineError> {
        let from = self.position(dragged)?;
        let to = self.position(target)?;
        if from == to {
            return Ok(());
        }

        let stage = self.stages.remove(from);
        self.stages.insert(to, stage);
        self.reindex();
        Ok(())
    }

    /// Removes the stage and closes the gap in `order`. Candidates are not touched here.
    pub fn remove(&mut self, id: StageId) -> Result<Stage, PipelineError> {
        let index = self.position(id)?;
        let removed = self.stages.remove(index);
        self.reindex();
        Ok(removed)
    }

    fn position(&self, id: StageId) -> Result<usize, PipelineError> {
        self.stages
            .iter()
            .position(|stage| stage.id == id)
            .ok_or(PipelineError::StageNotFound(id))
    }

    fn get_mut(&mut self, id: StageId) -> Result<&mut Stage, PipelineError> {
        self.stages
            .iter_mut()
            .find(|stage| stage.id == id)
            .ok_or(PipelineError::StageNotFound(id))
    }

    fn check_unique(&self, name: &str, except: Option<StageId>) -> Result<(), PipelineError> {
        if !self.unique_names {
            return Ok(());
        }

        match self.find_by_name(name) {
            Some(existing) if Some(existing.id) != except => {
                Err(PipelineError::DuplicateStageName(name.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn reindex(&mut self) {
        for (index, stage) in self.stages.iter_mut().enumerate() {
            stage.order = u32::try_from(index + 1).unwrap_or(u32::MAX);
        }
    }

    fn order_for(&self, index: usize) -> u32 {
        u32::try_from(index + 1).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> StageRegistry {
        let mut registry = StageRegistry::default();
        for name in names {
            registry
                .add(name, StageType::Screening)
                .expect("stage is added");
        }
        registry
    }

    fn names(registry: &StageRegistry) -> Vec<&str> {
        registry.list().iter().map(|s| s.name.as_str()).collect()
    }

    fn orders(registry: &StageRegistry) -> Vec<u32> {
        registry.list().iter().map(|s| s.order).collect()
    }

    #[test]
    fn add_assigns_next_order_and_trims_name() {
        let mut registry = registry(&["Applied", "Phone Screen"]);
        let stage = registry
            .add("  Hired ", StageType::Final)
            .expect("stage is added");

        assert_eq!(stage.name, "Hired");
        assert_eq!(stage.order, 3);
        assert_eq!(stage.id, StageId(3));
        assert_eq!(stage.stage_type, StageType::Final);
    }

    #[test]
    fn add_rejects_blank_name() {
        let mut registry = StageRegistry::default();
        assert_eq!(
            registry.add("   ", StageType::Interview),
            Err(PipelineError::Validation {
                field: "stage name"
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_names_rejected_only_when_enforced() {
        let mut strict = registry(&["Applied"]);
        assert_eq!(
            strict.add("applied", StageType::Screening),
            Err(PipelineError::DuplicateStageName("applied".to_string()))
        );

        let mut permissive = StageRegistry::new(false);
        permissive
            .add("Applied", StageType::Screening)
            .expect("first add");
        permissive
            .add("Applied", StageType::Screening)
            .expect("duplicate allowed");
        assert_eq!(permissive.len(), 2);
    }

    #[test]
    fn rename_to_own_name_in_different_case_is_allowed() {
        let mut registry = registry(&["Phone screen"]);
        registry
            .rename(StageId(1), "Phone Screen")
            .expect("rename succeeds");
        assert_eq!(names(&registry), vec!["Phone Screen"]);
    }

    #[test]
    fn rename_and_set_type_report_missing_stage() {
        let mut registry = registry(&["Applied"]);
        assert_eq!(
            registry.rename(StageId(9), "Other"),
            Err(PipelineError::StageNotFound(StageId(9)))
        );
        assert_eq!(
            registry.set_type(StageId(9), StageType::Final),
            Err(PipelineError::StageNotFound(StageId(9)))
        );
    }

    #[test]
    fn reorder_first_to_last_renumbers_densely() {
        let mut registry = registry(&["A", "B", "C", "D"]);
        registry
            .reorder(StageId(1), StageId(4))
            .expect("reorder succeeds");

        assert_eq!(names(&registry), vec!["B", "C", "D", "A"]);
        assert_eq!(orders(&registry), vec![1, 2, 3, 4]);
        assert_eq!(registry.get(StageId(1)).map(|s| s.order), Some(4));
    }

    #[test]
    fn reorder_last_to_first_inserts_at_target_position() {
        let mut registry = registry(&["A", "B", "C", "D"]);
        registry
            .reorder(StageId(4), StageId(2))
            .expect("reorder succeeds");

        assert_eq!(names(&registry), vec!["A", "D", "B", "C"]);
        assert_eq!(orders(&registry), vec![1, 2, 3, 4]);
    }

    #[test]
    fn reorder_onto_itself_is_a_no_op() {
        let mut registry = registry(&["A", "B"]);
        registry
            .reorder(StageId(2), StageId(2))
            .expect("no-op reorder");
        assert_eq!(names(&registry), vec!["A", "B"]);
    }

    #[test]
    fn orders_stay_a_dense_permutation_across_many_reorders() {
        let mut registry = registry(&["A", "B", "C", "D", "E", "F"]);
        let moves = [(1, 6), (3, 1), (6, 2), (2, 5), (4, 4), (5, 3), (1, 1), (6, 6)];

        for (dragged, target) in moves {
            registry
                .reorder(StageId(dragged), StageId(target))
                .expect("reorder succeeds");
            let mut seen = orders(&registry);
            seen.sort_unstable();
            assert_eq!(seen, (1..=6).collect::<Vec<u32>>());
        }
    }

    #[test]
    fn remove_closes_the_order_gap() {
        let mut registry = registry(&["A", "B", "C"]);
        let removed = registry.remove(StageId(2)).expect("stage removed");
        assert_eq!(removed.name, "B");
        assert_eq!(names(&registry), vec!["A", "C"]);
        assert_eq!(orders(&registry), vec![1, 2]);

        let next = registry.add("D", StageType::Decision).expect("stage added");
        assert_eq!(next.id, StageId(4));
        assert_eq!(next.order, 3);
    }

    #[test]
    fn ids_are_not_reused_after_removing_the_newest_stage() {
        let mut registry = registry(&["A", "B", "C"]);
        registry.remove(StageId(3)).expect("stage removed");

        let next = registry.add("C", StageType::Final).expect("stage added");
        assert_eq!(next.id, StageId(4));
        assert!(!registry.contains(StageId(3)));
    }
}
