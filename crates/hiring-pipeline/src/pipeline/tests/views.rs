use super::common::*;
use crate::pipeline::domain::{CandidateFilter, StageType};

#[test]
fn board_lists_every_stage_in_order_with_cards() {
    let (mut service, _, [applied, interview, offer, rejected]) = board();
    let meera = add(&mut service, "Meera Patel", applied);
    add(&mut service, "Vikram Gupta", applied);
    service
        .move_candidate_with_note(meera.id, interview, "Interview scheduled")
        .expect("move");
    service
        .reorder_stage(rejected, applied)
        .expect("reorder");

    let board = service.board(&CandidateFilter::default());
    let layout: Vec<_> = board
        .columns
        .iter()
        .map(|column| (column.stage_id, column.order, column.candidates.len()))
        .collect();
    assert_eq!(
        layout,
        vec![(rejected, 1, 0), (applied, 2, 1), (interview, 3, 1), (offer, 4, 0)]
    );
    assert_eq!(board.total, 2);
    assert!(board.orphaned.is_empty());

    let card = &board.column(interview).expect("interview column").candidates[0];
    assert_eq!(card.initials, "MP");
    assert_eq!(card.last_note.as_deref(), Some("Interview scheduled"));
    assert_eq!(
        board.column(interview).map(|column| column.stage_type_label),
        Some("Interview")
    );
}

#[test]
fn board_applies_filters_and_surfaces_orphans() {
    let (mut service, _, [applied, interview, ..]) = board();
    add(&mut service, "Priya Singh", applied);
    let orphan = add(&mut service, "Arjun Nair", interview);
    service.delete_stage(interview).expect("delete");

    let board = service.board(&CandidateFilter::search("arjun"));
    assert_eq!(board.total, 1);
    assert!(board.columns.iter().all(|column| column.candidates.is_empty()));
    assert_eq!(board.orphaned.len(), 1);
    assert_eq!(board.orphaned[0].stage_id, interview);
    assert_eq!(board.orphaned[0].candidates[0].id, orphan.id);
}

#[test]
fn summary_counts_stages_types_and_orphans() {
    let (mut service, _, [applied, interview, offer, rejected]) = board();
    add(&mut service, "Priya Singh", applied);
    add(&mut service, "Sneha Reddy", applied);
    add(&mut service, "Meera Patel", interview);
    add(&mut service, "Ravi Kumar", rejected);
    add(&mut service, "Rahul Verma", offer);
    service.delete_stage(offer).expect("delete");

    let summary = service.summary();
    assert_eq!(summary.total_candidates, 5);
    assert_eq!(summary.orphaned, 1);

    let counts: Vec<(&str, usize)> = summary
        .stages
        .iter()
        .map(|entry| (entry.stage_name.as_str(), entry.count))
        .collect();
    assert_eq!(counts, vec![("Applied", 2), ("Interview", 1), ("Rejected", 1)]);

    let by_type: Vec<(StageType, usize)> = summary
        .by_type
        .iter()
        .map(|entry| (entry.stage_type, entry.count))
        .collect();
    assert_eq!(
        by_type,
        vec![
            (StageType::Screening, 2),
            (StageType::Interview, 1),
            (StageType::Decision, 0),
            (StageType::Final, 1),
        ]
    );
}
