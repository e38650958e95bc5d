// Direct stage projection from a single task's status

mod fixtures;
use fixtures::*;
use dealflow::models::{DealStatus, DealType, StageStatus, TaskStatus};

#[test]
fn test_in_progress_task_moves_stage_to_in_progress() {
    let p = Pipeline::new();
    let deal = p.deal(DealType::Rental);
    let stage = p.stage(DealType::Rental, &deal);
    let task = p.assigned_task(DealType::Rental, &stage, TaskStatus::InProgress);

    let result = p.engine().sync_task_status_with_stage(&task);

    assert!(result.stage_completed, "stage row should be written");
    assert!(!result.deal_completed);
    let row = p.stage_row(DealType::Rental, &stage);
    assert_eq!(row.status, StageStatus::InProgress);
    assert_eq!(row.actual_end_date, None);
    assert_eq!(row.updated_ts, NOW_TS);
}

#[test]
fn test_status_mapping_onto_completed_stage() {
    let cases = [
        (TaskStatus::NotStarted, StageStatus::Pending),
        (TaskStatus::Pending, StageStatus::Pending),
        (TaskStatus::Blocked, StageStatus::Pending),
        (TaskStatus::Cancelled, StageStatus::Pending),
        (TaskStatus::InProgress, StageStatus::InProgress),
        (TaskStatus::Completed, StageStatus::Completed),
    ];

    for (task_status, expected) in cases {
        let p = Pipeline::new();
        let deal = p.deal(DealType::Builder);
        let stage = p.stage_with_status(DealType::Builder, &deal, StageStatus::Completed);
        let task = p.assigned_task(DealType::Builder, &stage, task_status);

        p.engine().sync_task_status_with_stage(&task);

        let row = p.stage_row(DealType::Builder, &stage);
        assert_eq!(row.status, expected, "task status {:?}", task_status);
        if expected == StageStatus::Completed {
            assert_eq!(row.actual_end_date, Some(earlier()), "completion date is kept");
        } else {
            assert_eq!(row.actual_end_date, None, "task status {:?}", task_status);
        }
    }
}

#[test]
fn test_projection_ignores_sibling_tasks() {
    let p = Pipeline::new();
    let deal = p.deal(DealType::Rental);
    let stage = p.stage(DealType::Rental, &deal);
    let done = p.assigned_task(DealType::Rental, &stage, TaskStatus::Completed);
    p.assigned_task(DealType::Rental, &stage, TaskStatus::Pending);

    let engine = p.engine();
    assert!(!engine.is_stage_complete(&stage, DealType::Rental).unwrap());

    let result = engine.sync_task_status_with_stage(&done);

    assert!(result.stage_completed);
    let row = p.stage_row(DealType::Rental, &stage);
    assert_eq!(row.status, StageStatus::Completed);
    assert_eq!(row.actual_end_date, Some(today()));
}

#[test]
fn test_completed_projection_completes_single_stage_deal() {
    let p = Pipeline::new();
    let deal = p.deal(DealType::Rental);
    let stage = p.stage(DealType::Rental, &deal);
    let task = p.assigned_task(DealType::Rental, &stage, TaskStatus::Completed);

    let result = p.engine().sync_task_status_with_stage(&task);

    assert!(result.stage_completed && result.deal_completed);
    let row = p.deal_row(DealType::Rental, &deal);
    assert_eq!(row.status, DealStatus::Completed);
    assert_eq!(row.actual_end_date, Some(today()));
}

#[test]
fn test_already_completed_deal_is_not_rewritten() {
    let p = Pipeline::new();
    let deal = p.deal_with_status(DealType::Builder, DealStatus::Completed);
    let stage = p.stage(DealType::Builder, &deal);
    let task = p.assigned_task(DealType::Builder, &stage, TaskStatus::Completed);
    let before = p.deal_row(DealType::Builder, &deal);

    let result = p.engine().sync_task_status_with_stage(&task);

    assert!(result.stage_completed);
    assert!(!result.deal_completed);
    assert_eq!(p.deal_row(DealType::Builder, &deal), before);
}

#[test]
fn test_non_completed_projection_reverts_completed_deal() {
    let p = Pipeline::new();
    let deal = p.deal_with_status(DealType::Rental, DealStatus::Completed);
    let stage = p.stage_with_status(DealType::Rental, &deal, StageStatus::Completed);
    let task = p.assigned_task(DealType::Rental, &stage, TaskStatus::Blocked);

    let result = p.engine().sync_task_status_with_stage(&task);

    assert!(result.stage_completed && result.deal_completed);
    assert_eq!(p.stage_row(DealType::Rental, &stage).status, StageStatus::Pending);
    let row = p.deal_row(DealType::Rental, &deal);
    assert_eq!(row.status, DealStatus::InProgress);
    assert_eq!(row.actual_end_date, None);
}

#[test]
fn test_cancelled_deal_is_not_touched_by_projection() {
    let p = Pipeline::new();
    let deal = p.deal_with_status(DealType::Rental, DealStatus::Cancelled);
    let stage = p.stage(DealType::Rental, &deal);
    let task = p.assigned_task(DealType::Rental, &stage, TaskStatus::InProgress);

    let result = p.engine().sync_task_status_with_stage(&task);

    assert!(!result.deal_completed);
    assert_eq!(p.deal_row(DealType::Rental, &deal).status, DealStatus::Cancelled);
}

#[test]
fn test_second_projection_writes_nothing() {
    let p = Pipeline::new();
    let deal = p.deal(DealType::Rental);
    let stage = p.stage(DealType::Rental, &deal);
    let task = p.assigned_task(DealType::Rental, &stage, TaskStatus::InProgress);

    let engine = p.engine();
    assert!(engine.sync_task_status_with_stage(&task).stage_completed);

    let second = engine.sync_task_status_with_stage(&task);
    assert!(!second.stage_completed && !second.deal_completed);
    assert_eq!(second.stage_id.as_deref(), Some(stage.as_str()));
}

#[test]
fn test_projection_reaches_both_taxonomies() {
    let p = Pipeline::new();
    let rental_deal = p.deal(DealType::Rental);
    let rental_stage = p.stage(DealType::Rental, &rental_deal);
    let builder_deal = p.deal(DealType::Builder);
    let builder_stage = p.stage(DealType::Builder, &builder_deal);
    let task = p.assigned_task(DealType::Builder, &builder_stage, TaskStatus::InProgress);
    p.assign(DealType::Rental, &rental_stage, &task);

    p.engine().sync_task_status_with_stage(&task);

    assert_eq!(p.stage_row(DealType::Rental, &rental_stage).status, StageStatus::InProgress);
    assert_eq!(p.stage_row(DealType::Builder, &builder_stage).status, StageStatus::InProgress);
}

#[test]
fn test_missing_task_projects_nothing() {
    let p = Pipeline::new();
    assert_eq!(p.engine().sync_task_status_with_stage("nope"), Default::default());
}
