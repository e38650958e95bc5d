// Shared fixtures for engine integration tests
// Provides an in-memory pipeline builder and a store wrapper that injects failures

#![allow(dead_code)]

use chrono::NaiveDate;
use dealflow::cascade::{Clock, CompletionEngine};
use dealflow::models::{
    AssignmentLink, Deal, DealPatch, DealStatus, DealType, Stage, StageAssignment, StagePatch,
    StageStatus, Task, TaskStatus,
};
use dealflow::store::{ChangeEvent, SqliteStore, Store, StoreError, StoreResult};
use std::collections::HashSet;
use std::sync::mpsc::Receiver;

/// Evaluation date used by every fixture engine
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

/// Completion date given to rows seeded as already completed
pub fn earlier() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
}

pub const NOW_TS: i64 = 1_792_000_000;

pub fn clock() -> Clock {
    Clock::Fixed { today: today(), now_ts: NOW_TS }
}

/// In-memory store plus helpers to seed deals, stages and tasks
pub struct Pipeline {
    pub store: SqliteStore,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            store: SqliteStore::open_in_memory().unwrap(),
        }
    }

    pub fn engine(&self) -> CompletionEngine<'_, SqliteStore> {
        CompletionEngine::with_clock(&self.store, clock())
    }

    pub fn deal(&self, deal_type: DealType) -> String {
        self.deal_with_status(deal_type, DealStatus::Active)
    }

    pub fn deal_with_status(&self, deal_type: DealType, status: DealStatus) -> String {
        let mut deal = Deal::new("Deal");
        deal.status = status;
        if status == DealStatus::Completed {
            deal.actual_end_date = Some(earlier());
        }
        self.store.insert_deal(deal_type, &deal).unwrap();
        deal.id
    }

    pub fn stage(&self, deal_type: DealType, deal_id: &str) -> String {
        self.stage_with_status(deal_type, deal_id, StageStatus::Pending)
    }

    pub fn stage_with_status(&self, deal_type: DealType, deal_id: &str, status: StageStatus) -> String {
        let order = self.store.list_stages_by_deal(deal_type, deal_id).unwrap().len() as i64;
        let mut stage = Stage::new(deal_id, &format!("Stage {}", order), order);
        stage.status = status;
        if status == StageStatus::Completed {
            stage.actual_end_date = Some(earlier());
        }
        self.store.insert_stage(deal_type, &stage).unwrap();
        stage.id
    }

    pub fn task(&self, status: TaskStatus) -> String {
        let mut task = Task::new("Task".to_string());
        task.status = status;
        self.store.insert_task(&task).unwrap();
        task.id
    }

    pub fn assign(&self, deal_type: DealType, stage_id: &str, task_id: &str) {
        self.store
            .insert_assignment(deal_type, stage_id, Some(task_id), None)
            .unwrap();
    }

    /// Create a task with `status` and assign it to `stage_id`
    pub fn assigned_task(&self, deal_type: DealType, stage_id: &str, status: TaskStatus) -> String {
        let task_id = self.task(status);
        self.assign(deal_type, stage_id, &task_id);
        task_id
    }

    pub fn set_task(&self, task_id: &str, status: TaskStatus) {
        assert!(self.store.update_task_status(task_id, status).unwrap());
    }

    pub fn stage_row(&self, deal_type: DealType, id: &str) -> Stage {
        self.store.get_stage(deal_type, id).unwrap().unwrap()
    }

    pub fn deal_row(&self, deal_type: DealType, id: &str) -> Deal {
        self.store.get_deal(deal_type, id).unwrap().unwrap()
    }
}

/// Store wrapper failing selected operations with `StoreError::Unavailable`
pub struct FailingStore<'a> {
    pub inner: &'a SqliteStore,
    /// Stage and deal writes in this taxonomy fail
    pub fail_writes_for: Option<DealType>,
    /// Assignment lookups in this taxonomy fail
    pub fail_assignment_reads_for: Option<DealType>,
    /// `get_task` fails for these ids
    pub fail_tasks: HashSet<String>,
}

impl<'a> FailingStore<'a> {
    pub fn new(inner: &'a SqliteStore) -> Self {
        Self {
            inner,
            fail_writes_for: None,
            fail_assignment_reads_for: None,
            fail_tasks: HashSet::new(),
        }
    }

    fn unavailable(what: &str) -> StoreError {
        StoreError::Unavailable(format!("{} refused", what))
    }
}

impl Store for FailingStore<'_> {
    fn get_task(&self, id: &str) -> StoreResult<Option<Task>> {
        if self.fail_tasks.contains(id) {
            return Err(Self::unavailable("get_task"));
        }
        self.inner.get_task(id)
    }

    fn list_tasks_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Task>> {
        self.inner.list_tasks_by_ids(ids)
    }

    fn update_task_status(&self, id: &str, status: TaskStatus) -> StoreResult<bool> {
        self.inner.update_task_status(id, status)
    }

    fn list_completed_assigned_tasks(&self) -> StoreResult<Vec<Task>> {
        self.inner.list_completed_assigned_tasks()
    }

    fn list_assignments_by_task(&self, deal_type: DealType, task_id: &str) -> StoreResult<Vec<AssignmentLink>> {
        if self.fail_assignment_reads_for == Some(deal_type) {
            return Err(Self::unavailable("list_assignments_by_task"));
        }
        self.inner.list_assignments_by_task(deal_type, task_id)
    }

    fn list_assignments_by_stage(&self, deal_type: DealType, stage_id: &str) -> StoreResult<Vec<StageAssignment>> {
        if self.fail_assignment_reads_for == Some(deal_type) {
            return Err(Self::unavailable("list_assignments_by_stage"));
        }
        self.inner.list_assignments_by_stage(deal_type, stage_id)
    }

    fn get_stage(&self, deal_type: DealType, id: &str) -> StoreResult<Option<Stage>> {
        self.inner.get_stage(deal_type, id)
    }

    fn list_stages_by_deal(&self, deal_type: DealType, deal_id: &str) -> StoreResult<Vec<Stage>> {
        self.inner.list_stages_by_deal(deal_type, deal_id)
    }

    fn update_stage(
        &self,
        deal_type: DealType,
        id: &str,
        patch: &StagePatch,
        expected: Option<StageStatus>,
    ) -> StoreResult<bool> {
        if self.fail_writes_for == Some(deal_type) {
            return Err(Self::unavailable("update_stage"));
        }
        self.inner.update_stage(deal_type, id, patch, expected)
    }

    fn get_deal(&self, deal_type: DealType, id: &str) -> StoreResult<Option<Deal>> {
        self.inner.get_deal(deal_type, id)
    }

    fn update_deal(
        &self,
        deal_type: DealType,
        id: &str,
        patch: &DealPatch,
        expected: Option<DealStatus>,
    ) -> StoreResult<bool> {
        if self.fail_writes_for == Some(deal_type) {
            return Err(Self::unavailable("update_deal"));
        }
        self.inner.update_deal(deal_type, id, patch, expected)
    }

    fn subscribe(&self, table: &str) -> Receiver<ChangeEvent> {
        self.inner.subscribe(table)
    }
}
