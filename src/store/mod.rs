//! Persistence collaborator used by the completion engine
//!
//! The engine only talks to the [`Store`] trait: table-scoped reads, filtered
//! updates and a change feed per table. [`SqliteStore`] is the concrete
//! implementation backed by the `repo` layer.

pub mod error;
pub mod feed;
pub mod sqlite;

pub use error::*;
pub use feed::*;
pub use sqlite::*;

use std::sync::mpsc::Receiver;
use crate::models::{
    AssignmentLink, Deal, DealPatch, DealStatus, DealType, Stage, StageAssignment, StagePatch,
    StageStatus, Task, TaskStatus,
};

/// Store operations consumed by the completion engine.
///
/// Updates take an optional `expected` status. When present it is part of
/// the write predicate (`AND status = expected`) and the return value tells
/// whether a row matched, which is how callers implement compare-and-swap.
pub trait Store {
    fn get_task(&self, id: &str) -> StoreResult<Option<Task>>;

    /// Tasks with the given ids. Ids with no row are silently skipped.
    fn list_tasks_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Task>>;

    /// Persist a task's own status. Returns false if the task does not exist.
    fn update_task_status(&self, id: &str, status: TaskStatus) -> StoreResult<bool>;

    /// Completed tasks assigned to at least one stage in either taxonomy
    fn list_completed_assigned_tasks(&self) -> StoreResult<Vec<Task>>;

    fn list_assignments_by_task(&self, deal_type: DealType, task_id: &str) -> StoreResult<Vec<AssignmentLink>>;

    fn list_assignments_by_stage(&self, deal_type: DealType, stage_id: &str) -> StoreResult<Vec<StageAssignment>>;

    fn get_stage(&self, deal_type: DealType, id: &str) -> StoreResult<Option<Stage>>;

    fn list_stages_by_deal(&self, deal_type: DealType, deal_id: &str) -> StoreResult<Vec<Stage>>;

    fn update_stage(
        &self,
        deal_type: DealType,
        id: &str,
        patch: &StagePatch,
        expected: Option<StageStatus>,
    ) -> StoreResult<bool>;

    fn get_deal(&self, deal_type: DealType, id: &str) -> StoreResult<Option<Deal>>;

    fn update_deal(
        &self,
        deal_type: DealType,
        id: &str,
        patch: &DealPatch,
        expected: Option<DealStatus>,
    ) -> StoreResult<bool>;

    /// Receive insert/update/delete events for `table`
    fn subscribe(&self, table: &str) -> Receiver<ChangeEvent>;
}
