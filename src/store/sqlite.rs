use anyhow::Result;
use rusqlite::Connection;
use std::sync::mpsc::Receiver;
use crate::config::Config;
use crate::db::DbConnection;
use crate::models::{
    AssignmentLink, Deal, DealPatch, DealStatus, DealType, Stage, StageAssignment, StagePatch,
    StageStatus, Task, TaskStatus,
};
use crate::repo::{AssignmentRepo, DealRepo, StageRepo, TaskRepo};
use crate::store::{ChangeEvent, ChangeFeed, ChangeKind, Store, StoreResult};

/// SQLite-backed store
///
/// Every successful write publishes one event on the table's change feed.
///
/// # Example
///
/// ```no_run
/// use dealflow::models::{DealType, Deal, Stage, Task};
/// use dealflow::store::SqliteStore;
///
/// let store = SqliteStore::open_in_memory().unwrap();
/// let deal = Deal::new("Unit 4B");
/// store.insert_deal(DealType::Rental, &deal).unwrap();
/// let stage = Stage::new(&deal.id, "Documentation", 0);
/// store.insert_stage(DealType::Rental, &stage).unwrap();
/// let task = Task::new("Collect ID".to_string());
/// store.insert_task(&task).unwrap();
/// store.insert_assignment(DealType::Rental, &stage.id, Some(&task.id), None).unwrap();
/// ```
pub struct SqliteStore {
    conn: Connection,
    feed: ChangeFeed,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            feed: ChangeFeed::new(),
        }
    }

    /// Open the configured database, running migrations
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Self::new(DbConnection::connect(config)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(DbConnection::connect_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    pub fn insert_task(&self, task: &Task) -> StoreResult<()> {
        TaskRepo::insert(&self.conn, task)?;
        self.feed.publish("tasks", ChangeKind::Insert, &task.id);
        Ok(())
    }

    pub fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        TaskRepo::list_all(&self.conn)
    }

    pub fn delete_task(&self, id: &str) -> StoreResult<bool> {
        let deleted = TaskRepo::delete(&self.conn, id)?;
        if deleted {
            self.feed.publish("tasks", ChangeKind::Delete, id);
        }
        Ok(deleted)
    }

    pub fn insert_deal(&self, deal_type: DealType, deal: &Deal) -> StoreResult<()> {
        DealRepo::insert(&self.conn, deal_type, deal)?;
        self.feed.publish(deal_type.deals_table(), ChangeKind::Insert, &deal.id);
        Ok(())
    }

    pub fn list_deals(&self, deal_type: DealType) -> StoreResult<Vec<Deal>> {
        DealRepo::list_all(&self.conn, deal_type)
    }

    pub fn insert_stage(&self, deal_type: DealType, stage: &Stage) -> StoreResult<()> {
        StageRepo::insert(&self.conn, deal_type, stage)?;
        self.feed.publish(deal_type.stages_table(), ChangeKind::Insert, &stage.id);
        Ok(())
    }

    pub fn insert_assignment(
        &self,
        deal_type: DealType,
        stage_id: &str,
        task_id: Option<&str>,
        member_id: Option<&str>,
    ) -> StoreResult<StageAssignment> {
        let assignment = AssignmentRepo::insert(&self.conn, deal_type, stage_id, task_id, member_id)?;
        self.feed.publish(
            deal_type.assignments_table(),
            ChangeKind::Insert,
            &assignment.id.to_string(),
        );
        Ok(assignment)
    }

    pub fn delete_assignment(&self, deal_type: DealType, id: i64) -> StoreResult<bool> {
        let deleted = AssignmentRepo::delete(&self.conn, deal_type, id)?;
        if deleted {
            self.feed.publish(deal_type.assignments_table(), ChangeKind::Delete, &id.to_string());
        }
        Ok(deleted)
    }
}

impl Store for SqliteStore {
    fn get_task(&self, id: &str) -> StoreResult<Option<Task>> {
        TaskRepo::get_by_id(&self.conn, id)
    }

    fn list_tasks_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Task>> {
        TaskRepo::list_by_ids(&self.conn, ids)
    }

    fn update_task_status(&self, id: &str, status: TaskStatus) -> StoreResult<bool> {
        let now = chrono::Utc::now().timestamp();
        let updated = TaskRepo::update_status(&self.conn, id, status, now)?;
        if updated {
            self.feed.publish("tasks", ChangeKind::Update, id);
        }
        Ok(updated)
    }

    fn list_completed_assigned_tasks(&self) -> StoreResult<Vec<Task>> {
        TaskRepo::list_completed_assigned(&self.conn)
    }

    fn list_assignments_by_task(&self, deal_type: DealType, task_id: &str) -> StoreResult<Vec<AssignmentLink>> {
        AssignmentRepo::list_by_task(&self.conn, deal_type, task_id)
    }

    fn list_assignments_by_stage(&self, deal_type: DealType, stage_id: &str) -> StoreResult<Vec<StageAssignment>> {
        AssignmentRepo::list_by_stage(&self.conn, deal_type, stage_id)
    }

    fn get_stage(&self, deal_type: DealType, id: &str) -> StoreResult<Option<Stage>> {
        StageRepo::get_by_id(&self.conn, deal_type, id)
    }

    fn list_stages_by_deal(&self, deal_type: DealType, deal_id: &str) -> StoreResult<Vec<Stage>> {
        StageRepo::list_by_deal(&self.conn, deal_type, deal_id)
    }

    fn update_stage(
        &self,
        deal_type: DealType,
        id: &str,
        patch: &StagePatch,
        expected: Option<StageStatus>,
    ) -> StoreResult<bool> {
        let updated = StageRepo::update(&self.conn, deal_type, id, patch, expected)?;
        if updated {
            self.feed.publish(deal_type.stages_table(), ChangeKind::Update, id);
        }
        Ok(updated)
    }

    fn get_deal(&self, deal_type: DealType, id: &str) -> StoreResult<Option<Deal>> {
        DealRepo::get_by_id(&self.conn, deal_type, id)
    }

    fn update_deal(
        &self,
        deal_type: DealType,
        id: &str,
        patch: &DealPatch,
        expected: Option<DealStatus>,
    ) -> StoreResult<bool> {
        let updated = DealRepo::update(&self.conn, deal_type, id, patch, expected)?;
        if updated {
            self.feed.publish(deal_type.deals_table(), ChangeKind::Update, id);
        }
        Ok(updated)
    }

    fn subscribe(&self, table: &str) -> Receiver<ChangeEvent> {
        self.feed.subscribe(table)
    }
}
