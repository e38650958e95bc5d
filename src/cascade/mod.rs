//! Stage and deal completion propagation
//!
//! A task status change flows upward through two levels: the stages the task
//! is assigned to, then the deals owning those stages. Rental and builder
//! taxonomies are evaluated independently with the same code.
//!
//! Two stage policies coexist and are kept as separate operations:
//!
//! - the aggregate gate ([`CompletionEngine::update_stage_completion`]) marks a
//!   stage completed only when every assigned task is completed, and feeds
//!   deal completion;
//! - the direct projection ([`CompletionEngine::sync_task_status_with_stage`])
//!   mirrors one task's status onto its stages for live display.
//!
//! When they disagree the projection wins, since callers run it on every
//! status change. [`CompletionEngine::apply_task_status`] fixes the order:
//! projection first, then the gate (completed) or the reopen cascade.
//!
//! Store failures never propagate out of the cascades. They are logged with
//! the operation, id and taxonomy, and the affected step counts as "did not
//! happen". Re-running the resync sweep repairs anything left behind.

pub mod stage;
pub mod deal;
pub mod projector;
pub mod completion;
pub mod reopen;
pub mod resync;

pub use resync::ResyncReport;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use crate::models::{AssignmentLink, DealType, TaskStatus};
use crate::store::{Store, StoreResult};

/// Source of "today" and "now" for completion writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Local calendar date and current Unix time
    System,
    /// Fixed instant, for tests and replays
    Fixed { today: NaiveDate, now_ts: i64 },
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed { today, .. } => *today,
        }
    }

    pub fn now_ts(&self) -> i64 {
        match self {
            Clock::System => chrono::Utc::now().timestamp(),
            Clock::Fixed { now_ts, .. } => *now_ts,
        }
    }
}

/// Outcome of one cascade entry point
///
/// The flags mean "became completed" for the completion cascade, "was
/// written" for the projection and "was reverted" for the reopen cascade.
/// The ids describe the last assignment processed, not every one touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeResult {
    pub stage_completed: bool,
    pub deal_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_type: Option<DealType>,
}

impl CascadeResult {
    /// Record the assignment just processed and fold in its flags
    fn record(&mut self, deal_type: DealType, link: &AssignmentLink, stage: bool, deal: bool) {
        self.stage_completed |= stage;
        self.deal_completed |= deal;
        self.stage_id = Some(link.stage_id.clone());
        self.deal_id = Some(link.deal_id.clone());
        self.deal_type = Some(deal_type);
    }

    /// Fold an earlier pass into this one. Flags are OR-ed; ids of this
    /// result win when present.
    fn absorb(&mut self, earlier: CascadeResult) {
        self.stage_completed |= earlier.stage_completed;
        self.deal_completed |= earlier.deal_completed;
        if self.stage_id.is_none() {
            self.stage_id = earlier.stage_id;
            self.deal_id = earlier.deal_id;
            self.deal_type = earlier.deal_type;
        }
    }
}

/// Completion engine over a borrowed store
pub struct CompletionEngine<'a, S: Store + ?Sized> {
    store: &'a S,
    clock: Clock,
}

impl<'a, S: Store + ?Sized> CompletionEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            clock: Clock::System,
        }
    }

    pub fn with_clock(store: &'a S, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        self.store
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Assignments of a task in one taxonomy, logging and swallowing failures
    fn links_for(&self, deal_type: DealType, task_id: &str) -> Vec<AssignmentLink> {
        match self.store.list_assignments_by_task(deal_type, task_id) {
            Ok(links) => links,
            Err(err) => {
                log::warn!(
                    "list_assignments_by_task failed (task={}, type={}): {}",
                    task_id, deal_type, err
                );
                Vec::new()
            }
        }
    }

    /// Persist a task's new status and run the cascades in caller order.
    ///
    /// Returns `Ok(None)` when the task does not exist. The only error is
    /// the status write itself; cascade failures are logged. The result
    /// merges the projection pass into the gate or reopen pass, so a revert
    /// already done by the projection is still reported.
    pub fn apply_task_status(&self, task_id: &str, status: TaskStatus) -> StoreResult<Option<CascadeResult>> {
        if !self.store.update_task_status(task_id, status)? {
            log::info!("apply_task_status: task {} not found", task_id);
            return Ok(None);
        }

        let projected = self.sync_task_status_with_stage(task_id);
        log::debug!("projection for task {}: {:?}", task_id, projected);

        let mut result = if status.is_completed() {
            self.handle_task_completion(task_id)
        } else {
            self.handle_task_reopening(task_id)
        };
        result.absorb(projected);
        Ok(Some(result))
    }
}
