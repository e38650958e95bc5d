use serde::Serialize;
use crate::cascade::CompletionEngine;
use crate::store::Store;

/// Summary of one resync sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResyncReport {
    /// Completed, assigned tasks found
    pub scanned: usize,
    /// Tasks whose projection ran
    pub synced: usize,
    /// Tasks skipped because they could not be loaded
    pub failed: usize,
    /// Tasks whose projection rewrote at least one stage
    pub stages_updated: usize,
    /// Tasks whose projection rewrote at least one deal
    pub deals_updated: usize,
}

impl<S: Store + ?Sized> CompletionEngine<'_, S> {
    /// Repair sweep: re-project every completed task that has an assignment.
    ///
    /// Idempotent; a second run with no task changes in between writes
    /// nothing. A task that fails is logged and skipped.
    pub fn sync_all_completed_tasks_with_stages(&self) -> ResyncReport {
        let mut report = ResyncReport::default();

        let tasks = match self.store.list_completed_assigned_tasks() {
            Ok(tasks) => tasks,
            Err(err) => {
                log::warn!("list_completed_assigned_tasks failed: {}", err);
                return report;
            }
        };
        report.scanned = tasks.len();

        for task in tasks {
            // Re-read so a task deleted or reopened mid-sweep is skipped
            match self.store.get_task(&task.id) {
                Ok(Some(current)) if current.status.is_completed() => {}
                Ok(_) => {
                    log::info!("resync: task {} changed during sweep, skipping", task.id);
                    continue;
                }
                Err(err) => {
                    log::warn!("resync: get_task failed (task={}): {}", task.id, err);
                    report.failed += 1;
                    continue;
                }
            }

            let result = self.sync_task_status_with_stage(&task.id);
            report.synced += 1;
            if result.stage_completed {
                report.stages_updated += 1;
            }
            if result.deal_completed {
                report.deals_updated += 1;
            }
        }

        log::info!(
            "resync: scanned={} synced={} failed={} stages_updated={} deals_updated={}",
            report.scanned, report.synced, report.failed, report.stages_updated, report.deals_updated
        );
        report
    }
}
