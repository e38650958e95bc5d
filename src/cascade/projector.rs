use crate::cascade::{CascadeResult, CompletionEngine};
use crate::models::{AssignmentLink, DealStatus, DealType, Stage, StagePatch, StageStatus, TaskStatus};
use crate::store::Store;

/// Stage status mirrored from a single task's status
pub fn projected_stage_status(status: TaskStatus) -> StageStatus {
    match status {
        TaskStatus::Completed => StageStatus::Completed,
        TaskStatus::InProgress => StageStatus::InProgress,
        TaskStatus::NotStarted | TaskStatus::Pending | TaskStatus::Blocked | TaskStatus::Cancelled => {
            StageStatus::Pending
        }
    }
}

/// Patch needed to bring `stage` in line with `target`, or None if it already is.
/// A completed stage keeps its original end date.
fn projection_patch(stage: &Stage, target: StageStatus, today: chrono::NaiveDate, now_ts: i64) -> Option<StagePatch> {
    let has_end_date = stage.actual_end_date.is_some();
    if target == StageStatus::Completed {
        if stage.status == StageStatus::Completed && has_end_date {
            return None;
        }
        return Some(StagePatch::completed(today, now_ts));
    }
    if stage.status == target && !has_end_date {
        return None;
    }
    Some(StagePatch::open(target, now_ts))
}

impl<S: Store + ?Sized> CompletionEngine<'_, S> {
    /// Direct projection: mirror the task's status onto every stage it is
    /// assigned to, in both taxonomies, without looking at sibling tasks.
    ///
    /// The owning deal is then reconciled: completed through the deal gate
    /// when the task is completed, reverted with compare-and-swap otherwise.
    /// Rows already holding the target values are not rewritten.
    pub fn sync_task_status_with_stage(&self, task_id: &str) -> CascadeResult {
        let mut result = CascadeResult::default();

        let task = match self.store.get_task(task_id) {
            Ok(Some(task)) => task,
            Ok(None) => {
                log::info!("sync_task_status_with_stage: task {} not found", task_id);
                return result;
            }
            Err(err) => {
                log::warn!("get_task failed (task={}): {}", task_id, err);
                return result;
            }
        };

        let target = projected_stage_status(task.status);
        for deal_type in DealType::ALL {
            for link in self.links_for(deal_type, task_id) {
                let stage_updated = self.project_stage(deal_type, &link, target);
                let deal_updated = self.reconcile_deal(deal_type, &link.deal_id, target);
                result.record(deal_type, &link, stage_updated, deal_updated);
            }
        }

        result
    }

    fn project_stage(&self, deal_type: DealType, link: &AssignmentLink, target: StageStatus) -> bool {
        let stage = match self.store.get_stage(deal_type, &link.stage_id) {
            Ok(Some(stage)) => stage,
            Ok(None) => {
                log::warn!("get_stage: stage {} ({}) not found", link.stage_id, deal_type);
                return false;
            }
            Err(err) => {
                log::warn!("get_stage failed (stage={}, type={}): {}", link.stage_id, deal_type, err);
                return false;
            }
        };

        let Some(patch) = projection_patch(&stage, target, self.clock.today(), self.clock.now_ts()) else {
            return false;
        };

        match self.store.update_stage(deal_type, &stage.id, &patch, None) {
            Ok(updated) => {
                if updated {
                    log::debug!("stage {} ({}) projected to {}", stage.id, deal_type, target.as_str());
                }
                updated
            }
            Err(err) => {
                log::warn!("update_stage failed (stage={}, type={}): {}", stage.id, deal_type, err);
                false
            }
        }
    }

    fn reconcile_deal(&self, deal_type: DealType, deal_id: &str, target: StageStatus) -> bool {
        if target != StageStatus::Completed {
            return self.revert_deal_if_completed(deal_id, deal_type);
        }

        match self.store.get_deal(deal_type, deal_id) {
            Ok(Some(deal)) if deal.status == DealStatus::Completed => false,
            Ok(Some(_)) => self.update_deal_completion(deal_id, deal_type),
            Ok(None) => {
                log::warn!("get_deal: deal {} ({}) not found", deal_id, deal_type);
                false
            }
            Err(err) => {
                log::warn!("get_deal failed (deal={}, type={}): {}", deal_id, deal_type, err);
                false
            }
        }
    }
}
