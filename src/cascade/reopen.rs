use crate::cascade::{CascadeResult, CompletionEngine};
use crate::models::{DealType, StagePatch, StageStatus};
use crate::store::Store;

impl<S: Store + ?Sized> CompletionEngine<'_, S> {
    /// Reopen cascade for a task that left `completed`.
    ///
    /// Completed stages and deals above the task go back to `in_progress`
    /// with their end date cleared. Both writes carry `status = 'completed'`
    /// in their predicate, so anything not completed at write time is left
    /// alone. The result flags mean "was reverted".
    pub fn handle_task_reopening(&self, task_id: &str) -> CascadeResult {
        let mut result = CascadeResult::default();

        match self.store.get_task(task_id) {
            Ok(Some(_)) => {}
            Ok(None) => {
                log::info!("handle_task_reopening: task {} not found", task_id);
                return result;
            }
            Err(err) => {
                log::warn!("get_task failed (task={}): {}", task_id, err);
                return result;
            }
        }

        for deal_type in DealType::ALL {
            for link in self.links_for(deal_type, task_id) {
                let stage_reverted = self.revert_stage_if_completed(&link.stage_id, deal_type);
                let deal_reverted = self.revert_deal_if_completed(&link.deal_id, deal_type);
                result.record(deal_type, &link, stage_reverted, deal_reverted);
            }
        }

        log::debug!("reopen cascade for task {}: {:?}", task_id, result);
        result
    }

    fn revert_stage_if_completed(&self, stage_id: &str, deal_type: DealType) -> bool {
        let patch = StagePatch::open(StageStatus::InProgress, self.clock.now_ts());
        match self.store.update_stage(deal_type, stage_id, &patch, Some(StageStatus::Completed)) {
            Ok(reverted) => {
                if reverted {
                    log::info!("stage {} ({}) reopened", stage_id, deal_type);
                }
                reverted
            }
            Err(err) => {
                log::warn!("update_stage (reopen) failed (stage={}, type={}): {}", stage_id, deal_type, err);
                false
            }
        }
    }
}
