use crate::cascade::{CascadeResult, CompletionEngine};
use crate::models::DealType;
use crate::store::Store;

impl<S: Store + ?Sized> CompletionEngine<'_, S> {
    /// Completion cascade for a task that has just been marked completed.
    ///
    /// Every stage the task is assigned to, in both taxonomies, goes through
    /// the stage gate; each stage that completes sends its deal through the
    /// deal gate. A missing task yields an all-false result.
    pub fn handle_task_completion(&self, task_id: &str) -> CascadeResult {
        let mut result = CascadeResult::default();

        match self.store.get_task(task_id) {
            Ok(Some(_)) => {}
            Ok(None) => {
                log::info!("handle_task_completion: task {} not found", task_id);
                return result;
            }
            Err(err) => {
                log::warn!("get_task failed (task={}): {}", task_id, err);
                return result;
            }
        }

        for deal_type in DealType::ALL {
            for link in self.links_for(deal_type, task_id) {
                let stage_completed = self.update_stage_completion(&link.stage_id, deal_type);
                let deal_completed = stage_completed && self.update_deal_completion(&link.deal_id, deal_type);
                result.record(deal_type, &link, stage_completed, deal_completed);
            }
        }

        log::debug!("completion cascade for task {}: {:?}", task_id, result);
        result
    }
}
