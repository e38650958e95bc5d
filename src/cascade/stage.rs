use std::collections::BTreeSet;
use crate::cascade::CompletionEngine;
use crate::models::{DealType, StagePatch};
use crate::store::{Store, StoreResult};

impl<S: Store + ?Sized> CompletionEngine<'_, S> {
    /// Whether every task assigned to the stage is completed.
    ///
    /// A stage with no assignments, or only assignments whose task reference
    /// was cleared, is complete. If the referenced tasks cannot be loaded at
    /// all the stage is not complete.
    pub fn is_stage_complete(&self, stage_id: &str, deal_type: DealType) -> StoreResult<bool> {
        let assignments = self.store.list_assignments_by_stage(deal_type, stage_id)?;
        if assignments.is_empty() {
            return Ok(true);
        }

        let task_ids: Vec<String> = assignments
            .into_iter()
            .filter_map(|a| a.task_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if task_ids.is_empty() {
            return Ok(true);
        }

        let tasks = self.store.list_tasks_by_ids(&task_ids)?;
        if tasks.is_empty() {
            log::debug!(
                "stage {} ({}): none of {} assigned tasks found",
                stage_id, deal_type, task_ids.len()
            );
            return Ok(false);
        }

        Ok(tasks.iter().all(|t| t.status.is_completed()))
    }

    /// Aggregate gate: mark the stage completed if all its tasks are.
    ///
    /// The write is unconditional; concurrent evaluators may overwrite each
    /// other. Returns true only when the stage was written as completed.
    pub fn update_stage_completion(&self, stage_id: &str, deal_type: DealType) -> bool {
        let complete = match self.is_stage_complete(stage_id, deal_type) {
            Ok(complete) => complete,
            Err(err) => {
                log::warn!("is_stage_complete failed (stage={}, type={}): {}", stage_id, deal_type, err);
                return false;
            }
        };
        if !complete {
            return false;
        }

        let patch = StagePatch::completed(self.clock.today(), self.clock.now_ts());
        match self.store.update_stage(deal_type, stage_id, &patch, None) {
            Ok(true) => {
                log::info!("stage {} ({}) completed", stage_id, deal_type);
                true
            }
            Ok(false) => {
                log::warn!("update_stage: stage {} ({}) not found", stage_id, deal_type);
                false
            }
            Err(err) => {
                log::warn!("update_stage failed (stage={}, type={}): {}", stage_id, deal_type, err);
                false
            }
        }
    }
}
