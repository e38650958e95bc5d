use crate::cascade::CompletionEngine;
use crate::models::{DealPatch, DealStatus, DealType, StageStatus};
use crate::store::{Store, StoreResult};

impl<S: Store + ?Sized> CompletionEngine<'_, S> {
    /// Whether every stage of the deal is completed. A deal with no stages is.
    pub fn is_deal_complete(&self, deal_id: &str, deal_type: DealType) -> StoreResult<bool> {
        let stages = self.store.list_stages_by_deal(deal_type, deal_id)?;
        Ok(stages.iter().all(|s| s.status == StageStatus::Completed))
    }

    /// Aggregate gate one level up: mark the deal completed if all stages are
    pub fn update_deal_completion(&self, deal_id: &str, deal_type: DealType) -> bool {
        let complete = match self.is_deal_complete(deal_id, deal_type) {
            Ok(complete) => complete,
            Err(err) => {
                log::warn!("is_deal_complete failed (deal={}, type={}): {}", deal_id, deal_type, err);
                return false;
            }
        };
        if !complete {
            return false;
        }

        let patch = DealPatch::completed(self.clock.today(), self.clock.now_ts());
        match self.store.update_deal(deal_type, deal_id, &patch, None) {
            Ok(true) => {
                log::info!("deal {} ({}) completed", deal_id, deal_type);
                true
            }
            Ok(false) => {
                log::warn!("update_deal: deal {} ({}) not found", deal_id, deal_type);
                false
            }
            Err(err) => {
                log::warn!("update_deal failed (deal={}, type={}): {}", deal_id, deal_type, err);
                false
            }
        }
    }

    /// Compare-and-swap a completed deal back to in_progress.
    /// Returns true only if the deal was completed and has been reverted.
    pub(crate) fn revert_deal_if_completed(&self, deal_id: &str, deal_type: DealType) -> bool {
        let patch = DealPatch::reopened(self.clock.now_ts());
        match self.store.update_deal(deal_type, deal_id, &patch, Some(DealStatus::Completed)) {
            Ok(reverted) => {
                if reverted {
                    log::info!("deal {} ({}) reopened", deal_id, deal_type);
                }
                reverted
            }
            Err(err) => {
                log::warn!("update_deal (reopen) failed (deal={}, type={}): {}", deal_id, deal_type, err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cascade::{Clock, CompletionEngine};
    use crate::models::{Deal, DealStatus, DealType, Stage, StagePatch, StageStatus};
    use crate::store::{SqliteStore, Store};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn deal_with_stages(store: &SqliteStore, statuses: &[StageStatus]) -> Deal {
        let deal = Deal::new("Plot 3");
        store.insert_deal(DealType::Builder, &deal).unwrap();
        for (i, status) in statuses.iter().enumerate() {
            let mut stage = Stage::new(&deal.id, &format!("stage {}", i), i as i64);
            stage.status = *status;
            store.insert_stage(DealType::Builder, &stage).unwrap();
        }
        deal
    }

    #[test]
    fn test_deal_without_stages_is_complete() {
        let store = SqliteStore::open_in_memory().unwrap();
        let deal = deal_with_stages(&store, &[]);
        let engine = CompletionEngine::new(&store);
        assert!(engine.is_deal_complete(&deal.id, DealType::Builder).unwrap());
    }

    #[test]
    fn test_any_open_stage_blocks_deal() {
        for other in [StageStatus::Pending, StageStatus::InProgress, StageStatus::Skipped] {
            let store = SqliteStore::open_in_memory().unwrap();
            let deal = deal_with_stages(&store, &[StageStatus::Completed, other]);
            let engine = CompletionEngine::new(&store);
            assert!(!engine.is_deal_complete(&deal.id, DealType::Builder).unwrap());
        }
    }

    #[test]
    fn test_update_deal_completion() {
        let store = SqliteStore::open_in_memory().unwrap();
        let deal = deal_with_stages(&store, &[StageStatus::Completed, StageStatus::Pending]);
        let engine = CompletionEngine::with_clock(&store, Clock::Fixed { today: today(), now_ts: 7 });

        assert!(!engine.update_deal_completion(&deal.id, DealType::Builder));

        let open = store
            .list_stages_by_deal(DealType::Builder, &deal.id)
            .unwrap()
            .into_iter()
            .find(|s| s.status == StageStatus::Pending)
            .unwrap();
        store
            .update_stage(DealType::Builder, &open.id, &StagePatch::completed(today(), 7), None)
            .unwrap();

        assert!(engine.update_deal_completion(&deal.id, DealType::Builder));
        let loaded = store.get_deal(DealType::Builder, &deal.id).unwrap().unwrap();
        assert_eq!(loaded.status, DealStatus::Completed);
        assert_eq!(loaded.actual_end_date, Some(today()));
    }

    #[test]
    fn test_missing_deal_is_not_written() {
        let store = SqliteStore::open_in_memory().unwrap();
        let engine = CompletionEngine::new(&store);
        // No stages means complete, but there is no row to write
        assert!(!engine.update_deal_completion("ghost", DealType::Rental));
    }
}
