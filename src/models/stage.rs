use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Pipeline stage status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
    Skipped,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::InProgress => "in_progress",
            StageStatus::Completed => "completed",
            StageStatus::Skipped => "skipped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(StageStatus::Pending),
            "in_progress" => Some(StageStatus::InProgress),
            "completed" => Some(StageStatus::Completed),
            "skipped" => Some(StageStatus::Skipped),
            _ => None,
        }
    }
}

/// Stage model
/// A step in a deal's pipeline. `stage_order` is display order only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub deal_id: String,
    pub name: String,
    pub status: StageStatus,
    pub stage_order: i64,
    pub actual_end_date: Option<NaiveDate>,
    pub updated_ts: i64,
}

impl Stage {
    pub fn new(deal_id: &str, name: &str, stage_order: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            deal_id: deal_id.to_string(),
            name: name.to_string(),
            status: StageStatus::Pending,
            stage_order,
            actual_end_date: None,
            updated_ts: chrono::Utc::now().timestamp(),
        }
    }
}

/// Partial update for a stage row.
/// `actual_end_date: Some(None)` clears the column; `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagePatch {
    pub status: Option<StageStatus>,
    pub actual_end_date: Option<Option<NaiveDate>>,
    pub updated_ts: Option<i64>,
}

impl StagePatch {
    /// Patch marking a stage completed on `date`
    pub fn completed(date: NaiveDate, now_ts: i64) -> Self {
        Self {
            status: Some(StageStatus::Completed),
            actual_end_date: Some(Some(date)),
            updated_ts: Some(now_ts),
        }
    }

    /// Patch moving a stage to a non-completed status, clearing the end date
    pub fn open(status: StageStatus, now_ts: i64) -> Self {
        Self {
            status: Some(status),
            actual_end_date: Some(None),
            updated_ts: Some(now_ts),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.actual_end_date.is_none() && self.updated_ts.is_none()
    }
}
