use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Active,
    InProgress,
    Completed,
    Cancelled,
}

impl DealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::Active => "active",
            DealStatus::InProgress => "in_progress",
            DealStatus::Completed => "completed",
            DealStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(DealStatus::Active),
            "in_progress" => Some(DealStatus::InProgress),
            "completed" => Some(DealStatus::Completed),
            "cancelled" => Some(DealStatus::Cancelled),
            _ => None,
        }
    }
}

/// Deal model (rental or builder, depending on the table it was read from)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub title: String,
    pub status: DealStatus,
    pub actual_end_date: Option<NaiveDate>,
    pub updated_ts: i64,
}

impl Deal {
    pub fn new(title: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            status: DealStatus::Active,
            actual_end_date: None,
            updated_ts: chrono::Utc::now().timestamp(),
        }
    }
}

/// Partial update for a deal row, same conventions as `StagePatch`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DealPatch {
    pub status: Option<DealStatus>,
    pub actual_end_date: Option<Option<NaiveDate>>,
    pub updated_ts: Option<i64>,
}

impl DealPatch {
    pub fn completed(date: NaiveDate, now_ts: i64) -> Self {
        Self {
            status: Some(DealStatus::Completed),
            actual_end_date: Some(Some(date)),
            updated_ts: Some(now_ts),
        }
    }

    pub fn reopened(now_ts: i64) -> Self {
        Self {
            status: Some(DealStatus::InProgress),
            actual_end_date: Some(None),
            updated_ts: Some(now_ts),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.actual_end_date.is_none() && self.updated_ts.is_none()
    }
}
