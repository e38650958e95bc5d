use serde::{Deserialize, Serialize};

/// Stage assignment model
/// Links one task to one stage within a single taxonomy. `task_id` becomes
/// NULL when the referenced task is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAssignment {
    pub id: i64,
    pub stage_id: String,
    pub task_id: Option<String>,
    pub member_id: Option<String>,
}

/// Assignment joined with its owning stage's deal, as returned by task lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentLink {
    pub stage_id: String,
    pub deal_id: String,
    pub task_id: String,
}
