use serde::{Deserialize, Serialize};
use std::fmt;

/// Deal taxonomy tag
///
/// Rental and builder pipelines live in structurally identical tables that
/// never reference each other. Each variant carries its own table names so
/// evaluation code is written once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealType {
    Rental,
    Builder,
}

impl DealType {
    /// Both taxonomies, in the order the cascade visits them
    pub const ALL: [DealType; 2] = [DealType::Rental, DealType::Builder];

    pub fn as_str(&self) -> &'static str {
        match self {
            DealType::Rental => "rental",
            DealType::Builder => "builder",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "rental" => Some(DealType::Rental),
            "builder" => Some(DealType::Builder),
            _ => None,
        }
    }

    pub fn deals_table(&self) -> &'static str {
        match self {
            DealType::Rental => "rental_deals",
            DealType::Builder => "builder_deals",
        }
    }

    pub fn stages_table(&self) -> &'static str {
        match self {
            DealType::Rental => "rental_stages",
            DealType::Builder => "builder_stages",
        }
    }

    pub fn assignments_table(&self) -> &'static str {
        match self {
            DealType::Rental => "rental_stage_tasks",
            DealType::Builder => "builder_stage_tasks",
        }
    }
}

impl fmt::Display for DealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
