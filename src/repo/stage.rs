use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{DealType, Stage, StagePatch, StageStatus};
use crate::repo::{date_param, decode_date, update_row, SetClause};
use crate::store::{StoreError, StoreResult};
use crate::utils::format_date;

const STAGE_COLUMNS: &str = "id, deal_id, name, status, stage_order, actual_end_date, updated_ts";

struct StageRow {
    id: String,
    deal_id: String,
    name: String,
    status: String,
    stage_order: i64,
    actual_end_date: Option<String>,
    updated_ts: i64,
}

impl StageRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(StageRow {
            id: row.get(0)?,
            deal_id: row.get(1)?,
            name: row.get(2)?,
            status: row.get(3)?,
            stage_order: row.get(4)?,
            actual_end_date: row.get(5)?,
            updated_ts: row.get(6)?,
        })
    }

    fn into_stage(self, table: &str) -> StoreResult<Stage> {
        let status = StageStatus::from_str(&self.status).ok_or_else(|| {
            StoreError::corrupt(table, &self.id, format!("unknown status '{}'", self.status))
        })?;
        let actual_end_date = decode_date(table, &self.id, self.actual_end_date)?;
        Ok(Stage {
            id: self.id,
            deal_id: self.deal_id,
            name: self.name,
            status,
            stage_order: self.stage_order,
            actual_end_date,
            updated_ts: self.updated_ts,
        })
    }
}

/// Stage repository, parameterized by taxonomy
pub struct StageRepo;

impl StageRepo {
    pub fn insert(conn: &Connection, deal_type: DealType, stage: &Stage) -> StoreResult<()> {
        conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                deal_type.stages_table(),
                STAGE_COLUMNS
            ),
            rusqlite::params![
                stage.id,
                stage.deal_id,
                stage.name,
                stage.status.as_str(),
                stage.stage_order,
                stage.actual_end_date.map(format_date),
                stage.updated_ts,
            ],
        )?;
        Ok(())
    }

    pub fn get_by_id(conn: &Connection, deal_type: DealType, id: &str) -> StoreResult<Option<Stage>> {
        let table = deal_type.stages_table();
        let mut stmt = conn.prepare(&format!("SELECT {} FROM {} WHERE id = ?1", STAGE_COLUMNS, table))?;
        let row = stmt.query_row([id], StageRow::read).optional()?;
        row.map(|r| r.into_stage(table)).transpose()
    }

    /// All stages of a deal ordered by `stage_order`
    pub fn list_by_deal(conn: &Connection, deal_type: DealType, deal_id: &str) -> StoreResult<Vec<Stage>> {
        let table = deal_type.stages_table();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE deal_id = ?1 ORDER BY stage_order, id",
            STAGE_COLUMNS, table
        ))?;
        let rows = stmt.query_map([deal_id], StageRow::read)?;

        let mut stages = Vec::new();
        for row in rows {
            stages.push(row?.into_stage(table)?);
        }
        Ok(stages)
    }

    /// Apply `patch` to a stage row.
    /// `expected` turns the write into a compare-and-swap on the current status.
    pub fn update(
        conn: &Connection,
        deal_type: DealType,
        id: &str,
        patch: &StagePatch,
        expected: Option<StageStatus>,
    ) -> StoreResult<bool> {
        let mut sets: Vec<SetClause> = Vec::new();
        if let Some(status) = patch.status {
            sets.push(("status", Box::new(status.as_str())));
        }
        if let Some(date) = patch.actual_end_date {
            sets.push(("actual_end_date", date_param(date)));
        }
        if let Some(ts) = patch.updated_ts {
            sets.push(("updated_ts", Box::new(ts)));
        }

        update_row(
            conn,
            deal_type.stages_table(),
            id,
            sets,
            expected.map(|s| s.as_str()),
        )
    }
}
