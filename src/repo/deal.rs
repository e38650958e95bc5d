use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{Deal, DealPatch, DealStatus, DealType};
use crate::repo::{date_param, decode_date, update_row, SetClause};
use crate::store::{StoreError, StoreResult};
use crate::utils::format_date;

const DEAL_COLUMNS: &str = "id, title, status, actual_end_date, updated_ts";

struct DealRow {
    id: String,
    title: String,
    status: String,
    actual_end_date: Option<String>,
    updated_ts: i64,
}

impl DealRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(DealRow {
            id: row.get(0)?,
            title: row.get(1)?,
            status: row.get(2)?,
            actual_end_date: row.get(3)?,
            updated_ts: row.get(4)?,
        })
    }

    fn into_deal(self, table: &str) -> StoreResult<Deal> {
        let status = DealStatus::from_str(&self.status).ok_or_else(|| {
            StoreError::corrupt(table, &self.id, format!("unknown status '{}'", self.status))
        })?;
        let actual_end_date = decode_date(table, &self.id, self.actual_end_date)?;
        Ok(Deal {
            id: self.id,
            title: self.title,
            status,
            actual_end_date,
            updated_ts: self.updated_ts,
        })
    }
}

/// Deal repository, parameterized by taxonomy
pub struct DealRepo;

impl DealRepo {
    pub fn insert(conn: &Connection, deal_type: DealType, deal: &Deal) -> StoreResult<()> {
        conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES (?1, ?2, ?3, ?4, ?5)",
                deal_type.deals_table(),
                DEAL_COLUMNS
            ),
            rusqlite::params![
                deal.id,
                deal.title,
                deal.status.as_str(),
                deal.actual_end_date.map(format_date),
                deal.updated_ts,
            ],
        )?;
        Ok(())
    }

    pub fn get_by_id(conn: &Connection, deal_type: DealType, id: &str) -> StoreResult<Option<Deal>> {
        let table = deal_type.deals_table();
        let mut stmt = conn.prepare(&format!("SELECT {} FROM {} WHERE id = ?1", DEAL_COLUMNS, table))?;
        let row = stmt.query_row([id], DealRow::read).optional()?;
        row.map(|r| r.into_deal(table)).transpose()
    }

    pub fn list_all(conn: &Connection, deal_type: DealType) -> StoreResult<Vec<Deal>> {
        let table = deal_type.deals_table();
        let mut stmt = conn.prepare(&format!("SELECT {} FROM {} ORDER BY title, id", DEAL_COLUMNS, table))?;
        let rows = stmt.query_map([], DealRow::read)?;

        let mut deals = Vec::new();
        for row in rows {
            deals.push(row?.into_deal(table)?);
        }
        Ok(deals)
    }

    /// Apply `patch` to a deal row, optionally guarded on the current status
    pub fn update(
        conn: &Connection,
        deal_type: DealType,
        id: &str,
        patch: &DealPatch,
        expected: Option<DealStatus>,
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
            deal_type.deals_table(),
            id,
            sets,
            expected.map(|s| s.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use chrono::NaiveDate;

    #[test]
    fn test_insert_get_and_complete() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let deal = Deal::new("Plot 12");
        DealRepo::insert(&conn, DealType::Builder, &deal).unwrap();
        assert!(DealRepo::get_by_id(&conn, DealType::Rental, &deal.id).unwrap().is_none());

        let date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let patch = DealPatch::completed(date, 42);
        assert!(DealRepo::update(&conn, DealType::Builder, &deal.id, &patch, None).unwrap());

        let loaded = DealRepo::get_by_id(&conn, DealType::Builder, &deal.id).unwrap().unwrap();
        assert_eq!(loaded.status, DealStatus::Completed);
        assert_eq!(loaded.actual_end_date, Some(date));
    }

    #[test]
    fn test_guarded_reopen_only_matches_completed() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let deal = Deal::new("Plot 12");
        DealRepo::insert(&conn, DealType::Builder, &deal).unwrap();

        let reopened = DealRepo::update(
            &conn,
            DealType::Builder,
            &deal.id,
            &DealPatch::reopened(1),
            Some(DealStatus::Completed),
        )
        .unwrap();
        assert!(!reopened);
        let loaded = DealRepo::get_by_id(&conn, DealType::Builder, &deal.id).unwrap().unwrap();
        assert_eq!(loaded.status, DealStatus::Active);
    }
}
