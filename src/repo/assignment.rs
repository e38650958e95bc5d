use rusqlite::Connection;
use crate::models::{AssignmentLink, DealType, StageAssignment};
use crate::store::StoreResult;

/// Stage assignment repository, parameterized by taxonomy
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// Link a task to a stage. Returns the new assignment row.
    pub fn insert(
        conn: &Connection,
        deal_type: DealType,
        stage_id: &str,
        task_id: Option<&str>,
        member_id: Option<&str>,
    ) -> StoreResult<StageAssignment> {
        conn.execute(
            &format!(
                "INSERT INTO {} (stage_id, task_id, member_id) VALUES (?1, ?2, ?3)",
                deal_type.assignments_table()
            ),
            rusqlite::params![stage_id, task_id, member_id],
        )?;

        Ok(StageAssignment {
            id: conn.last_insert_rowid(),
            stage_id: stage_id.to_string(),
            task_id: task_id.map(str::to_string),
            member_id: member_id.map(str::to_string),
        })
    }

    /// All assignment rows of a stage, including ones whose task was deleted
    pub fn list_by_stage(conn: &Connection, deal_type: DealType, stage_id: &str) -> StoreResult<Vec<StageAssignment>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT id, stage_id, task_id, member_id FROM {} WHERE stage_id = ?1 ORDER BY id",
            deal_type.assignments_table()
        ))?;
        let rows = stmt.query_map([stage_id], |row| {
            Ok(StageAssignment {
                id: row.get(0)?,
                stage_id: row.get(1)?,
                task_id: row.get(2)?,
                member_id: row.get(3)?,
            })
        })?;

        let mut assignments = Vec::new();
        for row in rows {
            assignments.push(row?);
        }
        Ok(assignments)
    }

    /// Assignments of a task joined with the owning stage's deal id
    pub fn list_by_task(conn: &Connection, deal_type: DealType, task_id: &str) -> StoreResult<Vec<AssignmentLink>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT a.stage_id, s.deal_id, a.task_id
             FROM {} a JOIN {} s ON s.id = a.stage_id
             WHERE a.task_id = ?1
             ORDER BY a.id",
            deal_type.assignments_table(),
            deal_type.stages_table()
        ))?;
        let rows = stmt.query_map([task_id], |row| {
            Ok(AssignmentLink {
                stage_id: row.get(0)?,
                deal_id: row.get(1)?,
                task_id: row.get(2)?,
            })
        })?;

        let mut links = Vec::new();
        for row in rows {
            links.push(row?);
        }
        Ok(links)
    }

    pub fn delete(conn: &Connection, deal_type: DealType, id: i64) -> StoreResult<bool> {
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", deal_type.assignments_table()),
            [id],
        )?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::models::{Deal, Stage, Task};
    use crate::repo::{DealRepo, StageRepo, TaskRepo};

    #[test]
    fn test_list_by_task_joins_deal() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let task = Task::new("Inspect".to_string());
        TaskRepo::insert(&conn, &task).unwrap();
        let deal = Deal::new("Flat 2");
        DealRepo::insert(&conn, DealType::Rental, &deal).unwrap();
        let stage = Stage::new(&deal.id, "Site Visit", 0);
        StageRepo::insert(&conn, DealType::Rental, &stage).unwrap();

        AssignmentRepo::insert(&conn, DealType::Rental, &stage.id, Some(&task.id), Some("m-7")).unwrap();

        let links = AssignmentRepo::list_by_task(&conn, DealType::Rental, &task.id).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].deal_id, deal.id);
        assert!(AssignmentRepo::list_by_task(&conn, DealType::Builder, &task.id).unwrap().is_empty());
    }

    #[test]
    fn test_deleting_task_nulls_assignment() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let task = Task::new("Inspect".to_string());
        TaskRepo::insert(&conn, &task).unwrap();
        let deal = Deal::new("Flat 2");
        DealRepo::insert(&conn, DealType::Rental, &deal).unwrap();
        let stage = Stage::new(&deal.id, "Site Visit", 0);
        StageRepo::insert(&conn, DealType::Rental, &stage).unwrap();
        AssignmentRepo::insert(&conn, DealType::Rental, &stage.id, Some(&task.id), None).unwrap();

        TaskRepo::delete(&conn, &task.id).unwrap();

        let rows = AssignmentRepo::list_by_stage(&conn, DealType::Rental, &stage.id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].task_id, None);
    }
}
