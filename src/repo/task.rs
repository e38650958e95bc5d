use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{DealType, Task, TaskPriority, TaskStatus};
use crate::repo::{decode_date, placeholders};
use crate::store::{StoreError, StoreResult};
use crate::utils::format_date;

const TASK_COLUMNS: &str = "id, title, status, project_id, priority, due_date, created_ts, updated_ts";

/// Raw task row before status and date decoding
struct TaskRow {
    id: String,
    title: String,
    status: String,
    project_id: Option<String>,
    priority: String,
    due_date: Option<String>,
    created_ts: i64,
    updated_ts: i64,
}

impl TaskRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TaskRow {
            id: row.get(0)?,
            title: row.get(1)?,
            status: row.get(2)?,
            project_id: row.get(3)?,
            priority: row.get(4)?,
            due_date: row.get(5)?,
            created_ts: row.get(6)?,
            updated_ts: row.get(7)?,
        })
    }

    fn into_task(self) -> StoreResult<Task> {
        let status = TaskStatus::from_str(&self.status).ok_or_else(|| {
            StoreError::corrupt("tasks", &self.id, format!("unknown status '{}'", self.status))
        })?;
        let priority = TaskPriority::from_str(&self.priority).ok_or_else(|| {
            StoreError::corrupt("tasks", &self.id, format!("unknown priority '{}'", self.priority))
        })?;
        let due_date = decode_date("tasks", &self.id, self.due_date)?;

        Ok(Task {
            id: self.id,
            title: self.title,
            status,
            project_id: self.project_id,
            priority,
            due_date,
            created_ts: self.created_ts,
            updated_ts: self.updated_ts,
        })
    }
}

fn collect_tasks(rows: impl Iterator<Item = rusqlite::Result<TaskRow>>) -> StoreResult<Vec<Task>> {
    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(row?.into_task()?);
    }
    Ok(tasks)
}

/// Task repository for database operations
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task row
    pub fn insert(conn: &Connection, task: &Task) -> StoreResult<()> {
        conn.execute(
            &format!("INSERT INTO tasks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)", TASK_COLUMNS),
            rusqlite::params![
                task.id,
                task.title,
                task.status.as_str(),
                task.project_id,
                task.priority.as_str(),
                task.due_date.map(format_date),
                task.created_ts,
                task.updated_ts,
            ],
        )?;
        Ok(())
    }

    /// Get task by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> StoreResult<Option<Task>> {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS))?;
        let row = stmt.query_row([id], TaskRow::read).optional()?;
        row.map(TaskRow::into_task).transpose()
    }

    /// Load every task whose id is in `ids`; unknown ids are skipped
    pub fn list_by_ids(conn: &Connection, ids: &[String]) -> StoreResult<Vec<Task>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM tasks WHERE id IN ({}) ORDER BY id",
            TASK_COLUMNS,
            placeholders(ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), TaskRow::read)?;
        collect_tasks(rows)
    }

    /// List all tasks, oldest first
    pub fn list_all(conn: &Connection) -> StoreResult<Vec<Task>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tasks ORDER BY created_ts, id",
            TASK_COLUMNS
        ))?;
        let rows = stmt.query_map([], TaskRow::read)?;
        collect_tasks(rows)
    }

    /// Completed tasks with at least one stage assignment in any taxonomy
    pub fn list_completed_assigned(conn: &Connection) -> StoreResult<Vec<Task>> {
        let exists = DealType::ALL
            .iter()
            .map(|dt| {
                format!(
                    "EXISTS (SELECT 1 FROM {} a WHERE a.task_id = tasks.id)",
                    dt.assignments_table()
                )
            })
            .collect::<Vec<_>>()
            .join(" OR ");
        let sql = format!(
            "SELECT {} FROM tasks WHERE status = 'completed' AND ({}) ORDER BY created_ts, id",
            TASK_COLUMNS, exists
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], TaskRow::read)?;
        collect_tasks(rows)
    }

    /// Set a task's status. Returns false if no such task exists.
    pub fn update_status(conn: &Connection, id: &str, status: TaskStatus, now_ts: i64) -> StoreResult<bool> {
        let updated = conn.execute(
            "UPDATE tasks SET status = ?1, updated_ts = ?2 WHERE id = ?3",
            rusqlite::params![status.as_str(), now_ts, id],
        )?;
        Ok(updated > 0)
    }

    /// Delete a task. Assignments keep their row with a NULL task reference.
    pub fn delete(conn: &Connection, id: &str) -> StoreResult<bool> {
        let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }
}
