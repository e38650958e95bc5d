use rusqlite::{Connection, Result};
use std::collections::HashMap;
use crate::models::DealType;

/// Current database schema version
const CURRENT_VERSION: u32 = 2;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute("PRAGMA foreign_keys=ON", [])?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version: u32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        for version in (current_version + 1)..=CURRENT_VERSION {
            log::debug!("applying schema migration v{}", version);
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        if let Some(migration) = migrations.get(&version) {
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
            Ok(())
        } else {
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))
        }
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

type Migration = fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>;

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, Migration> {
    let mut migrations: HashMap<u32, Migration> = HashMap::new();
    migrations.insert(1, migration_v1);
    migrations.insert(2, migration_v2);
    migrations
}

/// Migration v1: tasks plus one deal/stage/assignment table set per taxonomy
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE tasks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            status TEXT NOT NULL CHECK(status IN ('not_started','pending','in_progress','completed','blocked','cancelled')),
            project_id TEXT NULL,
            priority TEXT NOT NULL DEFAULT 'medium' CHECK(priority IN ('low','medium','high','urgent')),
            due_date TEXT NULL,
            created_ts INTEGER NOT NULL,
            updated_ts INTEGER NOT NULL
        )",
        [],
    )?;

    // Rental and builder tables are identical apart from their names.
    for deal_type in DealType::ALL {
        let deals = deal_type.deals_table();
        let stages = deal_type.stages_table();
        let assignments = deal_type.assignments_table();

        tx.execute(
            &format!(
                "CREATE TABLE {deals} (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    status TEXT NOT NULL CHECK(status IN ('active','in_progress','completed','cancelled')),
                    actual_end_date TEXT NULL,
                    updated_ts INTEGER NOT NULL
                )"
            ),
            [],
        )?;

        tx.execute(
            &format!(
                "CREATE TABLE {stages} (
                    id TEXT PRIMARY KEY,
                    deal_id TEXT NOT NULL REFERENCES {deals}(id) ON DELETE CASCADE,
                    name TEXT NOT NULL,
                    status TEXT NOT NULL CHECK(status IN ('pending','in_progress','completed','skipped')),
                    stage_order INTEGER NOT NULL DEFAULT 0,
                    actual_end_date TEXT NULL,
                    updated_ts INTEGER NOT NULL
                )"
            ),
            [],
        )?;

        // task_id is nulled rather than cascaded so a deleted task leaves a
        // visible, empty assignment behind.
        tx.execute(
            &format!(
                "CREATE TABLE {assignments} (
                    id INTEGER PRIMARY KEY,
                    stage_id TEXT NOT NULL REFERENCES {stages}(id) ON DELETE CASCADE,
                    task_id TEXT NULL REFERENCES tasks(id) ON DELETE SET NULL,
                    member_id TEXT NULL
                )"
            ),
            [],
        )?;
    }

    Ok(())
}

/// Migration v2: lookup indexes for the cascade's hot queries
fn migration_v2(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute("CREATE INDEX idx_tasks_status ON tasks(status)", [])?;

    for deal_type in DealType::ALL {
        let stages = deal_type.stages_table();
        let assignments = deal_type.assignments_table();
        tx.execute(
            &format!("CREATE INDEX idx_{stages}_deal ON {stages}(deal_id)"),
            [],
        )?;
        tx.execute(
            &format!("CREATE INDEX idx_{assignments}_task ON {assignments}(task_id)"),
            [],
        )?;
        tx.execute(
            &format!("CREATE INDEX idx_{assignments}_stage ON {assignments}(stage_id)"),
            [],
        )?;
    }

    Ok(())
}
