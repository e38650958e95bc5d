pub mod task;
pub mod stage;
pub mod deal;
pub mod assignment;

pub use task::*;
pub use stage::*;
pub use deal::*;
pub use assignment::*;

use chrono::NaiveDate;
use rusqlite::{types::ToSql, Connection};
use crate::store::{StoreError, StoreResult};
use crate::utils::{format_date, parse_stored_date};

/// One `column = ?` assignment of a dynamic UPDATE
pub(crate) type SetClause = (&'static str, Box<dyn ToSql>);

/// Run `UPDATE table SET ... WHERE id = ?` built from `sets`.
///
/// With `expected_status` the predicate also requires the stored status to
/// match, making the write a compare-and-swap. Returns whether a row matched.
pub(crate) fn update_row(
    conn: &Connection,
    table: &str,
    id: &str,
    sets: Vec<SetClause>,
    expected_status: Option<&str>,
) -> StoreResult<bool> {
    if sets.is_empty() {
        return Ok(false);
    }

    let mut params: Vec<Box<dyn ToSql>> = Vec::new();
    let mut numbered_sets = Vec::new();
    for (column, value) in sets {
        params.push(value);
        numbered_sets.push(format!("{} = ?{}", column, params.len()));
    }

    params.push(Box::new(id.to_string()));
    let mut sql = format!(
        "UPDATE {} SET {} WHERE id = ?{}",
        table,
        numbered_sets.join(", "),
        params.len()
    );

    if let Some(status) = expected_status {
        params.push(Box::new(status.to_string()));
        sql.push_str(&format!(" AND status = ?{}", params.len()));
    }

    let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let updated = conn.execute(&sql, param_refs.as_slice())?;
    Ok(updated > 0)
}

/// Encode an optional date for a nullable TEXT column
pub(crate) fn date_param(date: Option<NaiveDate>) -> Box<dyn ToSql> {
    Box::new(date.map(format_date))
}

/// Decode a nullable TEXT date column
pub(crate) fn decode_date(table: &str, id: &str, raw: Option<String>) -> StoreResult<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(value) => parse_stored_date(&value)
            .map(Some)
            .ok_or_else(|| StoreError::corrupt(table, id, format!("bad date '{}'", value))),
    }
}

/// `?1, ?2, ...` placeholder list for an IN clause
pub(crate) fn placeholders(count: usize) -> String {
    (1..=count).map(|i| format!("?{}", i)).collect::<Vec<_>>().join(", ")
}
