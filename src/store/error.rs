use thiserror::Error;

/// Failure reported by the persistence collaborator.
/// Missing rows are not errors; lookups return `Option`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("corrupt row in {table} (id={id}): {detail}")]
    Corrupt {
        table: String,
        id: String,
        detail: String,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn corrupt(table: &str, id: &str, detail: impl Into<String>) -> Self {
        StoreError::Corrupt {
            table: table.to_string(),
            id: id.to_string(),
            detail: detail.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
