pub mod chart;
pub mod compare;
pub mod database;
pub mod query;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite operation failed")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unknown file id {0}")]
    UnknownFile(i64),
}
