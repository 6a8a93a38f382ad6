use thiserror::Error;

/// Typed failures surfaced by the feedback store. The API layer maps
/// these to HTTP statuses at the handler boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("feedback comment {0} not found")]
    NotFound(i64),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Db(#[from] rusqlite::Error),
    #[error("database lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
