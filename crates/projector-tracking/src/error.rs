use thiserror::Error;

/// Errors that can occur during tracking-store operations.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// A SQLite operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, TrackingError>;
