use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZoomError {
    /// A required credential is missing — callers must fail closed.
    #[error("Zoom not configured: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Zoom API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No stored tokens for this user — the account never completed OAuth.
    #[error("account not authorized: {user_id}")]
    NotAuthorized { user_id: String },

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ZoomError>;
