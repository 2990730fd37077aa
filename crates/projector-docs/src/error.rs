use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocsError {
    #[error("docs access not configured: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google Docs API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The URL does not contain a recognisable document id.
    #[error("invalid document URL: {0}")]
    InvalidUrl(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, DocsError>;
