use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Browserbase API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("capture not configured: {0}")]
    Config(String),

    #[error("renderer error: {0}")]
    Renderer(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, CaptureError>;
