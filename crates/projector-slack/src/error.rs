use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlackError {
    /// A required credential is missing — callers must fail closed.
    #[error("Slack not configured: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Slack Web API answered `ok: false`.
    #[error("Slack API error ({method}): {reason}")]
    Api { method: String, reason: String },

    #[error("tracking store error: {0}")]
    Tracking(#[from] projector_tracking::TrackingError),

    #[error("LLM provider error: {0}")]
    Provider(#[from] projector_agent::ProviderError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SlackError>;
