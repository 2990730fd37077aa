pub mod db;
pub mod error;
pub mod oauth;
pub mod tokens;
pub mod transcript;
pub mod webhook;

pub use error::ZoomError;
pub use oauth::{OAuthClient, TokenResponse};
pub use tokens::{StoredTokens, TokenStore};
pub use webhook::{validation_response, WebhookEnvelope, ZoomEvent};
