use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{CaptureError, Result};

/// Browserbase REST client — session lifecycle only. Each capture runs in
/// a fresh session so a hung page never poisons the next request.
pub struct BrowserbaseClient {
    http: reqwest::Client,
    api_key: Option<String>,
    project_id: Option<String>,
    base_url: String,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: Option<String>,
}

impl BrowserbaseClient {
    pub fn new(api_key: Option<String>, project_id: Option<String>, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            project_id,
            base_url,
        }
    }

    /// Create a new browser session and return its id.
    pub async fn create_session(&self) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CaptureError::Config("Browserbase API key not set".into()))?;
        let project_id = self
            .project_id
            .as_deref()
            .ok_or_else(|| CaptureError::Config("Browserbase project id not set".into()))?;

        let url = format!("{}/v1/sessions", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("x-bb-api-key", api_key)
            .json(&serde_json::json!({ "projectId": project_id }))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Browserbase session creation failed");
            return Err(CaptureError::Api {
                status,
                message: text,
            });
        }

        let session: SessionResponse = resp
            .json()
            .await
            .map_err(|e| CaptureError::Parse(e.to_string()))?;

        let id = session
            .id
            .ok_or_else(|| CaptureError::Parse("no session id returned from Browserbase".into()))?;
        debug!(session_id = %id, "Browserbase session created");
        Ok(id)
    }
}
