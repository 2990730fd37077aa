use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::browserbase::BrowserbaseClient;
use crate::engine::{PageShot, ScreenshotEngine};
use crate::error::{CaptureError, Result};

/// `ScreenshotEngine` backed by the remote renderer collaborator.
///
/// Creates a Browserbase session per capture, then asks the renderer
/// service to drive the page inside that session and hand back the
/// screenshot. The renderer owns the browser protocol; this side owns
/// session lifecycle and error classification.
pub struct RemoteRenderer {
    http: reqwest::Client,
    browserbase: BrowserbaseClient,
    renderer_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderResponse {
    base64_image: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageCountResponse {
    total_pages: Option<u32>,
    error: Option<String>,
}

impl RemoteRenderer {
    pub fn new(browserbase: BrowserbaseClient, renderer_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            browserbase,
            renderer_url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<String> {
        let base = self
            .renderer_url
            .as_deref()
            .ok_or_else(|| CaptureError::Config("renderer URL not set".into()))?;
        Ok(format!("{}/{}", base.trim_end_matches('/'), path))
    }

    async fn render(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        let endpoint = self.endpoint(path)?;
        let session_id = self.browserbase.create_session().await?;

        let mut body = body;
        body["sessionId"] = serde_json::json!(session_id);

        debug!(path, session_id = %session_id, "dispatching render request");
        let resp = self.http.post(&endpoint).json(&body).send().await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "renderer request failed");
            return Err(CaptureError::Api {
                status,
                message: text,
            });
        }

        resp.json().await.map_err(CaptureError::Http)
    }
}

#[async_trait]
impl ScreenshotEngine for RemoteRenderer {
    async fn capture_screenshot(&self, url: &str) -> Result<String> {
        let value = self
            .render("screenshot", serde_json::json!({ "url": url, "fullPage": true }))
            .await?;
        let parsed: RenderResponse =
            serde_json::from_value(value).map_err(|e| CaptureError::Parse(e.to_string()))?;
        match (parsed.base64_image, parsed.error) {
            (Some(image), _) => Ok(image),
            (None, Some(err)) => Err(CaptureError::Renderer(err)),
            (None, None) => Err(CaptureError::Parse("renderer returned no image".into())),
        }
    }

    async fn page_count(&self, url: &str) -> Result<u32> {
        let value = self
            .render("page-count", serde_json::json!({ "url": url }))
            .await?;
        let parsed: PageCountResponse =
            serde_json::from_value(value).map_err(|e| CaptureError::Parse(e.to_string()))?;
        match (parsed.total_pages, parsed.error) {
            (Some(count), _) if count > 0 => Ok(count),
            (_, Some(err)) => Err(CaptureError::Renderer(err)),
            _ => Err(CaptureError::Renderer(
                "could not determine total page count".into(),
            )),
        }
    }

    async fn capture_page(&self, url: &str, page_number: u32) -> Result<PageShot> {
        let value = self
            .render(
                "capture-page",
                serde_json::json!({ "url": url, "pageNumber": page_number }),
            )
            .await?;
        let parsed: RenderResponse =
            serde_json::from_value(value).map_err(|e| CaptureError::Parse(e.to_string()))?;
        match (parsed.base64_image, parsed.error) {
            (Some(image), _) => Ok(PageShot {
                page_number,
                base64_image: image,
            }),
            (None, Some(err)) => Err(CaptureError::Renderer(err)),
            (None, None) => Err(CaptureError::Parse("renderer returned no image".into())),
        }
    }
}
