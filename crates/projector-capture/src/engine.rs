use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One captured slide of a deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageShot {
    pub page_number: u32,
    /// Base64-encoded PNG.
    pub base64_image: String,
}

/// Interface to the headless-browser collaborator.
///
/// The page driving itself happens on the renderer side; this trait is the
/// whole contract the rest of the system depends on, so tests substitute
/// fakes and the deck pipeline stays independent of the browser stack.
#[async_trait]
pub trait ScreenshotEngine: Send + Sync {
    /// Full-page screenshot of an arbitrary URL, base64 JPEG.
    async fn capture_screenshot(&self, url: &str) -> Result<String>;

    /// Total page count of a slide-deck viewer page.
    async fn page_count(&self, url: &str) -> Result<u32>;

    /// Screenshot of a single deck page (`{url}#{page_number}`).
    async fn capture_page(&self, url: &str, page_number: u32) -> Result<PageShot>;
}
