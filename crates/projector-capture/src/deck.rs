use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::{PageShot, ScreenshotEngine};
use crate::error::Result;

/// Outcome of a deck capture: the pages that rendered plus the pages that
/// did not. Callers decide whether partial is acceptable; nothing is
/// silently dropped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureReport {
    /// Successful captures, sorted by page number.
    pub screenshots: Vec<PageShot>,
    /// Page numbers whose capture failed.
    pub failed: Vec<u32>,
}

impl CaptureReport {
    pub fn is_total_failure(&self) -> bool {
        self.screenshots.is_empty() && !self.failed.is_empty()
    }
}

/// Capture every page of a slide deck.
///
/// Discovers the page count, issues one capture request per page
/// concurrently, and joins the batch. A failed page is recorded in
/// `failed` and never aborts the rest.
pub async fn capture_deck(engine: &dyn ScreenshotEngine, url: &str) -> Result<CaptureReport> {
    let total_pages = engine.page_count(url).await?;
    info!(url, total_pages, "capturing deck pages in parallel");

    let captures = join_all((1..=total_pages).map(|page| engine.capture_page(url, page))).await;

    let mut screenshots = Vec::new();
    let mut failed = Vec::new();
    for (idx, result) in captures.into_iter().enumerate() {
        let page = idx as u32 + 1;
        match result {
            Ok(shot) => screenshots.push(shot),
            Err(e) => {
                warn!(url, page, error = %e, "page capture failed");
                failed.push(page);
            }
        }
    }
    screenshots.sort_by_key(|s| s.page_number);

    info!(
        url,
        captured = screenshots.len(),
        failed = failed.len(),
        "deck capture finished"
    );
    Ok(CaptureReport {
        screenshots,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;
    use async_trait::async_trait;

    /// Fake engine: fixed page count, configurable failing pages, and a
    /// reversed completion order to prove the report is sorted.
    struct FakeEngine {
        pages: u32,
        failing: Vec<u32>,
    }

    #[async_trait]
    impl ScreenshotEngine for FakeEngine {
        async fn capture_screenshot(&self, _url: &str) -> Result<String> {
            Ok("aGk=".to_string())
        }

        async fn page_count(&self, _url: &str) -> Result<u32> {
            Ok(self.pages)
        }

        async fn capture_page(&self, _url: &str, page_number: u32) -> Result<PageShot> {
            // Later pages resolve first so sorting is actually exercised.
            tokio::time::sleep(std::time::Duration::from_millis(
                (self.pages - page_number) as u64,
            ))
            .await;
            if self.failing.contains(&page_number) {
                return Err(CaptureError::Renderer(format!("page {page_number} hung")));
            }
            Ok(PageShot {
                page_number,
                base64_image: format!("img-{page_number}"),
            })
        }
    }

    #[tokio::test]
    async fn captures_all_pages_sorted() {
        let engine = FakeEngine {
            pages: 4,
            failing: vec![],
        };
        let report = capture_deck(&engine, "https://deck.example/x").await.unwrap();
        let order: Vec<u32> = report.screenshots.iter().map(|s| s.page_number).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn failed_pages_are_reported_not_fatal() {
        let engine = FakeEngine {
            pages: 3,
            failing: vec![2],
        };
        let report = capture_deck(&engine, "https://deck.example/x").await.unwrap();
        let order: Vec<u32> = report.screenshots.iter().map(|s| s.page_number).collect();
        assert_eq!(order, vec![1, 3]);
        assert_eq!(report.failed, vec![2]);
        assert!(!report.is_total_failure());
    }

    #[tokio::test]
    async fn all_pages_failing_is_total_failure() {
        let engine = FakeEngine {
            pages: 2,
            failing: vec![1, 2],
        };
        let report = capture_deck(&engine, "https://deck.example/x").await.unwrap();
        assert!(report.is_total_failure());
        assert_eq!(report.failed, vec![1, 2]);
    }
}
