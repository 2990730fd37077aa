//! Deck capture endpoints — POST /page-count, /capture-page, /browse.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::app::AppState;
use projector_capture::capture_deck;

#[derive(Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub url: String,
    pub page_number: u32,
}

/// POST /page-count — discover the slide count of a deck viewer page.
pub async fn page_count_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UrlRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.engine.page_count(&req.url).await {
        Ok(total_pages) => Ok(Json(json!({ "totalPages": total_pages }))),
        Err(e) => {
            warn!(url = %req.url, error = %e, "page count failed");
            Err(internal_error("failed to get page count", &e))
        }
    }
}

/// POST /capture-page — screenshot a single deck page.
pub async fn capture_page_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PageRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.engine.capture_page(&req.url, req.page_number).await {
        Ok(shot) => Ok(Json(serde_json::to_value(shot).unwrap_or_default())),
        Err(e) => {
            warn!(url = %req.url, page = req.page_number, error = %e, "page capture failed");
            Err(internal_error("failed to capture page", &e))
        }
    }
}

/// POST /browse — capture a whole deck with the partial-success policy.
pub async fn browse_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UrlRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match capture_deck(state.engine.as_ref(), &req.url).await {
        Ok(report) if report.is_total_failure() => {
            warn!(url = %req.url, "every page capture failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to capture screenshots"})),
            ))
        }
        Ok(report) => Ok(Json(serde_json::to_value(report).unwrap_or_default())),
        Err(e) => {
            warn!(url = %req.url, error = %e, "deck capture failed");
            Err(internal_error("failed to capture screenshots", &e))
        }
    }
}

fn internal_error(
    message: &str,
    details: &dyn std::fmt::Display,
) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": message, "details": details.to_string()})),
    )
}
