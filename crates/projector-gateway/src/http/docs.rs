//! Google Doc fetch — POST /docs.
//!
//! Request:  `{"docUrl": "https://docs.google.com/document/d/<id>/edit"}`
//! Response: `{"title": "...", "content": "..."}`

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::app::AppState;
use projector_docs::DocsError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsRequest {
    pub doc_url: String,
}

pub async fn docs_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DocsRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.docs.fetch(&req.doc_url).await {
        Ok(doc) => Ok(Json(json!({
            "title": doc.title,
            "content": doc.content,
        }))),
        Err(DocsError::InvalidUrl(_)) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid doc URL"})),
        )),
        Err(DocsError::Api { status: 403, .. }) => Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "Access denied. Make sure the document is shared with the service account."
            })),
        )),
        Err(e) => {
            warn!(error = %e, "doc fetch failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to fetch doc"})),
            ))
        }
    }
}
