//! Document Q&A — POST /analyze.
//!
//! Request:  `{"question": "...", "context": "..."}`
//! Response: `{"answer": "..."}`

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::app::AppState;
use projector_agent::{prompt, ChatRequest, Message};

const MAX_ANSWER_TOKENS: u32 = 1024;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub question: String,
    pub context: String,
}

pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let request = ChatRequest {
        model: state.config.agent.analysis_model.clone(),
        system: String::new(),
        messages: vec![Message::user(prompt::doc_question(
            &req.context,
            &req.question,
        ))],
        max_tokens: MAX_ANSWER_TOKENS,
    };

    match state.analysis.send(&request).await {
        Ok(resp) => Ok(Json(json!({ "answer": resp.content }))),
        Err(e) => {
            warn!(error = %e, "document analysis failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to analyze document"})),
            ))
        }
    }
}
