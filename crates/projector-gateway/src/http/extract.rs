//! Slide text extraction — POST /extract.
//!
//! One vision call per captured slide, issued concurrently. A failed
//! slide reports its error in place; the batch always completes.

use axum::{extract::State, Json};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;
use projector_agent::{prompt, ChatRequest, Message};

const MAX_EXTRACTION_TOKENS: u32 = 1024;

#[derive(Deserialize)]
pub struct ExtractRequest {
    pub screenshots: Vec<Screenshot>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub page_number: u32,
    pub base64_image: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub page_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn extract_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExtractRequest>,
) -> Json<Value> {
    info!(slides = req.screenshots.len(), "starting text extraction");

    let extractions = req.screenshots.iter().map(|shot| {
        let state = Arc::clone(&state);
        async move {
            let mut message = Message::user(prompt::SLIDE_EXTRACTION_PROMPT);
            message.images.push(shot.base64_image.clone());

            let request = ChatRequest {
                model: state.config.agent.vision_model.clone(),
                system: String::new(),
                messages: vec![message],
                max_tokens: MAX_EXTRACTION_TOKENS,
            };

            match state.chat.send(&request).await {
                Ok(resp) => ExtractionResult {
                    page_number: shot.page_number,
                    text: Some(resp.content),
                    error: None,
                },
                Err(e) => {
                    warn!(page = shot.page_number, error = %e, "extraction failed for slide");
                    ExtractionResult {
                        page_number: shot.page_number,
                        text: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        }
    });

    let results = join_all(extractions).await;
    Json(json!({ "results": results }))
}
