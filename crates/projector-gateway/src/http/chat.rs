//! Internal completion endpoint — POST /chat.
//!
//! Request:  `{"messages": [{"role": "user", "content": "...", "images": [..]}]}`
//! Response: `{"content": "..."}`

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;
use projector_agent::{prompt, ChatRequest, Message, Role};

const MAX_COMPLETION_TOKENS: u32 = 1024;

#[derive(Deserialize)]
pub struct ChatEndpointRequest {
    pub messages: Vec<IncomingMessage>,
}

#[derive(Deserialize)]
pub struct IncomingMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatEndpointRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    info!(messages = req.messages.len(), "processing chat request");

    let messages: Vec<Message> = req
        .messages
        .into_iter()
        .map(|m| {
            // A textual note accompanies attached screenshots so replayed
            // history reads sensibly even without the images.
            let content = if m.images.is_empty() {
                m.content
            } else {
                format!("{}{}", m.content, prompt::image_note(m.images.len()))
            };
            Message {
                role: m.role,
                content,
                images: m.images,
            }
        })
        .collect();

    let request = ChatRequest {
        model: state.config.agent.chat_model.clone(),
        system: prompt::SLACK_SYSTEM_PROMPT.to_string(),
        messages,
        max_tokens: MAX_COMPLETION_TOKENS,
    };

    match state.chat.send(&request).await {
        Ok(resp) => Ok(Json(json!({ "content": resp.content }))),
        Err(e) => {
            warn!(error = %e, "chat completion failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to process chat request"})),
            ))
        }
    }
}
