//! Zoom webhook ingress — POST /zoom/notification.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;
use projector_zoom::{transcript, validation_response, WebhookEnvelope, ZoomEvent};

pub async fn zoom_notification_handler(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<WebhookEnvelope>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match envelope.classify() {
        // The validation challenge has a hard deadline — answer inline.
        ZoomEvent::UrlValidation { plain_token } => {
            match validation_response(state.config.zoom.webhook_secret.as_deref(), &plain_token) {
                Ok(resp) => Ok(Json(serde_json::to_value(resp).unwrap_or_default())),
                Err(e) => {
                    warn!(error = %e, "cannot answer Zoom URL validation");
                    Err((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": "server configuration error"})),
                    ))
                }
            }
        }
        ZoomEvent::RecordingTranscriptCompleted(payload) => {
            // The download needs a token exchange — off the ack path.
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                match transcript::handle_transcript_completed(
                    &payload,
                    &state.zoom_tokens,
                    &state.zoom_oauth,
                )
                .await
                {
                    Ok(Some(text)) => {
                        info!(bytes = text.len(), "meeting transcript processed")
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "transcript handling failed"),
                }
            });
            Ok(Json(json!({"status": "success"})))
        }
        ZoomEvent::MeetingEnded { meeting } => {
            info!(meeting = %meeting, "meeting ended");
            Ok(Json(json!({"status": "success"})))
        }
        ZoomEvent::Unknown { event } => {
            info!(event = %event, "unhandled Zoom event, acknowledging");
            Ok(Json(json!({"status": "success"})))
        }
    }
}
