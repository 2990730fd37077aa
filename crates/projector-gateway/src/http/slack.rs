//! Slack Events API ingress — POST /slack/events.
//!
//! Slack enforces a short ack deadline and redelivers on timeout, so the
//! handler only verifies and classifies; the actual response pipeline
//! (history fetch, screenshots, completion, reply) runs on a spawned task.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::AppState;
use projector_slack::{EnvelopeKind, EventEnvelope};

pub async fn slack_events_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let raw_body = std::str::from_utf8(&body).map_err(|_| bad_request("body is not UTF-8"))?;
    let envelope: EventEnvelope =
        serde_json::from_str(raw_body).map_err(|_| bad_request("invalid JSON body"))?;

    // URL verification is answered immediately, no signature check.
    if envelope.kind == EnvelopeKind::UrlVerification {
        debug!("answering Slack URL verification");
        return Ok(Json(json!({ "challenge": envelope.challenge })));
    }

    // Everything else is verified against the raw body bytes.
    let timestamp = header_str(&headers, "x-slack-request-timestamp");
    let signature = header_str(&headers, "x-slack-signature");
    match state.verifier.verify(timestamp, signature, raw_body) {
        Ok(true) => {}
        Ok(false) => {
            warn!("rejecting Slack request with invalid signature");
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "invalid request"})),
            ));
        }
        Err(e) => {
            warn!(error = %e, "Slack verification unavailable");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "server configuration error"})),
            ));
        }
    }

    if envelope.kind == EnvelopeKind::EventCallback {
        if let Some(event) = envelope.event {
            // Ack now, work later — dedup makes redelivered events no-ops.
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                match state.dispatcher.handle_event(&event).await {
                    Ok(outcome) => debug!(?outcome, "Slack event handled"),
                    Err(e) => warn!(error = %e, "Slack event processing failed"),
                }
            });
        }
    }

    Ok(Json(json!({ "ok": true })))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn bad_request(reason: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({"error": reason})))
}
