//! Zoom OAuth endpoints — GET /zoom/auth and GET /zoom/callback.
//!
//! The `state` nonce set during initiation rides an HttpOnly cookie and
//! must round-trip through the callback (CSRF protection).

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;

const STATE_COOKIE: &str = "zoom_oauth_state";

/// GET /zoom/auth — redirect the user to Zoom's consent screen.
pub async fn zoom_auth_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let nonce = uuid::Uuid::new_v4().simple().to_string();

    let url = match state.zoom_oauth.authorize_url(&nonce) {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, "cannot initiate Zoom OAuth");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to initiate OAuth"})),
            )
                .into_response();
        }
    };

    let cookie =
        format!("{STATE_COOKIE}={nonce}; HttpOnly; Path=/; Max-Age=3600; SameSite=Lax");
    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::temporary(&url),
    )
        .into_response()
}

#[derive(Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /zoom/callback — complete the exchange and persist the tokens.
pub async fn zoom_callback_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(error) = params.error {
        warn!(error, "Zoom OAuth returned an error");
        return error_redirect(&error);
    }

    let (Some(code), Some(returned_state)) = (params.code, params.state) else {
        warn!("Zoom callback missing code or state");
        return error_redirect("missing_params");
    };

    // The state must match the cookie set at initiation.
    let stored_state = cookie_value(&headers, STATE_COOKIE);
    if stored_state.as_deref() != Some(returned_state.as_str()) {
        warn!("Zoom OAuth state mismatch");
        return error_redirect("invalid_state");
    }

    let tokens = match state.zoom_oauth.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!(error = %e, "Zoom code exchange failed");
            return error_redirect("server_error");
        }
    };

    // Identity fetch + upsert keyed by the external user id.
    let user = match state.zoom_oauth.current_user(&tokens.access_token).await {
        Ok(user) => user,
        Err(e) => {
            warn!(error = %e, "Zoom identity fetch failed");
            return error_redirect("server_error");
        }
    };
    if let Err(e) = state.zoom_tokens.upsert(&user.id, &user.email, &tokens) {
        warn!(error = %e, "failed to persist Zoom tokens");
        return error_redirect("server_error");
    }

    info!(zoom_user_id = %user.id, "Zoom account connected");
    let clear = format!("{STATE_COOKIE}=; HttpOnly; Path=/; Max-Age=0");
    (
        AppendHeaders([(header::SET_COOKIE, clear)]),
        Redirect::temporary("/auth/success"),
    )
        .into_response()
}

pub async fn auth_success_handler() -> impl IntoResponse {
    "Zoom account connected. You can close this tab."
}

#[derive(Deserialize)]
pub struct AuthErrorParams {
    pub error: Option<String>,
}

pub async fn auth_error_handler(Query(params): Query<AuthErrorParams>) -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        format!(
            "Zoom authorization failed: {}",
            params.error.as_deref().unwrap_or("unknown error")
        ),
    )
}

fn error_redirect(reason: &str) -> axum::response::Response {
    Redirect::temporary(&format!("/auth/error?error={}", urlencoding::encode(reason)))
        .into_response()
}

/// Pull one cookie value out of the Cookie header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        let pair = pair.trim();
        if let Some((key, value)) = pair.split_once('=') {
            if key == name {
                return Some(value.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn cookie_value_finds_the_named_cookie() {
        let headers = headers_with_cookie("a=1; zoom_oauth_state=nonce-9; b=2");
        assert_eq!(
            cookie_value(&headers, "zoom_oauth_state").as_deref(),
            Some("nonce-9")
        );
    }

    #[test]
    fn cookie_value_misses_absent_cookie() {
        let headers = headers_with_cookie("a=1; b=2");
        assert_eq!(cookie_value(&headers, "zoom_oauth_state"), None);
    }

    #[test]
    fn cookie_value_without_header_is_none() {
        assert_eq!(cookie_value(&HeaderMap::new(), "zoom_oauth_state"), None);
    }

}
