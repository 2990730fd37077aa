use axum::{
    routing::{get, post},
    Router,
};
use projector_agent::LlmProvider;
use projector_capture::ScreenshotEngine;
use projector_core::ProjectorConfig;
use projector_docs::DocsClient;
use projector_slack::{Dispatcher, SignatureVerifier, SlackClient};
use projector_zoom::{OAuthClient, TokenStore};
use std::sync::Arc;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
///
/// Every collaborator is constructed in `main` and injected here; nothing
/// lives at module scope, so tests swap in fakes freely.
pub struct AppState {
    pub config: ProjectorConfig,
    pub verifier: SignatureVerifier,
    pub dispatcher: Dispatcher<SlackClient>,
    /// Chat/vision completions (OpenAI).
    pub chat: Arc<dyn LlmProvider>,
    /// Document analysis (Anthropic).
    pub analysis: Arc<dyn LlmProvider>,
    pub engine: Arc<dyn ScreenshotEngine>,
    pub zoom_tokens: TokenStore,
    pub zoom_oauth: OAuthClient,
    pub docs: DocsClient,
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/slack/events", post(crate::http::slack::slack_events_handler))
        .route(
            "/zoom/notification",
            post(crate::http::notification::zoom_notification_handler),
        )
        .route("/zoom/auth", get(crate::http::zoom::zoom_auth_handler))
        .route("/zoom/callback", get(crate::http::zoom::zoom_callback_handler))
        .route("/auth/success", get(crate::http::zoom::auth_success_handler))
        .route("/auth/error", get(crate::http::zoom::auth_error_handler))
        .route("/chat", post(crate::http::chat::chat_handler))
        .route("/analyze", post(crate::http::analyze::analyze_handler))
        .route("/extract", post(crate::http::extract::extract_handler))
        .route("/docs", post(crate::http::docs::docs_handler))
        .route("/page-count", post(crate::http::capture::page_count_handler))
        .route("/capture-page", post(crate::http::capture::capture_page_handler))
        .route("/browse", post(crate::http::capture::browse_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
