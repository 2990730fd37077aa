use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod app;
mod http;

/// How often the tracking sweeper compacts expired records. Correctness
/// never depends on it — reads treat expired rows as absent.
const SWEEP_INTERVAL_SECS: u64 = 60 * 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "projector_gateway=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit path via PROJECTOR_CONFIG > ~/.projector/projector.toml
    let config_path = std::env::var("PROJECTOR_CONFIG").ok();
    let config = projector_core::ProjectorConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        projector_core::ProjectorConfig::default()
    });

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    // initialize SQLite database — single file for all subsystems
    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    // run all schema migrations (idempotent)
    projector_tracking::db::init_db(&db)?;
    projector_zoom::db::init_db(&db)?;
    info!("database migrations complete");

    // build subsystems — each gets its own connection for thread safety
    let tracking = Arc::new(projector_tracking::TrackingStore::new(
        rusqlite::Connection::open(db_path)?,
    ));
    let zoom_tokens = projector_zoom::TokenStore::new(rusqlite::Connection::open(db_path)?);

    let slack = Arc::new(projector_slack::SlackClient::new(
        config.slack.bot_token.clone(),
        config.slack.api_base.clone(),
    ));
    let verifier = projector_slack::SignatureVerifier::new(config.slack.signing_secret.clone());

    let chat = build_chat_provider(&config);
    let analysis = build_analysis_provider(&config);

    let browserbase = projector_capture::browserbase::BrowserbaseClient::new(
        config.capture.api_key.clone(),
        config.capture.project_id.clone(),
        config.capture.browserbase_base.clone(),
    );
    let engine: Arc<dyn projector_capture::ScreenshotEngine> = Arc::new(
        projector_capture::RemoteRenderer::new(browserbase, config.capture.renderer_url.clone()),
    );

    let zoom_oauth = projector_zoom::OAuthClient::new(
        config.zoom.client_id.clone(),
        config.zoom.client_secret.clone(),
        config.zoom.oauth_base.clone(),
        config.zoom.api_base.clone(),
        format!("{}/zoom/callback", config.gateway.public_url),
    );

    let docs_auth = match config.docs.service_account_key.as_deref() {
        Some(path) => match projector_docs::auth::ServiceAccountAuth::from_file(path) {
            Ok(auth) => Some(auth),
            Err(e) => {
                tracing::warn!("Docs service account unavailable: {e}");
                None
            }
        },
        None => None,
    };
    let docs = projector_docs::DocsClient::new(docs_auth);

    let dispatcher = projector_slack::Dispatcher::new(
        Arc::clone(&slack),
        Arc::clone(&tracking),
        Arc::clone(&chat),
        Arc::clone(&engine),
        config.agent.chat_model.clone(),
    );

    let state = Arc::new(app::AppState {
        config,
        verifier,
        dispatcher,
        chat,
        analysis,
        engine,
        zoom_tokens,
        zoom_oauth,
        docs,
    });
    let router = app::build_router(Arc::clone(&state));

    // spawn the tracking sweeper in the background
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        ticker.tick().await; // first tick fires immediately, skip it
        loop {
            ticker.tick().await;
            match tracking.purge_expired() {
                Ok(removed) if removed > 0 => {
                    info!(removed, "purged expired tracking records")
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "tracking sweep failed"),
            }
        }
    });

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Projector gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

/// Chat/vision provider — OpenAI from config, with env var fallback.
fn build_chat_provider(
    config: &projector_core::ProjectorConfig,
) -> Arc<dyn projector_agent::LlmProvider> {
    if let Some(ref openai) = config.providers.openai {
        info!("chat provider: OpenAI ({})", openai.base_url);
        return Arc::new(projector_agent::OpenAiProvider::new(
            openai.api_key.clone(),
            Some(openai.base_url.clone()),
        ));
    }
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        info!("chat provider: OpenAI (from env)");
        return Arc::new(projector_agent::OpenAiProvider::new(key, None));
    }
    tracing::warn!("No OpenAI credentials configured — chat endpoints will return errors");
    Arc::new(NullProvider)
}

/// Analysis provider — Anthropic from config, with env var fallback.
fn build_analysis_provider(
    config: &projector_core::ProjectorConfig,
) -> Arc<dyn projector_agent::LlmProvider> {
    if let Some(ref anthropic) = config.providers.anthropic {
        info!("analysis provider: Anthropic ({})", anthropic.base_url);
        return Arc::new(projector_agent::AnthropicProvider::new(
            anthropic.api_key.clone(),
            Some(anthropic.base_url.clone()),
        ));
    }
    if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
        info!("analysis provider: Anthropic (from env)");
        return Arc::new(projector_agent::AnthropicProvider::new(key, None));
    }
    tracing::warn!("No Anthropic credentials configured — analysis endpoint will return errors");
    Arc::new(NullProvider)
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}

/// Placeholder provider when no API key is available.
struct NullProvider;

#[async_trait::async_trait]
impl projector_agent::LlmProvider for NullProvider {
    fn name(&self) -> &str {
        "null"
    }
    async fn send(
        &self,
        _req: &projector_agent::ChatRequest,
    ) -> Result<projector_agent::ChatResponse, projector_agent::ProviderError> {
        Err(projector_agent::ProviderError::Unavailable(
            "no LLM provider configured — set providers.openai.api_key in projector.toml".into(),
        ))
    }
}
