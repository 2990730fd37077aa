use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Top-level config (projector.toml + PROJECTOR_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProjectorConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub docs: DocsConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Public base URL of this deployment — used for OAuth redirect URIs.
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            public_url: default_public_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Slack credentials. Both values are secrets and must never be logged.
///
/// `signing_secret` absent means inbound event verification fails closed
/// with a server-error response — never a silent allow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub signing_secret: Option<String>,
    pub bot_token: Option<String>,
    #[serde(default = "default_slack_api_base")]
    pub api_base: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            signing_secret: None,
            bot_token: None,
            api_base: default_slack_api_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoomConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Secret token for webhook endpoint validation.
    pub webhook_secret: Option<String>,
    #[serde(default = "default_zoom_oauth_base")]
    pub oauth_base: String,
    #[serde(default = "default_zoom_api_base")]
    pub api_base: String,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            webhook_secret: None,
            oauth_base: default_zoom_oauth_base(),
            api_base: default_zoom_api_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Browserbase API key.
    pub api_key: Option<String>,
    /// Browserbase project the sessions are created under.
    pub project_id: Option<String>,
    /// Renderer collaborator endpoint that drives the headless browser.
    pub renderer_url: Option<String>,
    #[serde(default = "default_browserbase_base")]
    pub browserbase_base: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            project_id: None,
            renderer_url: None,
            browserbase_base: default_browserbase_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocsConfig {
    /// Path to a GCP service account JSON key file with documents.readonly scope.
    pub service_account_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    pub openai: Option<OpenAiConfig>,
    pub anthropic: Option<AnthropicConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    pub api_key: String,
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
}

/// Model selection for the three LLM call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    #[serde(default = "default_analysis_model")]
    pub analysis_model: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            chat_model: default_chat_model(),
            vision_model: default_vision_model(),
            analysis_model: default_analysis_model(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_public_url() -> String {
    format!("http://{}:{}", DEFAULT_BIND, DEFAULT_PORT)
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.projector/projector.db", home)
}
fn default_slack_api_base() -> String {
    "https://slack.com/api".to_string()
}
fn default_zoom_oauth_base() -> String {
    "https://zoom.us".to_string()
}
fn default_zoom_api_base() -> String {
    "https://api.zoom.us/v2".to_string()
}
fn default_browserbase_base() -> String {
    "https://www.browserbase.com".to_string()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}
fn default_chat_model() -> String {
    "gpt-4o-2024-08-06".to_string()
}
fn default_vision_model() -> String {
    "gpt-4o-2024-08-06".to_string()
}
fn default_analysis_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

impl ProjectorConfig {
    /// Load config from a TOML file with PROJECTOR_* env var overrides.
    ///
    /// Env keys nest on double underscore, e.g.
    /// `PROJECTOR_SLACK__SIGNING_SECRET` -> `slack.signing_secret`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: ProjectorConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("PROJECTOR_").split("__"))
            .extract()
            .map_err(|e| crate::error::ProjectorError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.projector/projector.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_endpoints() {
        let config = ProjectorConfig::default();
        assert_eq!(config.gateway.port, DEFAULT_PORT);
        assert_eq!(config.slack.api_base, "https://slack.com/api");
        assert_eq!(config.zoom.oauth_base, "https://zoom.us");
        assert!(config.slack.signing_secret.is_none());
    }

    #[test]
    fn agent_defaults_match_call_sites() {
        let agent = AgentConfig::default();
        assert!(agent.chat_model.starts_with("gpt-4o"));
        assert!(agent.analysis_model.starts_with("claude-3-5"));
    }
}
