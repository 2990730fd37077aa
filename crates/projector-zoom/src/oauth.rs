use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, ZoomError};

/// Scopes requested during authorization — recording download plus the
/// identity fields persisted alongside the tokens.
const REQUIRED_SCOPES: &str = "cloud_recording:read:recording user:read:email user:read:user";

/// Access/refresh token pair from the token endpoint. Zoom may rotate the
/// refresh token on every exchange, so both values are always persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Identity of the authenticated user, fetched right after the exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoomUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// OAuth client for the meeting platform.
pub struct OAuthClient {
    http: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    oauth_base: String,
    api_base: String,
    redirect_uri: String,
}

impl OAuthClient {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        oauth_base: String,
        api_base: String,
        redirect_uri: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            oauth_base,
            api_base,
            redirect_uri,
        }
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(ZoomError::Config("OAuth client credentials not set".into())),
        }
    }

    /// Authorization URL the user is redirected to, carrying the CSRF state.
    pub fn authorize_url(&self, state: &str) -> Result<String> {
        let (client_id, _) = self.credentials()?;
        Ok(format!(
            "{}/oauth/authorize?response_type=code&client_id={}&redirect_uri={}&state={}&scope={}",
            self.oauth_base,
            client_id,
            urlencoding::encode(&self.redirect_uri),
            state,
            urlencoding::encode(REQUIRED_SCOPES),
        ))
    }

    /// Exchange an authorization code for a token pair.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.redirect_uri),
        ])
        .await
    }

    /// Exchange a refresh token for a fresh pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let (client_id, client_secret) = self.credentials()?;
        let url = format!("{}/oauth/token", self.oauth_base);

        debug!(grant = form[0].1, "requesting tokens from Zoom");
        let resp = self
            .http
            .post(&url)
            .basic_auth(client_id, Some(client_secret))
            .form(form)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Zoom token request failed");
            return Err(ZoomError::Api {
                status,
                message: text,
            });
        }

        resp.json().await.map_err(ZoomError::Http)
    }

    /// Identity of the user the access token belongs to.
    pub async fn current_user(&self, access_token: &str) -> Result<ZoomUser> {
        let url = format!("{}/users/me", self.api_base);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "Zoom identity fetch failed");
            return Err(ZoomError::Api {
                status,
                message: text,
            });
        }

        resp.json().await.map_err(ZoomError::Http)
    }
}
