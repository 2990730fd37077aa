use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Result, ZoomError};
use crate::oauth::{OAuthClient, TokenResponse};

/// Tokens are refreshed when they expire within this margin, so an
/// in-flight download never races the expiry.
pub const REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// A persisted token pair, keyed by the external user id.
#[derive(Debug, Clone)]
pub struct StoredTokens {
    pub zoom_user_id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    /// RFC 3339 UTC timestamp.
    pub token_expires_at: String,
}

/// Thread-safe store for Zoom OAuth tokens (`zoom_users` table).
pub struct TokenStore {
    db: Mutex<Connection>,
}

impl TokenStore {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Insert or update the token pair for a user (upsert semantics).
    pub fn upsert(&self, zoom_user_id: &str, email: &str, tokens: &TokenResponse) -> Result<()> {
        let now = Utc::now();
        let expires_at = (now + Duration::seconds(tokens.expires_in)).to_rfc3339();

        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO zoom_users
             (zoom_user_id, email, access_token, refresh_token, token_expires_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(zoom_user_id) DO UPDATE SET
                email            = excluded.email,
                access_token     = excluded.access_token,
                refresh_token    = excluded.refresh_token,
                token_expires_at = excluded.token_expires_at,
                updated_at       = excluded.updated_at",
            rusqlite::params![
                zoom_user_id,
                email,
                tokens.access_token,
                tokens.refresh_token,
                expires_at,
                now.to_rfc3339()
            ],
        )?;
        debug!(zoom_user_id, "stored Zoom tokens");
        Ok(())
    }

    pub fn get(&self, zoom_user_id: &str) -> Result<Option<StoredTokens>> {
        let db = self.db.lock().unwrap();
        match db.query_row(
            "SELECT zoom_user_id, email, access_token, refresh_token, token_expires_at
             FROM zoom_users WHERE zoom_user_id = ?1",
            rusqlite::params![zoom_user_id],
            |row| {
                Ok(StoredTokens {
                    zoom_user_id: row.get(0)?,
                    email: row.get(1)?,
                    access_token: row.get(2)?,
                    refresh_token: row.get(3)?,
                    token_expires_at: row.get(4)?,
                })
            },
        ) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// True when the stored expiry is inside the refresh margin (or already
/// past, or unparseable — refreshing is the safe answer to bad state).
pub fn needs_refresh(token_expires_at: &str, now: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc3339(token_expires_at) {
        Ok(expires_at) => {
            expires_at.with_timezone(&Utc) - now < Duration::seconds(REFRESH_MARGIN_SECS)
        }
        Err(_) => true,
    }
}

/// Return a live access token for a user, refreshing and persisting first
/// when the stored one expires within the margin.
pub async fn valid_access_token(
    store: &TokenStore,
    oauth: &OAuthClient,
    zoom_user_id: &str,
) -> Result<String> {
    let stored = store.get(zoom_user_id)?.ok_or_else(|| ZoomError::NotAuthorized {
        user_id: zoom_user_id.to_string(),
    })?;

    if !needs_refresh(&stored.token_expires_at, Utc::now()) {
        return Ok(stored.access_token);
    }

    info!(zoom_user_id, "access token near expiry, refreshing");
    let fresh = oauth.refresh(&stored.refresh_token).await?;
    store.upsert(zoom_user_id, &stored.email, &fresh)?;
    Ok(fresh.access_token)
}
