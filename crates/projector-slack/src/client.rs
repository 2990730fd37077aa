use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::context::ConversationSource;
use crate::dispatcher::MessagePoster;
use crate::error::{Result, SlackError};

/// Thin Slack Web API client — only the three methods the responder needs.
pub struct SlackClient {
    http: reqwest::Client,
    bot_token: Option<String>,
    api_base: String,
}

/// A message as returned by conversations.history / conversations.replies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackMessage {
    pub text: Option<String>,
    pub bot_id: Option<String>,
    pub user: Option<String>,
    pub ts: Option<String>,
    pub thread_ts: Option<String>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    ok: bool,
    error: Option<String>,
    messages: Option<Vec<SlackMessage>>,
}

#[derive(Deserialize)]
struct PostResponse {
    ok: bool,
    error: Option<String>,
}

impl SlackClient {
    pub fn new(bot_token: Option<String>, api_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
            api_base,
        }
    }

    fn token(&self) -> Result<&str> {
        self.bot_token
            .as_deref()
            .ok_or_else(|| SlackError::Config("bot token not set".into()))
    }

    async fn fetch_messages(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<SlackMessage>> {
        let url = format!("{}/{}", self.api_base, method);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(self.token()?)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        let parsed: HistoryResponse = resp.json().await?;
        if !parsed.ok {
            return Err(SlackError::Api {
                method: method.to_string(),
                reason: parsed.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        let messages = parsed.messages.unwrap_or_default();
        debug!(method, count = messages.len(), "fetched conversation messages");
        Ok(messages)
    }
}

#[async_trait]
impl ConversationSource for SlackClient {
    /// Most recent channel messages, newest first as Slack returns them.
    async fn channel_history(&self, channel: &str, limit: usize) -> Result<Vec<SlackMessage>> {
        self.fetch_messages(
            "conversations.history",
            &[
                ("channel", channel.to_string()),
                ("limit", limit.to_string()),
                ("inclusive", "true".to_string()),
            ],
        )
        .await
    }

    /// Replies of a thread, root included, chronological as Slack returns them.
    async fn thread_replies(
        &self,
        channel: &str,
        thread_ts: &str,
        limit: usize,
    ) -> Result<Vec<SlackMessage>> {
        self.fetch_messages(
            "conversations.replies",
            &[
                ("channel", channel.to_string()),
                ("ts", thread_ts.to_string()),
                ("limit", limit.to_string()),
                ("inclusive", "true".to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl MessagePoster for SlackClient {
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<()> {
        let mut body = serde_json::json!({
            "channel": channel,
            "text": text,
            "mrkdwn": true,
            "unfurl_links": false,
        });
        if let Some(ts) = thread_ts {
            body["thread_ts"] = serde_json::json!(ts);
        }

        let url = format!("{}/chat.postMessage", self.api_base);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.token()?)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: PostResponse = resp.json().await?;
        if !parsed.ok {
            return Err(SlackError::Api {
                method: "chat.postMessage".to_string(),
                reason: parsed.error.unwrap_or_else(|| "unknown error".into()),
            });
        }
        Ok(())
    }
}
