//! Conversation-history reconstruction for the responder.
//!
//! The ordering here is load-bearing: channel context establishes the
//! broad topic, thread context the immediate exchange, and the model
//! consumes the sequence left-to-right as dialogue history.

use async_trait::async_trait;
use projector_agent::Message;
use tracing::{debug, warn};

use crate::client::SlackMessage;
use crate::error::Result;
use crate::mrkdwn::interpret_mrkdwn;

/// Channel backfill for a mention.
pub const CHANNEL_HISTORY_LIMIT: usize = 20;
/// Thread replies, root inclusive.
pub const THREAD_HISTORY_LIMIT: usize = 100;

/// Where conversation history comes from. `SlackClient` is the production
/// implementation; tests substitute fakes.
#[async_trait]
pub trait ConversationSource: Send + Sync {
    /// Recent channel messages, newest first.
    async fn channel_history(&self, channel: &str, limit: usize) -> Result<Vec<SlackMessage>>;

    /// Thread replies including the root, in chronological order.
    async fn thread_replies(
        &self,
        channel: &str,
        thread_ts: &str,
        limit: usize,
    ) -> Result<Vec<SlackMessage>>;
}

/// Reconstruct the prompt history for an event.
///
/// Mentions pull channel history first (bot-authored and empty messages
/// skipped, reversed exactly once into chronological order), then any
/// thread history is appended as returned, each reply classified by
/// authorship. A failed fetch degrades to an empty portion — a response
/// with partial context beats no response.
pub async fn assemble_context<S: ConversationSource + ?Sized>(
    source: &S,
    channel: &str,
    thread_ts: Option<&str>,
    is_mention: bool,
) -> Vec<Message> {
    let mut turns = Vec::new();

    if is_mention {
        match source.channel_history(channel, CHANNEL_HISTORY_LIMIT).await {
            Ok(messages) => {
                let mut channel_turns: Vec<Message> = messages
                    .iter()
                    .filter(|m| m.bot_id.is_none())
                    .filter_map(|m| m.text.as_deref().filter(|t| !t.is_empty()))
                    .map(|text| Message::user(interpret_mrkdwn(text)))
                    .collect();
                channel_turns.reverse();
                debug!(channel, count = channel_turns.len(), "added channel context");
                turns.extend(channel_turns);
            }
            Err(e) => {
                warn!(channel, error = %e, "channel history fetch failed, continuing without it");
            }
        }
    }

    if let Some(thread_ts) = thread_ts {
        match source
            .thread_replies(channel, thread_ts, THREAD_HISTORY_LIMIT)
            .await
        {
            Ok(messages) => {
                let before = turns.len();
                for m in &messages {
                    let Some(text) = m.text.as_deref().filter(|t| !t.is_empty()) else {
                        continue;
                    };
                    let text = interpret_mrkdwn(text);
                    turns.push(if m.bot_id.is_some() {
                        Message::assistant(text)
                    } else {
                        Message::user(text)
                    });
                }
                debug!(channel, thread_ts, count = turns.len() - before, "added thread context");
            }
            Err(e) => {
                warn!(channel, thread_ts, error = %e, "thread history fetch failed, continuing without it");
            }
        }
    }

    turns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlackError;
    use projector_agent::Role;

    fn msg(text: &str, bot: bool) -> SlackMessage {
        SlackMessage {
            text: Some(text.to_string()),
            bot_id: bot.then(|| "B1".to_string()),
            ..Default::default()
        }
    }

    struct FakeSource {
        channel: Result<Vec<SlackMessage>>,
        thread: Result<Vec<SlackMessage>>,
    }

    #[async_trait]
    impl ConversationSource for FakeSource {
        async fn channel_history(&self, _c: &str, _l: usize) -> Result<Vec<SlackMessage>> {
            match &self.channel {
                Ok(m) => Ok(m.clone()),
                Err(_) => Err(SlackError::Config("down".into())),
            }
        }

        async fn thread_replies(
            &self,
            _c: &str,
            _t: &str,
            _l: usize,
        ) -> Result<Vec<SlackMessage>> {
            match &self.thread {
                Ok(m) => Ok(m.clone()),
                Err(_) => Err(SlackError::Config("down".into())),
            }
        }
    }

    #[tokio::test]
    async fn mention_reverses_channel_history_to_chronological() {
        // Slack returns newest first.
        let source = FakeSource {
            channel: Ok(vec![msg("third", false), msg("second", false), msg("first", false)]),
            thread: Ok(vec![]),
        };
        let turns = assemble_context(&source, "C1", None, true).await;
        let texts: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert!(turns.iter().all(|t| t.role == Role::User));
    }

    #[tokio::test]
    async fn channel_history_skips_bot_and_empty_messages() {
        let source = FakeSource {
            channel: Ok(vec![msg("keep", false), msg("from the bot", true), msg("", false)]),
            thread: Ok(vec![]),
        };
        let turns = assemble_context(&source, "C1", None, true).await;
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "keep");
    }

    #[tokio::test]
    async fn thread_history_preserves_order_and_classifies_roles() {
        let source = FakeSource {
            channel: Ok(vec![]),
            thread: Ok(vec![msg("question", false), msg("answer", true), msg("followup", false)]),
        };
        let turns = assemble_context(&source, "C1", Some("100.0"), false).await;
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "answer");
        assert_eq!(turns[2].role, Role::User);
    }

    #[tokio::test]
    async fn channel_context_always_precedes_thread_context() {
        let source = FakeSource {
            channel: Ok(vec![msg("chan-new", false), msg("chan-old", false)]),
            thread: Ok(vec![msg("thread-root", false), msg("thread-reply", true)]),
        };
        let turns = assemble_context(&source, "C1", Some("100.0"), true).await;
        let texts: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(texts, vec!["chan-old", "chan-new", "thread-root", "thread-reply"]);
    }

    #[tokio::test]
    async fn failed_channel_fetch_degrades_to_thread_only() {
        let source = FakeSource {
            channel: Err(SlackError::Config("down".into())),
            thread: Ok(vec![msg("still here", false)]),
        };
        let turns = assemble_context(&source, "C1", Some("100.0"), true).await;
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "still here");
    }

    #[tokio::test]
    async fn both_fetches_failing_yields_empty_history() {
        let source = FakeSource {
            channel: Err(SlackError::Config("down".into())),
            thread: Err(SlackError::Config("down".into())),
        };
        let turns = assemble_context(&source, "C1", Some("100.0"), true).await;
        assert!(turns.is_empty());
    }

    #[tokio::test]
    async fn slack_formatting_is_normalized_for_the_model() {
        let source = FakeSource {
            channel: Ok(vec![]),
            thread: Ok(vec![msg("see <https://example.com|the doc> *now*", false)]),
        };
        let turns = assemble_context(&source, "C1", Some("100.0"), false).await;
        assert_eq!(turns[0].content, "see [the doc](https://example.com) **now**");
    }
}
