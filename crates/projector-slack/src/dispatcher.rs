use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use projector_agent::{prompt::SLACK_SYSTEM_PROMPT, ChatRequest, LlmProvider, Message};
use projector_capture::ScreenshotEngine;
use projector_tracking::TrackingStore;
use tracing::{debug, info, warn};

use crate::context::{assemble_context, ConversationSource};
use crate::error::Result;
use crate::event::{EventKind, MessageEvent};
use crate::policy::ResponsePolicy;
use crate::urls::{extract_urls, is_valid_url};

const MAX_COMPLETION_TOKENS: u32 = 1024;

/// Outbound half of the Slack client, split out so tests can observe
/// what would have been posted.
#[async_trait]
pub trait MessagePoster: Send + Sync {
    async fn post_message(&self, channel: &str, text: &str, thread_ts: Option<&str>)
        -> Result<()>;
}

/// Terminal outcome of one event. Every variant is acknowledged with
/// success to the platform — none of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Policy or guard said no; nothing happened.
    Ignored(&'static str),
    /// Redelivery of an already-processed event.
    Duplicate,
    /// A reply was generated and posted.
    Replied,
}

/// Orchestrates one inbound event end to end: policy check, dedup gate,
/// history assembly, screenshot enrichment, completion call, reply post.
pub struct Dispatcher<S> {
    slack: Arc<S>,
    store: Arc<TrackingStore>,
    policy: ResponsePolicy,
    chat: Arc<dyn LlmProvider>,
    engine: Arc<dyn ScreenshotEngine>,
    chat_model: String,
}

impl<S> Dispatcher<S>
where
    S: ConversationSource + MessagePoster,
{
    pub fn new(
        slack: Arc<S>,
        store: Arc<TrackingStore>,
        chat: Arc<dyn LlmProvider>,
        engine: Arc<dyn ScreenshotEngine>,
        chat_model: String,
    ) -> Self {
        Self {
            slack,
            policy: ResponsePolicy::new(Arc::clone(&store)),
            store,
            chat,
            engine,
            chat_model,
        }
    }

    pub async fn handle_event(&self, event: &MessageEvent) -> Result<DispatchOutcome> {
        if !self.policy.should_respond(event)? {
            debug!("ignoring message, does not meet response criteria");
            return Ok(DispatchOutcome::Ignored("response criteria not met"));
        }

        // Bot echoes and edits/deletes are terminal ignores, not errors.
        if event.bot_id.is_some() || event.subtype.is_some() {
            return Ok(DispatchOutcome::Ignored("bot message or subtype"));
        }
        let Some(channel) = event.channel.as_deref() else {
            return Ok(DispatchOutcome::Ignored("no channel"));
        };
        let Some(event_id) = event.dedup_id() else {
            warn!(channel, "no stable event id, skipping message");
            return Ok(DispatchOutcome::Ignored("no event id"));
        };

        if self.store.check_and_mark_processed(event_id)? {
            debug!(event_id, "skipping duplicate delivery");
            return Ok(DispatchOutcome::Duplicate);
        }

        let is_mention = event.classify() == EventKind::Mention;
        let mut messages =
            assemble_context(self.slack.as_ref(), channel, event.conversation_root(), is_mention)
                .await;

        let text = event.text.clone().unwrap_or_default();
        let (enhanced, screenshots) = self.enrich_with_screenshots(&text).await;

        let mut current = Message::user(enhanced);
        current.images = screenshots;
        messages.push(current);

        let request = ChatRequest {
            model: self.chat_model.clone(),
            system: SLACK_SYSTEM_PROMPT.to_string(),
            messages,
            max_tokens: MAX_COMPLETION_TOKENS,
        };
        let response = self.chat.send(&request).await?;

        // Reply into the original thread; a fresh mention anchors a new
        // thread at its own ts; DMs post unthreaded.
        let thread_anchor = event
            .thread_ts
            .as_deref()
            .or(if is_mention { event.ts.as_deref() } else { None });

        self.slack
            .post_message(channel, &response.content, thread_anchor)
            .await?;

        info!(channel, thread = ?thread_anchor, "reply posted");
        Ok(DispatchOutcome::Replied)
    }

    /// Capture a screenshot for every URL in the text, concurrently.
    ///
    /// Each success appends a textual marker and the image; each failure
    /// is logged and skipped — one broken link never aborts the message.
    async fn enrich_with_screenshots(&self, text: &str) -> (String, Vec<String>) {
        let urls: Vec<String> = extract_urls(text)
            .into_iter()
            .filter(|u| is_valid_url(u))
            .collect();
        if urls.is_empty() {
            return (text.to_string(), Vec::new());
        }

        info!(count = urls.len(), "capturing screenshots for message URLs");
        let captures = join_all(urls.iter().map(|u| self.engine.capture_screenshot(u))).await;

        let mut enhanced = text.to_string();
        let mut screenshots = Vec::new();
        for (url, capture) in urls.iter().zip(captures) {
            match capture {
                Ok(image) => {
                    screenshots.push(image);
                    enhanced.push_str(&format!("\n[Screenshot of {url} processed]"));
                }
                Err(e) => warn!(url, error = %e, "screenshot capture failed"),
            }
        }
        (enhanced, screenshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SlackMessage;
    use projector_agent::{ChatResponse, ProviderError};
    use projector_capture::{CaptureError, PageShot};
    use projector_tracking::db::init_db;
    use rusqlite::Connection;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSlack {
        thread: Vec<SlackMessage>,
        posts: Mutex<Vec<(String, String, Option<String>)>>,
    }

    #[async_trait]
    impl ConversationSource for FakeSlack {
        async fn channel_history(&self, _c: &str, _l: usize) -> Result<Vec<SlackMessage>> {
            Ok(vec![])
        }
        async fn thread_replies(&self, _c: &str, _t: &str, _l: usize) -> Result<Vec<SlackMessage>> {
            Ok(self.thread.clone())
        }
    }

    #[async_trait]
    impl MessagePoster for FakeSlack {
        async fn post_message(
            &self,
            channel: &str,
            text: &str,
            thread_ts: Option<&str>,
        ) -> Result<()> {
            self.posts.lock().unwrap().push((
                channel.to_string(),
                text.to_string(),
                thread_ts.map(String::from),
            ));
            Ok(())
        }
    }

    struct FakeChat {
        requests: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl LlmProvider for FakeChat {
        fn name(&self) -> &str {
            "fake"
        }
        async fn send(&self, req: &ChatRequest) -> std::result::Result<ChatResponse, ProviderError> {
            self.requests.lock().unwrap().push(req.clone());
            Ok(ChatResponse {
                content: "canned answer".to_string(),
                model: req.model.clone(),
                tokens_in: 1,
                tokens_out: 1,
            })
        }
    }

    struct FakeEngine {
        failing: Vec<&'static str>,
    }

    #[async_trait]
    impl ScreenshotEngine for FakeEngine {
        async fn capture_screenshot(
            &self,
            url: &str,
        ) -> std::result::Result<String, CaptureError> {
            if self.failing.iter().any(|f| url.contains(f)) {
                Err(CaptureError::Renderer("no session".into()))
            } else {
                Ok(format!("shot:{url}"))
            }
        }
        async fn page_count(&self, _url: &str) -> std::result::Result<u32, CaptureError> {
            Ok(0)
        }
        async fn capture_page(
            &self,
            _url: &str,
            _n: u32,
        ) -> std::result::Result<PageShot, CaptureError> {
            Err(CaptureError::Renderer("unused".into()))
        }
    }

    fn dispatcher(slack: FakeSlack, failing: Vec<&'static str>) -> (Dispatcher<FakeSlack>, Arc<FakeSlack>, Arc<FakeChat>) {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let store = Arc::new(TrackingStore::new(conn));
        let slack = Arc::new(slack);
        let chat = Arc::new(FakeChat {
            requests: Mutex::new(vec![]),
        });
        let dispatcher = Dispatcher::new(
            Arc::clone(&slack),
            store,
            chat.clone() as Arc<dyn LlmProvider>,
            Arc::new(FakeEngine { failing }),
            "gpt-4o-2024-08-06".to_string(),
        );
        (dispatcher, slack, chat)
    }

    fn mention_event(channel: &str, ts: &str, text: &str) -> MessageEvent {
        MessageEvent {
            kind: "app_mention".to_string(),
            channel: Some(channel.to_string()),
            ts: Some(ts.to_string()),
            event_ts: Some(ts.to_string()),
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn mention_opens_thread_and_replies_anchored_to_it() {
        let (dispatcher, slack, _) = dispatcher(FakeSlack::default(), vec![]);
        let event = mention_event("C1", "100", "hi");

        let outcome = dispatcher.handle_event(&event).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Replied);

        let posts = slack.posts.lock().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "C1");
        assert_eq!(posts[0].1, "canned answer");
        assert_eq!(posts[0].2.as_deref(), Some("100"));
    }

    #[tokio::test]
    async fn reply_in_activated_thread_posts_into_the_thread() {
        let (dispatcher, slack, _) = dispatcher(FakeSlack::default(), vec![]);
        dispatcher
            .handle_event(&mention_event("C1", "100", "hi"))
            .await
            .unwrap();

        let reply = MessageEvent {
            kind: "message".to_string(),
            channel: Some("C1".to_string()),
            thread_ts: Some("100".to_string()),
            ts: Some("101".to_string()),
            event_ts: Some("101".to_string()),
            text: Some("more".to_string()),
            ..Default::default()
        };
        let outcome = dispatcher.handle_event(&reply).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Replied);

        let posts = slack.posts.lock().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].2.as_deref(), Some("100"));
    }

    #[tokio::test]
    async fn redelivery_inside_dedup_window_is_a_no_op() {
        let (dispatcher, slack, _) = dispatcher(FakeSlack::default(), vec![]);
        let event = mention_event("C1", "100", "hi");

        assert_eq!(
            dispatcher.handle_event(&event).await.unwrap(),
            DispatchOutcome::Replied
        );
        assert_eq!(
            dispatcher.handle_event(&event).await.unwrap(),
            DispatchOutcome::Duplicate
        );
        assert_eq!(slack.posts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn direct_message_posts_without_thread_anchor() {
        let (dispatcher, slack, _) = dispatcher(FakeSlack::default(), vec![]);
        let event = MessageEvent {
            kind: "message".to_string(),
            channel: Some("D1".to_string()),
            channel_type: Some("im".to_string()),
            ts: Some("50".to_string()),
            event_ts: Some("50".to_string()),
            text: Some("hello".to_string()),
            ..Default::default()
        };
        dispatcher.handle_event(&event).await.unwrap();

        let posts = slack.posts.lock().unwrap();
        assert_eq!(posts[0].2, None);
    }

    #[tokio::test]
    async fn bot_and_subtype_events_are_ignored_after_policy() {
        let (dispatcher, slack, _) = dispatcher(FakeSlack::default(), vec![]);

        let mut event = mention_event("C1", "100", "hi");
        event.bot_id = Some("B9".to_string());
        assert!(matches!(
            dispatcher.handle_event(&event).await.unwrap(),
            DispatchOutcome::Ignored(_)
        ));

        let mut event = mention_event("C1", "101", "hi");
        event.subtype = Some("message_changed".to_string());
        assert!(matches!(
            dispatcher.handle_event(&event).await.unwrap(),
            DispatchOutcome::Ignored(_)
        ));
        assert!(slack.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn screenshot_failures_never_abort_the_message() {
        let (dispatcher, _, chat) = dispatcher(FakeSlack::default(), vec!["bad.example"]);
        let event = mention_event(
            "C1",
            "100",
            "compare https://good.example/a and https://bad.example/b",
        );
        assert_eq!(
            dispatcher.handle_event(&event).await.unwrap(),
            DispatchOutcome::Replied
        );

        let requests = chat.requests.lock().unwrap();
        let current = requests[0].messages.last().unwrap();
        assert_eq!(current.images, vec!["shot:https://good.example/a"]);
        assert!(current
            .content
            .contains("[Screenshot of https://good.example/a processed]"));
        assert!(!current.content.contains("bad.example/b processed"));
    }

    #[tokio::test]
    async fn assembled_history_precedes_the_current_turn() {
        let slack = FakeSlack {
            thread: vec![
                SlackMessage {
                    text: Some("root".to_string()),
                    ..Default::default()
                },
                SlackMessage {
                    text: Some("bot answer".to_string()),
                    bot_id: Some("B1".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let (dispatcher, _, chat) = dispatcher(slack, vec![]);

        let reply = MessageEvent {
            kind: "app_mention".to_string(),
            channel: Some("C1".to_string()),
            thread_ts: Some("90".to_string()),
            ts: Some("91".to_string()),
            event_ts: Some("91".to_string()),
            text: Some("and now?".to_string()),
            ..Default::default()
        };
        dispatcher.handle_event(&reply).await.unwrap();

        let requests = chat.requests.lock().unwrap();
        let contents: Vec<&str> = requests[0]
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["root", "bot answer", "and now?"]);
    }

    #[tokio::test]
    async fn event_without_id_is_skipped() {
        let (dispatcher, slack, _) = dispatcher(FakeSlack::default(), vec![]);
        let event = MessageEvent {
            kind: "message".to_string(),
            channel: Some("D1".to_string()),
            channel_type: Some("im".to_string()),
            text: Some("hello".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            dispatcher.handle_event(&event).await.unwrap(),
            DispatchOutcome::Ignored(_)
        ));
        assert!(slack.posts.lock().unwrap().is_empty());
    }
}
