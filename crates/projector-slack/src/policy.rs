use std::sync::Arc;

use projector_tracking::{error::Result, TrackingStore};
use tracing::warn;

use crate::event::{EventKind, MessageEvent};

/// Decides, per inbound event, whether the bot must respond, mutating
/// thread-activation state along the way.
///
/// A mention always opens a line: the thread it lands in (or the thread it
/// starts) is activated so later plain replies keep getting answers
/// without a re-mention. DMs are always answered. Unsolicited channel
/// chatter is ignored unless it lands inside an already-opened thread.
pub struct ResponsePolicy {
    store: Arc<TrackingStore>,
}

impl ResponsePolicy {
    pub fn new(store: Arc<TrackingStore>) -> Self {
        Self { store }
    }

    pub fn should_respond(&self, event: &MessageEvent) -> Result<bool> {
        match event.classify() {
            EventKind::DirectMessage => Ok(true),
            EventKind::Mention => {
                let (Some(channel), Some(root)) =
                    (event.channel.as_deref(), event.conversation_root())
                else {
                    warn!("mention without channel or ts, ignoring");
                    return Ok(false);
                };
                self.store.activate_thread(channel, root)?;
                Ok(true)
            }
            EventKind::ThreadReply => match (event.channel.as_deref(), event.thread_ts.as_deref())
            {
                (Some(channel), Some(thread_ts)) => self.store.is_thread_active(channel, thread_ts),
                _ => Ok(false),
            },
            EventKind::Other => Ok(false),
        }
    }
}
