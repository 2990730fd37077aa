use serde::{Deserialize, Serialize};

/// Kind of a tracking record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// An event id that has already been fully processed (dedup).
    Message,
    /// A thread the bot has opted in to and keeps responding in.
    Thread,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Message => "message",
            RecordType::Thread => "thread",
        }
    }
}

/// A dedup/activation entry as stored in `slack_tracking`.
///
/// Logically dead once `expires_at` passes — reads treat a dead row as
/// absent (lazy expiry), so no sweep is needed for correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedRecord {
    pub record_type: RecordType,
    pub identifier: String,
    pub channel_id: String,
    /// RFC 3339 UTC timestamp.
    pub expires_at: String,
}
