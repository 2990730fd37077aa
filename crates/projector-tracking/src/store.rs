use std::sync::Mutex;

use chrono::{Duration, Utc};
use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;
use crate::types::RecordType;

/// Message (dedup) records expire after 5 minutes — long enough to absorb
/// platform redelivery, short enough not to accumulate.
pub const MESSAGE_TTL_SECS: i64 = 5 * 60;
/// Thread-activation records expire after 24 hours — a thread cools down
/// if inactive.
pub const THREAD_TTL_SECS: i64 = 24 * 60 * 60;

/// Thread-safe store for dedup and thread-activation records.
///
/// Wraps a single SQLite connection in a `Mutex`. All access is by key
/// (event id or channel/thread pair), so contention is per-call, never
/// cross-key.
pub struct TrackingStore {
    db: Mutex<Connection>,
}

impl TrackingStore {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Check whether `event_id` was already processed inside the dedup
    /// window, marking it processed if not.
    ///
    /// Returns `true` for a duplicate (a live record already existed) and
    /// `false` when this call claimed the event. The delete-then-insert
    /// runs in one transaction and the UNIQUE constraint arbitrates
    /// concurrent deliveries: exactly one of them inserts.
    pub fn check_and_mark_processed(&self, event_id: &str) -> Result<bool> {
        let now = Utc::now();
        let now_str = now.to_rfc3339();
        let expires = (now + Duration::seconds(MESSAGE_TTL_SECS)).to_rfc3339();

        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        // An expired row is logically absent — clear it so the insert can
        // claim the key again.
        tx.execute(
            "DELETE FROM slack_tracking
             WHERE record_type = ?1 AND identifier = ?2 AND expires_at <= ?3",
            rusqlite::params![RecordType::Message.as_str(), event_id, now_str],
        )?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO slack_tracking
             (record_type, identifier, channel_id, expires_at, created_at)
             VALUES (?1, ?2, '', ?3, ?4)",
            rusqlite::params![RecordType::Message.as_str(), event_id, expires, now_str],
        )?;
        tx.commit()?;

        let duplicate = inserted == 0;
        if duplicate {
            debug!(event_id, "event already processed inside dedup window");
        }
        Ok(duplicate)
    }

    /// Opt the bot in to a thread for 24 hours.
    ///
    /// Re-activating an already-active thread refreshes its expiry.
    pub fn activate_thread(&self, channel_id: &str, thread_ts: &str) -> Result<()> {
        let now = Utc::now();
        let expires = (now + Duration::seconds(THREAD_TTL_SECS)).to_rfc3339();

        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO slack_tracking
             (record_type, identifier, channel_id, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(record_type, identifier, channel_id)
             DO UPDATE SET expires_at = excluded.expires_at",
            rusqlite::params![
                RecordType::Thread.as_str(),
                thread_ts,
                channel_id,
                expires,
                now.to_rfc3339()
            ],
        )?;
        debug!(channel_id, thread_ts, "thread activated");
        Ok(())
    }

    /// True iff a live activation record exists for this channel/thread pair.
    pub fn is_thread_active(&self, channel_id: &str, thread_ts: &str) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        match db.query_row(
            "SELECT 1 FROM slack_tracking
             WHERE record_type = ?1 AND identifier = ?2 AND channel_id = ?3
               AND expires_at > ?4",
            rusqlite::params![RecordType::Thread.as_str(), thread_ts, channel_id, now],
            |_| Ok(()),
        ) {
            Ok(()) => Ok(true),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every expired record. Storage hygiene only — reads already
    /// treat expired rows as absent.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        let removed = db.execute(
            "DELETE FROM slack_tracking WHERE expires_at <= ?1",
            rusqlite::params![now],
        )?;
        Ok(removed)
    }
}
