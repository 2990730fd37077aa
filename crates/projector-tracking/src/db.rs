use rusqlite::Connection;

use crate::error::Result;

/// Initialise the tracking table and its indexes.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout.
///
/// The UNIQUE constraint over (record_type, identifier, channel_id) is the
/// concurrency gate for the dedup check: two deliveries of the same event
/// cannot both insert a message record.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS slack_tracking (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            record_type  TEXT NOT NULL,
            identifier   TEXT NOT NULL,
            channel_id   TEXT NOT NULL DEFAULT '',
            expires_at   TEXT NOT NULL,
            created_at   TEXT NOT NULL,
            UNIQUE(record_type, identifier, channel_id)
        );
        CREATE INDEX IF NOT EXISTS idx_tracking_expiry
            ON slack_tracking(expires_at);",
    )?;
    Ok(())
}
