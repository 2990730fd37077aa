use rusqlite::Connection;

use crate::error::Result;

/// Initialise the Zoom token table.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS zoom_users (
            zoom_user_id     TEXT PRIMARY KEY,
            email            TEXT NOT NULL,
            access_token     TEXT NOT NULL,
            refresh_token    TEXT NOT NULL,
            token_expires_at TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );",
    )?;
    Ok(())
}
