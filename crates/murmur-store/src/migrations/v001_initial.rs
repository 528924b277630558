//! v001 -- Initial schema creation.
//!
//! Creates the `rooms` directory table and the `room_logs` table that holds
//! one serialized message log per room.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Rooms
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS rooms (
    id         TEXT PRIMARY KEY NOT NULL,     -- UUID v4
    name       TEXT NOT NULL,
    created_at TEXT NOT NULL                  -- ISO-8601 / RFC-3339
);

CREATE INDEX IF NOT EXISTS idx_rooms_created_at ON rooms(created_at DESC);

-- ----------------------------------------------------------------
-- Room logs: one record per room, payload is the full JSON array
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS room_logs (
    storage_key TEXT PRIMARY KEY NOT NULL,    -- chat-messages-<room id>
    payload     TEXT NOT NULL,                -- JSON array of messages
    updated_at  TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
