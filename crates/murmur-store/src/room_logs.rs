//! Raw access to the per-room log records.
//!
//! Each room owns exactly one row keyed by [`RoomId::storage_key`]; the
//! payload is the complete JSON array of the room's messages and is replaced
//! wholesale on every write.
//!
//! [`RoomId::storage_key`]: murmur_shared::RoomId::storage_key

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::Result;
use crate::message_store::LogBackend;

impl Database {
    pub fn read_room_log(&self, key: &str) -> Result<Option<String>> {
        let payload = self
            .conn()
            .query_row(
                "SELECT payload FROM room_logs WHERE storage_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    pub fn write_room_log(&self, key: &str, payload: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO room_logs (storage_key, payload, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(storage_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
            params![key, payload, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn delete_room_log(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM room_logs WHERE storage_key = ?1", params![key])?;
        Ok(affected > 0)
    }
}

impl LogBackend for Database {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.read_room_log(key)
    }

    fn write(&self, key: &str, payload: &str) -> Result<()> {
        self.write_room_log(key, payload)
    }
}
