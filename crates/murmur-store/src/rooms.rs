//! CRUD operations for [`Room`] records, and the [`RoomDirectory`] view the
//! session layer uses to decide whether a room exists at all.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::params;

use murmur_shared::RoomId;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Room;

/// Read-only room lookup consumed by sessions.
pub trait RoomDirectory {
    fn room(&self, id: RoomId) -> Option<Room>;

    fn exists(&self, id: RoomId) -> bool {
        self.room(id).is_some()
    }
}

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a room record as-is.
    pub fn insert_room(&self, room: &Room) -> Result<()> {
        self.conn().execute(
            "INSERT INTO rooms (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![room.id.to_string(), room.name, room.created_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Create a room with a fresh id.  The name is trimmed and must not be
    /// empty.
    pub fn create_room(&self, name: &str) -> Result<Room> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyRoomName);
        }

        let room = Room {
            id: RoomId::new(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.insert_room(&room)?;

        tracing::info!(room_id = %room.id, name = %room.name, "room created");
        Ok(room)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single room by id.
    pub fn get_room(&self, id: RoomId) -> Result<Room> {
        self.conn()
            .query_row(
                "SELECT id, name, created_at FROM rooms WHERE id = ?1",
                params![id.to_string()],
                row_to_room,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// List all rooms, newest first.
    pub fn list_rooms(&self) -> Result<Vec<Room>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, created_at
             FROM rooms
             ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map([], row_to_room)?;

        let mut rooms = Vec::new();
        for row in rows {
            rooms.push(row?);
        }
        Ok(rooms)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a room and its message log.  Returns `true` if the room existed.
    pub fn delete_room(&mut self, id: RoomId) -> Result<bool> {
        let tx = self.conn_mut().transaction()?;
        let affected = tx.execute("DELETE FROM rooms WHERE id = ?1", params![id.to_string()])?;
        tx.execute(
            "DELETE FROM room_logs WHERE storage_key = ?1",
            params![id.storage_key()],
        )?;
        tx.commit()?;

        if affected > 0 {
            tracing::info!(room_id = %id, "room deleted");
        }
        Ok(affected > 0)
    }
}

impl RoomDirectory for Database {
    fn room(&self, id: RoomId) -> Option<Room> {
        match self.get_room(id) {
            Ok(room) => Some(room),
            Err(StoreError::NotFound) => None,
            Err(e) => {
                tracing::warn!(room_id = %id, error = %e, "room lookup failed");
                None
            }
        }
    }
}

impl<D: RoomDirectory> RoomDirectory for Mutex<D> {
    fn room(&self, id: RoomId) -> Option<Room> {
        match self.lock() {
            Ok(guard) => guard.room(id),
            Err(_) => {
                tracing::error!(room_id = %id, "room directory lock poisoned");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Room`].
fn row_to_room(row: &rusqlite::Row<'_>) -> rusqlite::Result<Room> {
    let id_str: String = row.get(0)?;
    let name: String = row.get(1)?;
    let created_str: String = row.get(2)?;

    let id = RoomId::parse(&id_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(Room { id, name, created_at })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_get_list_delete() {
        let mut db = Database::open_in_memory().unwrap();

        let general = db.create_room("  general ").unwrap();
        assert_eq!(general.name, "general");
        let random = db.create_room("random").unwrap();

        assert_eq!(db.get_room(general.id).unwrap(), general);
        assert!(db.exists(random.id));

        let listed = db.list_rooms().unwrap();
        assert_eq!(listed.len(), 2);

        assert!(db.delete_room(general.id).unwrap());
        assert!(!db.delete_room(general.id).unwrap());
        assert!(matches!(db.get_room(general.id), Err(StoreError::NotFound)));
        assert!(!db.exists(general.id));
    }

    #[test]
    fn blank_names_are_rejected() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(db.create_room("   "), Err(StoreError::EmptyRoomName)));
    }

    #[test]
    fn list_is_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let older = Room {
            id: RoomId::new(),
            name: "older".into(),
            created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
        };
        let newer = Room {
            id: RoomId::new(),
            name: "newer".into(),
            created_at: "2024-06-01T00:00:00Z".parse().unwrap(),
        };
        db.insert_room(&older).unwrap();
        db.insert_room(&newer).unwrap();

        let names: Vec<_> = db.list_rooms().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["newer", "older"]);
    }

    #[test]
    fn deleting_a_room_drops_its_log() {
        let mut db = Database::open_in_memory().unwrap();
        let room = db.create_room("doomed").unwrap();
        db.write_room_log(&room.id.storage_key(), "[]").unwrap();

        db.delete_room(room.id).unwrap();
        assert!(db.read_room_log(&room.id.storage_key()).unwrap().is_none());
    }

    #[test]
    fn mutex_directory_delegates() {
        let db = Database::open_in_memory().unwrap();
        let room = db.create_room("shared").unwrap();
        let shared = Mutex::new(db);
        assert!(shared.exists(room.id));
        assert!(!shared.exists(RoomId::new()));
    }
}
