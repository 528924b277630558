use murmur_shared::RoomId;
use murmur_store::Room;

use crate::commands::lock_db;
use crate::error::{ClientError, Result};
use crate::state::AppState;

pub fn list_rooms(state: &AppState) -> Result<Vec<Room>> {
    Ok(lock_db(state)?.list_rooms()?)
}

pub fn create_room(state: &AppState, name: &str) -> Result<Room> {
    Ok(lock_db(state)?.create_room(name)?)
}

/// Delete a room together with its history.
///
/// If the room is open its session is closed first, so no pending reply
/// lands in a log that no longer exists.
pub async fn delete_room(state: &mut AppState, id: RoomId) -> Result<bool> {
    if state
        .active
        .as_ref()
        .is_some_and(|active| active.handle.room().id == id)
    {
        state.close_active().await;
    }

    let existed = lock_db(state)?.delete_room(id)?;
    state
        .ctx
        .store
        .lock()
        .map_err(|_| ClientError::LockPoisoned("message store"))?
        .evict(id);
    Ok(existed)
}
