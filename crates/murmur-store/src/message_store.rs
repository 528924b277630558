//! The per-room message log store.
//!
//! [`MessageStore`] keeps every opened room's log in memory and writes the
//! full log through a [`LogBackend`] on each append, before the append
//! returns.  The in-memory log is authoritative for the session: a failed
//! write is reported, never fatal, and an unreadable record is replaced by a
//! freshly seeded history.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use murmur_shared::constants::SEED_MESSAGE_COUNT;
use murmur_shared::{Clock, RoomId};

use crate::error::{Result, StoreError};
use crate::models::Message;
use crate::seed;

/// Durable key/value storage for serialized room logs.
pub trait LogBackend {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, payload: &str) -> Result<()>;
}

impl<B: LogBackend + ?Sized> LogBackend for Arc<B> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, payload: &str) -> Result<()> {
        (**self).write(key, payload)
    }
}

impl<B: LogBackend> LogBackend for Mutex<B> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.lock().map_err(|_| StoreError::LockPoisoned)?.read(key)
    }

    fn write(&self, key: &str, payload: &str) -> Result<()> {
        self.lock().map_err(|_| StoreError::LockPoisoned)?.write(key, payload)
    }
}

/// Result of [`MessageStore::append`].
#[derive(Debug)]
pub struct AppendOutcome {
    /// The message as stored (its timestamp may have been clamped).
    pub message: Message,
    /// Position of the message in the room log.
    pub index: usize,
    /// Set when the durable write failed; the message is still in memory.
    pub persist_error: Option<StoreError>,
}

impl AppendOutcome {
    pub fn is_durable(&self) -> bool {
        self.persist_error.is_none()
    }
}

pub struct MessageStore {
    backend: Box<dyn LogBackend + Send>,
    clock: Arc<dyn Clock>,
    seed_count: usize,
    logs: HashMap<RoomId, Vec<Message>>,
}

impl MessageStore {
    pub fn new(backend: impl LogBackend + Send + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend: Box::new(backend),
            clock,
            seed_count: SEED_MESSAGE_COUNT,
            logs: HashMap::new(),
        }
    }

    /// Number of messages seeded into rooms without a stored log.
    pub fn with_seed_count(mut self, seed_count: usize) -> Self {
        self.seed_count = seed_count;
        self
    }

    /// Return the room's log, restoring or seeding it on first access.
    pub fn load(&mut self, room: RoomId) -> &[Message] {
        if !self.logs.contains_key(&room) {
            let log = self.restore(room);
            self.logs.insert(room, log);
        }
        self.logs.get(&room).map(Vec::as_slice).unwrap_or_default()
    }

    /// Append a message to the end of the room's log and persist the whole
    /// log before returning.
    pub fn append(&mut self, room: RoomId, mut message: Message) -> AppendOutcome {
        self.load(room);
        let log = self.logs.entry(room).or_default();

        if let Some(last) = log.last() {
            if message.timestamp < last.timestamp {
                tracing::debug!(
                    room_id = %room,
                    candidate = message.timestamp,
                    tail = last.timestamp,
                    "clamping message timestamp to log tail"
                );
                message.timestamp = last.timestamp;
            }
        }

        log.push(message.clone());
        let index = log.len() - 1;

        let persist_error = persist(self.backend.as_ref(), room, log).err();
        if let Some(e) = &persist_error {
            tracing::warn!(room_id = %room, error = %e, "failed to persist room log; keeping in-memory copy");
        }

        AppendOutcome {
            message,
            index,
            persist_error,
        }
    }

    /// The room's log if it has been loaded.
    pub fn log(&self, room: RoomId) -> Option<&[Message]> {
        self.logs.get(&room).map(Vec::as_slice)
    }

    /// Length of a loaded room's log (0 if not loaded).
    pub fn len(&self, room: RoomId) -> usize {
        self.logs.get(&room).map_or(0, Vec::len)
    }

    /// Drop the in-memory copy of a room's log, e.g. after the room was
    /// deleted from the directory.
    pub fn evict(&mut self, room: RoomId) -> bool {
        self.logs.remove(&room).is_some()
    }

    fn restore(&self, room: RoomId) -> Vec<Message> {
        match read_persisted(self.backend.as_ref(), room) {
            Ok(Some(log)) if !log.is_empty() => {
                tracing::debug!(room_id = %room, len = log.len(), "room log restored");
                return log;
            }
            Ok(_) => {
                tracing::debug!(room_id = %room, "no stored room log; seeding history");
            }
            Err(e) => {
                tracing::warn!(room_id = %room, error = %e, "unreadable room log; seeding fresh history");
            }
        }

        let log = seed::seed_for(self.clock.now_ms(), self.seed_count);
        if let Err(e) = persist(self.backend.as_ref(), room, &log) {
            tracing::warn!(room_id = %room, error = %e, "failed to persist seeded room log");
        }
        log
    }
}

fn read_persisted(backend: &dyn LogBackend, room: RoomId) -> Result<Option<Vec<Message>>> {
    let Some(raw) = backend.read(&room.storage_key())? else {
        return Ok(None);
    };
    let log: Vec<Message> = serde_json::from_str(&raw)?;
    Ok(Some(log))
}

fn persist(backend: &dyn LogBackend, room: RoomId, log: &[Message]) -> Result<()> {
    let payload = serde_json::to_string(log)?;
    backend.write(&room.storage_key(), &payload)
}
