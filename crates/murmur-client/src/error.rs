use thiserror::Error;

use murmur_shared::{MessageError, RoomId};
use murmur_store::StoreError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    #[error("Invalid room id: {0}")]
    InvalidRoomId(#[from] uuid::Error),

    #[error("No room at position {0}")]
    UnknownRoomIndex(usize),

    #[error("No room is open")]
    NoActiveRoom,

    #[error("Session for room {0} has closed")]
    SessionClosed(RoomId),

    #[error("No message at position {0}")]
    NoSuchMessage(usize),

    #[error("Nothing to send")]
    EmptyDraft,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Message error: {0}")]
    Message(#[from] MessageError),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

pub type Result<T> = std::result::Result<T, ClientError>;
