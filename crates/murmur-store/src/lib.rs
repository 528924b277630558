//! # murmur-store
//!
//! Local storage for murmur, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle wrapping a
//! `rusqlite::Connection` (room directory and raw log records) and the
//! [`MessageStore`], which owns the per-room message logs and writes them
//! through on every append.

pub mod database;
pub mod message_store;
pub mod migrations;
pub mod models;
pub mod room_logs;
pub mod rooms;
pub mod seed;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use message_store::{AppendOutcome, LogBackend, MessageStore};
pub use models::*;
pub use rooms::RoomDirectory;
