//! # murmur-shared
//!
//! Identifiers, constants and the clock abstraction shared by the store and
//! the client.

pub mod clock;
pub mod constants;
pub mod error;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::MessageError;
pub use types::{ImageRef, MessageId, RoomId, Sender};
