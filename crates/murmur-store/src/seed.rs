//! Synthetic history for rooms that have never been written to.
//!
//! The seed is deterministic for a given start time so that a room opened
//! twice in the same millisecond produces the same log.

use murmur_shared::constants::SEED_SPACING_MS;
use murmur_shared::{MessageId, Sender};

use crate::models::{Message, MessageBody};

/// Build `count` alternating user / synthetic messages ending one spacing
/// before `start_from`.
pub fn seed_history(count: usize, start_from: i64) -> Vec<Message> {
    (0..count)
        .map(|i| {
            let sender = if i % 2 == 0 { Sender::User } else { Sender::Synthetic };
            let text = match sender {
                Sender::User => format!("Past message {}", i + 1),
                Sender::Synthetic => format!("AI past reply {}", i + 1),
            };
            let back = (count - i) as i64 * SEED_SPACING_MS;
            Message::new(
                MessageId(format!("seed-{start_from}-{i}")),
                sender,
                MessageBody::Text(text),
                start_from - back,
            )
        })
        .collect()
}

/// Seed log for a room first opened at `now_ms`.
pub fn seed_for(now_ms: i64, count: usize) -> Vec<Message> {
    seed_history(count, now_ms - SEED_SPACING_MS)
}
