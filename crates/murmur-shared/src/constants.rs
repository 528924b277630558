/// Application name
pub const APP_NAME: &str = "murmur";

/// Prefix of the per-room log record key
pub const ROOM_LOG_KEY_PREFIX: &str = "chat-messages-";

/// Messages revealed per page of the window
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Number of history messages seeded into a room with no stored log
pub const SEED_MESSAGE_COUNT: usize = 60;

/// Spacing between seeded history messages (1 minute)
pub const SEED_SPACING_MS: i64 = 60_000;

/// Minimum spacing between two synthetic replies in one room
pub const REPLY_THROTTLE_MS: u64 = 2_000;

/// Fixed part of the simulated typing delay
pub const REPLY_BASE_DELAY_MS: u64 = 1_000;

/// Upper bound (exclusive) of the random part of the typing delay
pub const REPLY_JITTER_MS: u64 = 600;

/// Simulated latency of loading an older page
pub const OLDER_PAGE_DELAY_MS: u64 = 800;

/// Text of the simulated reply
pub const DEFAULT_REPLY_TEXT: &str = "Assistant response (simulated)";

/// Clipboard text for messages that only carry an image
pub const IMAGE_PLACEHOLDER_TEXT: &str = "[image message]";
