//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use murmur_shared::constants::{
    DEFAULT_PAGE_SIZE, DEFAULT_REPLY_TEXT, OLDER_PAGE_DELAY_MS, SEED_MESSAGE_COUNT,
};

use crate::reply::ReplyTiming;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// SQLite database file.
    /// Env: `MURMUR_DB_PATH`
    /// Default: platform data directory (see `Database::default_path`).
    pub db_path: Option<PathBuf>,

    /// Messages revealed per window page.
    /// Env: `MURMUR_PAGE_SIZE`
    /// Default: `20`
    pub page_size: usize,

    /// Throttle, base delay and jitter of simulated replies.
    /// Env: `MURMUR_THROTTLE_MS`, `MURMUR_BASE_DELAY_MS`, `MURMUR_JITTER_MS`
    /// Default: 2000 / 1000 / 600 ms
    pub reply_timing: ReplyTiming,

    /// Simulated latency of loading an older page.
    /// Env: `MURMUR_OLDER_DELAY_MS`
    /// Default: 800 ms
    pub older_page_delay: Duration,

    /// History seeded into rooms without a stored log.
    /// Env: `MURMUR_SEED_COUNT`
    /// Default: `60`
    pub seed_count: usize,

    /// Body of every simulated reply.
    /// Env: `MURMUR_REPLY_TEXT`
    pub reply_text: String,

    /// Fixed seed for reply jitter, for reproducible runs.
    /// Env: `MURMUR_RNG_SEED`
    /// Default: none (seeded from entropy).
    pub rng_seed: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            reply_timing: ReplyTiming::default(),
            older_page_delay: Duration::from_millis(OLDER_PAGE_DELAY_MS),
            seed_count: SEED_MESSAGE_COUNT,
            reply_text: DEFAULT_REPLY_TEXT.to_string(),
            rng_seed: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = get("MURMUR_DB_PATH") {
            if !path.is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(n) = parse_var::<usize>(&get, "MURMUR_PAGE_SIZE") {
            if n == 0 {
                tracing::warn!("MURMUR_PAGE_SIZE must be positive, using default");
            } else {
                config.page_size = n;
            }
        }

        if let Some(ms) = parse_var::<u64>(&get, "MURMUR_THROTTLE_MS") {
            config.reply_timing.throttle = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&get, "MURMUR_BASE_DELAY_MS") {
            config.reply_timing.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&get, "MURMUR_JITTER_MS") {
            config.reply_timing.jitter = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&get, "MURMUR_OLDER_DELAY_MS") {
            config.older_page_delay = Duration::from_millis(ms);
        }

        if let Some(n) = parse_var::<usize>(&get, "MURMUR_SEED_COUNT") {
            config.seed_count = n;
        }

        if let Some(text) = get("MURMUR_REPLY_TEXT") {
            if text.trim().is_empty() {
                tracing::warn!("MURMUR_REPLY_TEXT is blank, using default");
            } else {
                config.reply_text = text;
            }
        }

        config.rng_seed = parse_var::<u64>(&get, "MURMUR_RNG_SEED");

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}

fn parse_var<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = get(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "invalid value, using default");
            None
        }
    }
}
