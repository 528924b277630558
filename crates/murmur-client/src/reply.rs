//! Throttled scheduling of simulated replies.
//!
//! One [`ReplyScheduler`] exists per room session.  A user message moves it
//! from `Idle` to `Pending`; the session arms a timer for the returned delay
//! and calls [`ReplyScheduler::complete`] once the reply has been appended.
//! User messages arriving while a reply is pending do not schedule another.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use murmur_shared::constants::{REPLY_BASE_DELAY_MS, REPLY_JITTER_MS, REPLY_THROTTLE_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTiming {
    /// Minimum spacing between two reply completions.
    pub throttle: Duration,
    /// Fixed typing delay added to every reply.
    pub base_delay: Duration,
    /// Exclusive upper bound of the random extra delay.
    pub jitter: Duration,
}

impl Default for ReplyTiming {
    fn default() -> Self {
        Self {
            throttle: Duration::from_millis(REPLY_THROTTLE_MS),
            base_delay: Duration::from_millis(REPLY_BASE_DELAY_MS),
            jitter: Duration::from_millis(REPLY_JITTER_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyState {
    Idle,
    Pending { triggered_at: i64, delay: Duration },
}

pub struct ReplyScheduler {
    timing: ReplyTiming,
    state: ReplyState,
    last_reply_at: Option<i64>,
    rng: StdRng,
}

impl ReplyScheduler {
    pub fn new(timing: ReplyTiming, rng: StdRng) -> Self {
        Self {
            timing,
            state: ReplyState::Idle,
            last_reply_at: None,
            rng,
        }
    }

    pub fn from_seed(timing: ReplyTiming, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(timing, rng)
    }

    pub fn state(&self) -> ReplyState {
        self.state
    }

    /// Whether the "composing" indicator should be shown.
    pub fn is_composing(&self) -> bool {
        matches!(self.state, ReplyState::Pending { .. })
    }

    pub fn last_reply_at(&self) -> Option<i64> {
        self.last_reply_at
    }

    /// Part of the delay owed to the throttle at `now`.
    pub fn throttle_delay(&self, now: i64) -> Duration {
        let Some(last) = self.last_reply_at else {
            return Duration::ZERO;
        };
        let elapsed = Duration::from_millis(now.saturating_sub(last).max(0) as u64);
        self.timing.throttle.saturating_sub(elapsed)
    }

    /// React to a user message appended at `now`.
    ///
    /// Returns the delay after which the reply is due, or `None` when a
    /// reply is already pending.
    pub fn on_user_message(&mut self, now: i64) -> Option<Duration> {
        if let ReplyState::Pending { .. } = self.state {
            tracing::debug!("reply already pending; not scheduling another");
            return None;
        }

        let delay = self.throttle_delay(now) + self.timing.base_delay + self.jitter();
        self.state = ReplyState::Pending {
            triggered_at: now,
            delay,
        };
        tracing::debug!(delay_ms = delay.as_millis() as u64, "reply scheduled");
        Some(delay)
    }

    /// Record that the pending reply was appended at `now`.
    pub fn complete(&mut self, now: i64) -> bool {
        if self.state == ReplyState::Idle {
            return false;
        }
        self.state = ReplyState::Idle;
        self.last_reply_at = Some(now);
        true
    }

    /// Drop a pending reply without producing it.
    pub fn cancel(&mut self) {
        self.state = ReplyState::Idle;
    }

    fn jitter(&mut self) -> Duration {
        let max = self.timing.jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.gen_range(0..max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(seed: u64) -> ReplyScheduler {
        ReplyScheduler::from_seed(ReplyTiming::default(), Some(seed))
    }

    #[test]
    fn first_reply_is_not_throttled() {
        let mut s = scheduler(1);
        let delay = s.on_user_message(0).unwrap();
        assert!(delay >= Duration::from_millis(1_000));
        assert!(delay < Duration::from_millis(1_600));
        assert!(s.is_composing());
    }

    #[test]
    fn pending_collapses_further_messages() {
        let mut s = scheduler(2);
        assert!(s.on_user_message(0).is_some());
        assert_eq!(s.on_user_message(100), None);
        assert!(s.complete(1_200));
        assert!(!s.is_composing());
        assert_eq!(s.last_reply_at(), Some(1_200));
    }

    #[test]
    fn complete_without_pending_is_noop() {
        let mut s = scheduler(3);
        assert!(!s.complete(10));
        assert_eq!(s.last_reply_at(), None);
    }

    #[test]
    fn throttle_delay_shrinks_with_time() {
        let mut s = scheduler(4);
        s.on_user_message(0);
        s.complete(1_000);

        assert_eq!(s.throttle_delay(1_500), Duration::from_millis(1_500));
        assert_eq!(s.throttle_delay(3_000), Duration::ZERO);
        // clock going backwards owes the full throttle
        assert_eq!(s.throttle_delay(500), Duration::from_millis(2_000));
    }

    #[test]
    fn cancel_returns_to_idle_without_touching_clock() {
        let mut s = scheduler(5);
        s.on_user_message(0);
        s.cancel();
        assert_eq!(s.state(), ReplyState::Idle);
        assert_eq!(s.last_reply_at(), None);
    }

    #[test]
    fn zero_jitter_is_exact() {
        let timing = ReplyTiming {
            jitter: Duration::ZERO,
            ..ReplyTiming::default()
        };
        let mut s = ReplyScheduler::from_seed(timing, None);
        assert_eq!(s.on_user_message(0), Some(Duration::from_millis(1_000)));
    }

    // Drive the state machine through many random sends and check the
    // spacing of completions.
    #[test]
    fn completions_respect_throttle() {
        let mut s = scheduler(42);
        let mut rng = StdRng::seed_from_u64(99);
        let mut now = 0i64;
        let mut due: Option<i64> = None;
        let mut completions = Vec::new();

        for _ in 0..2_000 {
            now += rng.gen_range(0..900);
            if let Some(at) = due {
                if at <= now {
                    s.complete(at);
                    completions.push(at);
                    due = None;
                }
            }
            if let Some(delay) = s.on_user_message(now) {
                due = Some(now + delay.as_millis() as i64);
            }
        }

        assert!(completions.len() > 10);
        for pair in completions.windows(2) {
            assert!(pair[1] - pair[0] >= 2_000, "{pair:?}");
        }
    }
}
