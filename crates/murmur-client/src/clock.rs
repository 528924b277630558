use murmur_shared::{Clock, SystemClock};
use tokio::time::Instant;

/// Wall-clock time that advances with the tokio timer.
///
/// Anchored to the system clock once, then driven by `tokio::time::Instant`,
/// so message timestamps agree with session timers (including under paused
/// test time).
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin_ms: i64,
    origin: Instant,
}

impl TokioClock {
    pub fn new(origin_ms: i64) -> Self {
        Self {
            origin_ms,
            origin: Instant::now(),
        }
    }

    pub fn starting_now() -> Self {
        Self::new(SystemClock.now_ms())
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> i64 {
        self.origin_ms + self.origin.elapsed().as_millis() as i64
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn follows_tokio_time() {
        let clock = TokioClock::new(5_000);
        assert_eq!(clock.now_ms(), 5_000);
        tokio::time::advance(Duration::from_millis(1_234)).await;
        assert_eq!(clock.now_ms(), 6_234);
    }
}
