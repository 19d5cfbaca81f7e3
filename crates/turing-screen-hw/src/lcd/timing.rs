//! Inter-bitmap delay enforcement.
//!
//! The panel corrupts its framebuffer if a command arrives too soon after
//! bitmap data. The wait is deferred until the next command is issued, so the
//! caller can do other work in the meantime.

use std::time::{Duration, Instant};
use tracing::trace;

/// Default gap between the end of a bitmap transfer and the next command.
pub const INTER_BITMAP_DELAY: Duration = Duration::from_millis(20);

/// Minimum-gap gate applied before every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingGate {
    min_gap: Duration,
}

impl Default for TimingGate {
    fn default() -> Self {
        Self::new(INTER_BITMAP_DELAY)
    }
}

impl TimingGate {
    pub fn new(min_gap: Duration) -> Self {
        Self { min_gap }
    }

    pub fn min_gap(&self) -> Duration {
        self.min_gap
    }

    /// Time still to wait at `now` given the last bitmap completion.
    pub fn remaining(&self, last_bitmap: Option<Instant>, now: Instant) -> Duration {
        match last_bitmap {
            Some(done) => self.min_gap.saturating_sub(now.saturating_duration_since(done)),
            None => Duration::ZERO,
        }
    }

    /// Blocks until the minimum gap since `last_bitmap` has elapsed.
    pub fn wait(&self, last_bitmap: Option<Instant>) {
        let remaining = self.remaining(last_bitmap, Instant::now());
        if !remaining.is_zero() {
            trace!("Holding command for {:?} after bitmap", remaining);
            std::thread::sleep(remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_bitmap_no_wait() {
        let gate = TimingGate::default();
        assert_eq!(gate.remaining(None, Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_remaining() {
        let gate = TimingGate::new(Duration::from_millis(20));
        let done = Instant::now();
        assert_eq!(
            gate.remaining(Some(done), done + Duration::from_millis(5)),
            Duration::from_millis(15)
        );
        assert_eq!(
            gate.remaining(Some(done), done + Duration::from_millis(25)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_wait_blocks_for_gap() {
        let gate = TimingGate::new(Duration::from_millis(30));
        let done = Instant::now();
        gate.wait(Some(done));
        assert!(done.elapsed() >= Duration::from_millis(30));
    }
}
