//! Recording countdown

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// One tick per second from `secs` down to zero
///
/// Dropping the countdown cancels it.
#[derive(Debug)]
pub struct Countdown {
    interval: Interval,
    remaining: u32,
}

impl Countdown {
    /// Start counting down; the first tick fires one second from now
    pub fn start(secs: u32) -> Self {
        let period = Duration::from_secs(1);
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            remaining: secs,
        }
    }

    /// Seconds left
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether the countdown reached zero
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Wait for the next tick and return the seconds left
    ///
    /// Returns zero immediately once expired. Cancel-safe.
    pub async fn tick(&mut self) -> u32 {
        if self.remaining == 0 {
            return 0;
        }
        self.interval.tick().await;
        self.remaining -= 1;
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_once_per_second() {
        let started = Instant::now();
        let mut countdown = Countdown::start(3);
        assert_eq!(countdown.remaining(), 3);

        assert_eq!(countdown.tick().await, 2);
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert_eq!(countdown.tick().await, 1);
        assert_eq!(countdown.tick().await, 0);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
        assert!(countdown.is_expired());

        assert_eq!(countdown.tick().await, 0);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_length_countdown_is_expired() {
        let mut countdown = Countdown::start(0);
        assert!(countdown.is_expired());
        assert_eq!(countdown.tick().await, 0);
    }
}
