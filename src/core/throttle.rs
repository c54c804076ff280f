//! Per-guild rate limiting for commands that change guild-wide settings.

use governor::clock::Clock;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

/// How often a guild may change its language per hour
pub const LANGUAGE_CHANGES_PER_HOUR: u32 = 7;

// keys idle long enough to be full again are dropped past this size
const RETAIN_THRESHOLD: usize = 1024;

/// Allows a burst of `per_hour` actions per key, refilled evenly over an hour.
pub struct Throttle {
    limiter: DefaultKeyedRateLimiter<u64>,
}

impl Throttle {
    /// A throttle allowing `per_hour` actions per key; zero is treated as one.
    #[must_use]
    pub fn per_hour(per_hour: u32) -> Self {
        let per_hour = NonZeroU32::new(per_hour).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::keyed(Quota::per_hour(per_hour)),
        }
    }

    /// Takes one action for `key`, or returns how long until the next is allowed.
    pub fn check(&self, key: u64) -> Result<(), Duration> {
        let result = self.limiter.check_key(&key).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.limiter.clock().now());
            debug!(key, wait_secs = wait.as_secs(), "Throttled");
            wait
        });
        if self.limiter.len() > RETAIN_THRESHOLD {
            self.limiter.retain_recent();
        }
        result
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("keys", &self.limiter.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_throttled() {
        let throttle = Throttle::per_hour(LANGUAGE_CHANGES_PER_HOUR);
        for _ in 0..LANGUAGE_CHANGES_PER_HOUR {
            assert!(throttle.check(42).is_ok());
        }

        let wait = throttle.check(42).unwrap_err();
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_secs(3600 / u64::from(LANGUAGE_CHANGES_PER_HOUR)));
    }

    #[test]
    fn test_keys_are_independent() {
        let throttle = Throttle::per_hour(1);
        assert!(throttle.check(1).is_ok());
        assert!(throttle.check(1).is_err());
        assert!(throttle.check(2).is_ok());
    }

    #[test]
    fn test_zero_allows_one() {
        let throttle = Throttle::per_hour(0);
        assert!(throttle.check(3).is_ok());
        assert!(throttle.check(3).is_err());
    }
}
