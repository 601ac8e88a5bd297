//! Resize throttling.
//!
//! Container resizes arrive in bursts while a window is dragged. The throttle lets the
//! first one through, holds back the rest of the burst, and hands the last held size
//! out once the interval has passed so the final size is never lost.
//!
//! Time is a monotonic timestamp measured from any fixed origin, so the same throttle
//! runs on `Instant`-based native hosts and on `performance.now()` in the browser.

use std::time::Duration;

/// Default minimum time between two applied resizes.
pub const RESIZE_INTERVAL: Duration = Duration::from_millis(100);

/// Leading-edge throttle with a trailing pending value.
#[derive(Debug, Clone)]
pub struct ResizeThrottle {
    interval: Duration,
    last_applied: Option<Duration>,
    pending: Option<(u32, u32)>,
}

impl Default for ResizeThrottle {
    fn default() -> Self {
        Self::new(RESIZE_INTERVAL)
    }
}

impl ResizeThrottle {
    /// Throttle applying at most one resize per `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_applied: None,
            pending: None,
        }
    }

    /// Minimum time between applied resizes.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Size held back by the last rejected [`offer`](Self::offer).
    #[must_use]
    pub fn pending(&self) -> Option<(u32, u32)> {
        self.pending
    }

    fn ready(&self, now: Duration) -> bool {
        match self.last_applied {
            Some(last) => now.saturating_sub(last) >= self.interval,
            None => true,
        }
    }

    /// Offer a new size. Returns `true` if it should be applied now, otherwise keeps it
    /// as the pending size.
    pub fn offer(&mut self, width: u32, height: u32, now: Duration) -> bool {
        if self.ready(now) {
            self.last_applied = Some(now);
            self.pending = None;
            true
        } else {
            self.pending = Some((width, height));
            false
        }
    }

    /// Take the pending size if the interval has elapsed.
    pub fn flush(&mut self, now: Duration) -> Option<(u32, u32)> {
        if self.pending.is_some() && self.ready(now) {
            self.last_applied = Some(now);
            return self.pending.take();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_resize_applies() {
        let mut throttle = ResizeThrottle::default();
        assert!(throttle.offer(800, 600, Duration::ZERO));
        assert_eq!(throttle.pending(), None);
    }

    #[test]
    fn test_burst_is_throttled() {
        let mut throttle = ResizeThrottle::default();
        let t0 = Duration::ZERO;
        assert!(throttle.offer(800, 600, t0));
        assert!(!throttle.offer(810, 600, t0 + Duration::from_millis(30)));
        assert!(!throttle.offer(820, 600, t0 + Duration::from_millis(60)));
        assert_eq!(throttle.pending(), Some((820, 600)));
        assert!(throttle.offer(830, 600, t0 + Duration::from_millis(100)));
        assert_eq!(throttle.pending(), None);
    }

    #[test]
    fn test_flush_trailing_size() {
        let mut throttle = ResizeThrottle::new(Duration::from_millis(50));
        let t0 = Duration::ZERO;
        throttle.offer(100, 100, t0);
        throttle.offer(200, 150, t0 + Duration::from_millis(10));

        assert_eq!(throttle.flush(t0 + Duration::from_millis(20)), None);
        assert_eq!(throttle.flush(t0 + Duration::from_millis(50)), Some((200, 150)));
        assert_eq!(throttle.flush(t0 + Duration::from_millis(500)), None);
    }

    #[test]
    fn test_millisecond_timestamps() {
        let ms = |v: u64| Duration::from_millis(v);
        let mut throttle = ResizeThrottle::default();
        assert!(throttle.offer(640, 480, ms(16_000)));
        assert!(!throttle.offer(650, 480, ms(16_040)));
        assert_eq!(throttle.flush(ms(16_099)), None);
        assert_eq!(throttle.flush(ms(16_100)), Some((650, 480)));
    }

    #[test]
    fn test_clock_going_backwards_is_not_ready() {
        let mut throttle = ResizeThrottle::default();
        let t0 = Duration::from_secs(1);
        throttle.offer(1, 1, t0);
        assert!(!throttle.offer(2, 2, t0 - Duration::from_millis(500)));
    }
}
