/// Inactivity detection for the screensaver

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct IdleTracker {
    timeout: Duration,
    last_activity: Instant,
}

impl IdleTracker {
    pub fn new(timeout: Duration, now: Instant) -> Self {
        Self {
            timeout,
            last_activity: now,
        }
    }

    pub fn record_activity(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// True once `timeout` has passed without input
    pub fn is_idle(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_activity) >= self.timeout
    }

    /// Time left before going idle
    pub fn remaining(&self, now: Instant) -> Duration {
        self.timeout
            .saturating_sub(now.saturating_duration_since(self.last_activity))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goes_idle_after_timeout() {
        let start = Instant::now();
        let tracker = IdleTracker::new(Duration::from_secs(60), start);

        assert!(!tracker.is_idle(start + Duration::from_secs(59)));
        assert!(tracker.is_idle(start + Duration::from_secs(60)));
        assert_eq!(tracker.remaining(start + Duration::from_secs(45)), Duration::from_secs(15));
        assert_eq!(tracker.remaining(start + Duration::from_secs(90)), Duration::ZERO);
    }

    #[test]
    fn test_activity_resets_window() {
        let start = Instant::now();
        let mut tracker = IdleTracker::new(Duration::from_secs(10), start);

        tracker.record_activity(start + Duration::from_secs(8));
        assert!(!tracker.is_idle(start + Duration::from_secs(12)));
        assert!(tracker.is_idle(start + Duration::from_secs(18)));
    }
}
