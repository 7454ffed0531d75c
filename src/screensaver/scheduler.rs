/// Frame scheduling for the screensaver loop
///
/// The controller asks for one frame at a time and holds the only handle to
/// it. Whoever drives the UI asks the scheduler which frame is due and hands
/// the handle back to the controller; a cancelled handle never comes due.

use std::time::{Duration, Instant};

/// Identifies one scheduled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

pub trait FrameScheduler {
    /// Request the next frame
    fn schedule(&mut self) -> FrameHandle;

    /// Drop a pending frame; unknown or already-fired handles are ignored
    fn cancel(&mut self, handle: FrameHandle);

    /// Take the pending frame if it is due at `now`
    fn next_due(&mut self, now: Instant) -> Option<FrameHandle>;
}

/// Fixed-rate scheduler used by the terminal UI
#[derive(Debug)]
pub struct IntervalScheduler {
    period: Duration,
    next_id: u64,
    pending: Option<(FrameHandle, Instant)>,
    last_fired: Option<Instant>,
}

impl IntervalScheduler {
    pub fn new(frame_rate: u32) -> Self {
        let fps = frame_rate.clamp(1, 120);
        Self {
            period: Duration::from_secs(1) / fps,
            next_id: 0,
            pending: None,
            last_fired: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left until the pending frame is due; `None` when nothing is pending
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|(_, deadline)| deadline.saturating_duration_since(now))
    }
}

impl FrameScheduler for IntervalScheduler {
    fn schedule(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        // Pace from the previous frame so slow frames don't pile up
        let base = self.last_fired.unwrap_or_else(Instant::now);
        self.pending = Some((handle, base + self.period));
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if matches!(self.pending, Some((pending, _)) if pending == handle) {
            self.pending = None;
        }
    }

    fn next_due(&mut self, now: Instant) -> Option<FrameHandle> {
        match self.pending {
            Some((handle, deadline)) if now >= deadline => {
                self.pending = None;
                self.last_fired = Some(now);
                Some(handle)
            }
            _ => None,
        }
    }
}

/// Scheduler that fires whenever asked; lets tests single-step frames
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
    cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// How many pending frames were cancelled
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }

    fn next_due(&mut self, _now: Instant) -> Option<FrameHandle> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_fires_after_period() {
        let mut scheduler = IntervalScheduler::new(20);
        assert_eq!(scheduler.period(), Duration::from_millis(50));

        let start = Instant::now();
        let handle = scheduler.schedule();

        assert_eq!(scheduler.next_due(start), None);
        let later = start + Duration::from_millis(200);
        assert_eq!(scheduler.next_due(later), Some(handle));
        // Fired frames are consumed
        assert_eq!(scheduler.next_due(later), None);
        assert_eq!(scheduler.time_until_due(later), None);
    }

    #[test]
    fn test_interval_cancel() {
        let mut scheduler = IntervalScheduler::new(60);
        let handle = scheduler.schedule();
        scheduler.cancel(handle);
        scheduler.cancel(handle);

        let later = Instant::now() + Duration::from_secs(1);
        assert_eq!(scheduler.next_due(later), None);
    }

    #[test]
    fn test_stale_cancel_keeps_newer_frame() {
        let mut scheduler = ManualScheduler::new();
        let first = scheduler.schedule();
        let _ = scheduler.next_due(Instant::now());
        let second = scheduler.schedule();

        scheduler.cancel(first);
        assert!(scheduler.is_pending());
        assert_eq!(scheduler.cancelled(), 0);
        assert_eq!(scheduler.next_due(Instant::now()), Some(second));
    }

    #[test]
    fn test_frame_rate_is_clamped() {
        assert_eq!(IntervalScheduler::new(0).period(), Duration::from_secs(1));
        assert!(IntervalScheduler::new(10_000).period() >= Duration::from_secs(1) / 120);
    }
}
