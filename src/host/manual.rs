use std::time::Duration;

use super::{FrameHandle, HandleCounter, Scheduler, TimerHandle};

/// Records requests instead of running them; tests fire callbacks by hand.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    handles: HandleCounter,
    pub frame: Option<FrameHandle>,
    pub timers: Vec<(TimerHandle, Duration)>,
    pub frames_requested: usize,
    pub frames_cancelled: usize,
    /// Refuse every new interval, like a host out of threads.
    pub fail_intervals: bool,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the pending frame, as a host does when it delivers it.
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        self.frame.take()
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    pub fn only_timer(&self) -> TimerHandle {
        assert_eq!(self.timers.len(), 1, "expected exactly one timer");
        self.timers[0].0
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|&(h, _)| h == handle)
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = self.handles.frame();
        self.frame = Some(handle);
        self.frames_requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.frame == Some(handle) {
            self.frame = None;
        }
        self.frames_cancelled += 1;
    }

    fn set_interval(&mut self, period: Duration) -> Option<TimerHandle> {
        if self.fail_intervals {
            return None;
        }

        let handle = self.handles.timer();
        self.timers.push((handle, period));
        Some(handle)
    }

    fn clear_interval(&mut self, handle: TimerHandle) {
        self.timers.retain(|&(h, _)| h != handle);
    }
}
