//! Scheduling primitives the bubble engine needs from its host.
//!
//! Frames are one-shot: every frame callback must request the next one.
//! Intervals repeat until cleared. Handles identify a single request, and a
//! cleared or cancelled handle must never be delivered afterwards.

#[cfg(test)]
pub mod manual;
pub mod threads;

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

pub trait Scheduler {
    /// Asks for one callback at the next display refresh.
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Starts a repeating timer firing every `period`. `None` when the host
    /// could not start one; nothing will ever fire for it.
    fn set_interval(&mut self, period: Duration) -> Option<TimerHandle>;

    fn clear_interval(&mut self, handle: TimerHandle);
}

/// Hands out unique handles for one scheduler.
#[derive(Debug, Default)]
pub struct HandleCounter(u64);

impl HandleCounter {
    fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn frame(&mut self) -> FrameHandle {
        FrameHandle(self.next())
    }

    pub fn timer(&mut self) -> TimerHandle {
        TimerHandle(self.next())
    }
}
