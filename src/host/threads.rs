//! Helper threads for hosts with no timers of their own.
//!
//! Threads only report ticks through a sink closure; a sink returning
//! `false` (its receiver is gone) ends the thread.

use std::{
    collections::HashMap,
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, SyncSender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use fps_clock::FpsClock;
use tracing::error;

use super::TimerHandle;

struct Interval {
    /// Dropping it wakes and stops the thread.
    cancel: SyncSender<()>,
    thread: JoinHandle<()>,
}

/// Repeating timers, one thread each.
#[derive(Default)]
pub struct Intervals {
    timers: HashMap<TimerHandle, Interval>,
}

impl Intervals {
    /// Starts ticking `handle` every `period`. The handle only becomes
    /// active when its thread is running.
    pub fn start<F>(&mut self, handle: TimerHandle, period: Duration, tick: F) -> io::Result<()>
    where
        F: Fn(TimerHandle) -> bool + Send + 'static,
    {
        let (cancel, cancel_recv) = mpsc::sync_channel::<()>(1);

        let thread = thread::Builder::new()
            .name("interval".into())
            .spawn(move || run_interval(handle, period, cancel_recv, tick))?;

        self.timers.insert(handle, Interval { cancel, thread });
        Ok(())
    }

    /// Stops the timer and waits for its thread. Ticks it posted earlier
    /// are still in flight; `is_active` rejects them.
    pub fn clear(&mut self, handle: TimerHandle) {
        let Some(Interval { cancel, thread }) = self.timers.remove(&handle) else {
            return;
        };

        drop(cancel);

        if thread.join().is_err() {
            error!(?handle, "interval thread panicked");
        }
    }

    pub fn clear_all(&mut self) {
        let handles: Vec<TimerHandle> = self.timers.keys().copied().collect();

        for handle in handles {
            self.clear(handle);
        }
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }
}

fn run_interval<F>(handle: TimerHandle, period: Duration, cancel: Receiver<()>, tick: F)
where
    F: Fn(TimerHandle) -> bool,
{
    loop {
        match cancel.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => {
                if !tick(handle) {
                    break;
                }
            }
            _ => break,
        }
    }
}

/// Ticks once per refresh boundary, and only while a frame is wanted.
/// Parked otherwise.
pub struct FramePacer {
    wanted: Arc<AtomicBool>,
    exit: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl FramePacer {
    pub fn spawn<F>(fps: u32, tick: F) -> io::Result<Self>
    where
        F: Fn() -> bool + Send + 'static,
    {
        let wanted = Arc::new(AtomicBool::new(false));
        let exit = Arc::new(AtomicBool::new(false));

        let thread = {
            let wanted = Arc::clone(&wanted);
            let exit = Arc::clone(&exit);

            thread::Builder::new()
                .name("frame pacer".into())
                .spawn(move || {
                    let mut clock = FpsClock::new(fps.max(1));

                    while !exit.load(Ordering::Acquire) {
                        if !wanted.load(Ordering::Acquire) {
                            thread::park();
                            continue;
                        }

                        clock.tick();

                        if wanted.swap(false, Ordering::AcqRel) && !tick() {
                            break;
                        }
                    }
                })?
        };

        Ok(Self {
            wanted,
            exit,
            thread: Some(thread),
        })
    }

    pub fn want_frame(&self) {
        self.wanted.store(true, Ordering::Release);
        self.unpark();
    }

    pub fn cancel_frame(&self) {
        self.wanted.store(false, Ordering::Release);
    }

    /// Ends the thread and waits for it.
    pub fn stop(&mut self) {
        self.exit.store(true, Ordering::Release);
        self.unpark();

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("frame pacer thread panicked");
            }
        }
    }

    fn unpark(&self) {
        if let Some(thread) = self.thread.as_ref() {
            thread.thread().unpark();
        }
    }
}

impl Drop for FramePacer {
    fn drop(&mut self) {
        self.stop();
    }
}
