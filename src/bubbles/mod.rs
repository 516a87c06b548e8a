pub mod particle;
pub mod render;
pub mod store;

use std::time::Instant;

use rand::Rng;
use tracing::{debug, trace, warn};

use crate::{
    data::Config,
    graphics::{Argb, Canvas},
    host::{FrameHandle, Scheduler, TimerHandle},
    math::Point,
};

use particle::Particle;
use store::ParticleStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Idle,
    /// Pointer is inside the container: spawning and animating.
    Running,
    /// Pointer left: animating until the store drains.
    Stopping,
}

/// One bubble effect bound to one surface.
pub struct Bubbles<R: Rng> {
    config: Config,
    canvas: Canvas,

    /// Container position in page coordinates.
    offset: Point,
    pointer: Point,

    store: ParticleStore,
    state: AnimationState,

    frame: Option<FrameHandle>,
    spawn_timer: Option<TimerHandle>,
    drain_timer: Option<TimerHandle>,

    rng: R,
}

impl<R: Rng> Bubbles<R> {
    pub fn new(config: Config, width: usize, height: usize, rng: R) -> Self {
        let mut bubbles = Self {
            config,
            canvas: Canvas::new(width, height),
            offset: Point::default(),
            pointer: Point::default(),
            store: ParticleStore::new(),
            state: AnimationState::Idle,
            frame: None,
            spawn_timer: None,
            drain_timer: None,
            rng,
        };

        bubbles.resize(width, height);
        bubbles
    }

    #[cfg(test)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn particles(&self) -> &ParticleStore {
        &self.store
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn set_background(&mut self, bg: Argb) {
        self.canvas.set_background(bg);
    }

    #[cfg(test)]
    pub fn set_container_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    /// Matches the surface to the container and derives the maximum bubble
    /// size from the new width.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.canvas.resize(width, height);
        self.config.size.max = (width as f32).sqrt().round();

        debug!(width, height, max_size = self.config.size.max, "surface resized");
    }

    /// Records the pointer position, given in page coordinates.
    pub fn pointer_moved(&mut self, page: Point) {
        self.pointer = page - self.offset;
    }

    pub fn pointer_entered(&mut self, host: &mut impl Scheduler) {
        match self.state {
            AnimationState::Running => return,

            AnimationState::Idle => {
                if let Some(frame) = self.frame.take() {
                    host.cancel_frame(frame);
                }
                self.frame = Some(host.request_frame());
            }

            // The frame loop is still going, pick it back up.
            AnimationState::Stopping => {
                if let Some(timer) = self.drain_timer.take() {
                    host.clear_interval(timer);
                }
                if self.frame.is_none() {
                    self.frame = Some(host.request_frame());
                }
            }
        }

        self.spawn_timer = host.set_interval(self.config.spawn_period);
        if self.spawn_timer.is_none() {
            warn!("no spawn timer, bubbles will not appear");
        }
        self.state = AnimationState::Running;

        debug!(live = self.store.len(), "animation running");
    }

    pub fn pointer_left(&mut self, host: &mut impl Scheduler) {
        if self.state != AnimationState::Running {
            return;
        }

        self.canvas.clear();

        if let Some(timer) = self.spawn_timer.take() {
            host.clear_interval(timer);
        }

        // Without a drain poll the frame loop checks for the empty store.
        self.drain_timer = host.set_interval(self.config.spawn_period);
        self.state = AnimationState::Stopping;

        debug!(live = self.store.len(), "animation stopping");
    }

    /// Dispatches an interval tick. Ticks from cleared timers are ignored.
    pub fn on_timer(&mut self, timer: TimerHandle, now: Instant, host: &mut impl Scheduler) {
        if self.spawn_timer == Some(timer) {
            self.create_particle(now);
        } else if self.drain_timer == Some(timer) {
            self.check_drained(host);
        } else {
            trace!(?timer, "stale timer tick");
        }
    }

    pub fn create_particle(&mut self, now: Instant) {
        if self.state != AnimationState::Running {
            return;
        }

        let d = self.config.x_deviation.abs();
        let drift = self.rng.gen_range(-d..=d);

        self.store
            .push(Particle::new(now, self.pointer, drift, &self.config));
    }

    fn check_drained(&mut self, host: &mut impl Scheduler) {
        if self.state != AnimationState::Stopping || !self.store.is_empty() {
            return;
        }

        if let Some(frame) = self.frame.take() {
            host.cancel_frame(frame);
        }

        if let Some(timer) = self.drain_timer.take() {
            host.clear_interval(timer);
        }

        self.canvas.clear();
        self.state = AnimationState::Idle;

        debug!("animation idle");
    }

    /// Per-frame update: advance or expire every particle, redraw, and ask
    /// for the next frame.
    pub fn on_frame(&mut self, frame: FrameHandle, now: Instant, host: &mut impl Scheduler) {
        if self.frame != Some(frame) {
            trace!(?frame, "stale frame");
            return;
        }

        let config = &self.config;
        self.store.sweep(|p| p.update(now, config));

        render::draw(&self.store, &mut self.canvas);

        if self.state == AnimationState::Stopping
            && self.drain_timer.is_none()
            && self.store.is_empty()
        {
            self.check_drained(host);
            return;
        }

        self.frame = Some(host.request_frame());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::Range, graphics::Pixel, host::manual::ManualScheduler};
    use rand::{rngs::StdRng, SeedableRng};
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn bubbles(width: usize, height: usize) -> Bubbles<StdRng> {
        Bubbles::new(Config::default(), width, height, StdRng::seed_from_u64(7))
    }

    /// Delivers the pending frame, like a display refresh would.
    fn frame(b: &mut Bubbles<StdRng>, host: &mut ManualScheduler, now: Instant) {
        let f = host.take_frame().expect("no frame pending");
        b.on_frame(f, now, host);
    }

    #[test]
    fn resize_derives_max_size() {
        let mut b = bubbles(400, 300);
        assert_eq!(b.config().size.max, 20.0);
        assert_eq!((b.canvas().width(), b.canvas().height()), (400, 300));

        b.resize(640, 480);
        assert_eq!(b.config().size.max, 25.0);

        b.resize(0, 0);
        assert_eq!(b.config().size.max, 0.0);
        assert!(b.canvas().is_blank());
    }

    #[test]
    fn pointer_is_relative_to_container() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();

        b.set_container_offset(Point::new(20.0, 30.0));
        b.pointer_entered(&mut host);
        b.pointer_moved(Point::new(50.0, 45.0));
        b.on_timer(host.only_timer(), Instant::now(), &mut host);

        let p = b.particles().iter().next().unwrap();
        assert_eq!(p.position, Point::new(30.0, 15.0));
    }

    #[test]
    fn enter_starts_frame_and_spawn_timer() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();

        b.pointer_entered(&mut host);

        assert_eq!(b.state(), AnimationState::Running);
        assert!(host.frame.is_some());
        assert_eq!(host.timers, [(host.only_timer(), ms(70))]);
    }

    #[test]
    fn repeated_enter_does_not_stack_timers() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();

        b.pointer_entered(&mut host);
        b.pointer_entered(&mut host);
        b.pointer_entered(&mut host);

        assert_eq!(host.timer_count(), 1);
        assert_eq!(host.frames_requested, 1);
    }

    #[test]
    fn spawn_ticks_create_particles_at_pointer() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();
        let start = Instant::now();

        b.pointer_entered(&mut host);
        let spawn = host.only_timer();

        for i in 0..10 {
            b.pointer_moved(Point::new(i as f32, 50.0));
            b.on_timer(spawn, start + ms(70 * i), &mut host);
        }

        assert_eq!(b.particles().len(), 10);

        for (i, p) in b.particles().iter().enumerate() {
            assert_eq!(p.position, Point::new(i as f32, 50.0));
            assert!((-2..=2).contains(&p.horizontal_drift));
            assert_eq!(p.size, 10.0);
            assert_eq!(p.opacity, 1.0);
        }
    }

    #[test]
    fn drift_covers_the_whole_range() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();
        let now = Instant::now();

        b.pointer_entered(&mut host);
        let spawn = host.only_timer();

        for _ in 0..500 {
            b.on_timer(spawn, now, &mut host);
        }

        let mut seen: Vec<i32> = b.particles().iter().map(|p| p.horizontal_drift).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, [-2, -1, 0, 1, 2]);
    }

    #[test]
    fn spawning_needs_running_state() {
        let mut b = bubbles(100, 100);
        b.create_particle(Instant::now());
        assert!(b.particles().is_empty());
    }

    #[test]
    fn frame_updates_renders_and_reschedules() {
        let mut b = Bubbles::new(
            Config {
                size: Range { min: 1.8, max: 10.0 },
                ..Config::default()
            },
            200,
            200,
            StdRng::seed_from_u64(1),
        );
        let mut host = ManualScheduler::new();
        let start = Instant::now();

        b.pointer_entered(&mut host);
        b.pointer_moved(Point::new(100.0, 150.0));
        b.on_timer(host.only_timer(), start, &mut host);

        // The resize in `new` sets the max from the width.
        assert_eq!(b.config().size.max, 14.0);

        frame(&mut b, &mut host, start + ms(500));

        let p = b.particles().iter().next().unwrap();
        assert!((p.size - 7.9).abs() < 1e-4, "{}", p.size);
        assert_eq!(p.opacity, 1.0);
        assert!((p.position.y - 144.0).abs() < 1e-4);

        let (x, y) = (p.position.x as usize, p.position.y as usize);
        assert!(b.canvas().pixel_xy(x, y).is_some_and(|px| px.alpha() > 0));

        assert!(host.frame.is_some());
    }

    #[test]
    fn expired_particles_are_never_drawn() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();
        let start = Instant::now();

        b.pointer_entered(&mut host);
        b.pointer_moved(Point::new(50.0, 50.0));
        b.on_timer(host.only_timer(), start, &mut host);

        frame(&mut b, &mut host, start + ms(999));
        assert_eq!(b.particles().len(), 1);

        frame(&mut b, &mut host, start + ms(1000));
        assert!(b.particles().is_empty());
        assert!(b.canvas().is_blank());
    }

    #[test]
    fn stale_frames_and_timers_are_ignored() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();
        let now = Instant::now();

        b.pointer_entered(&mut host);
        let spawn = host.only_timer();
        let old_frame = host.take_frame().unwrap();
        b.on_frame(old_frame, now, &mut host);

        // Delivering the same frame twice does nothing.
        let requested = host.frames_requested;
        b.on_frame(old_frame, now, &mut host);
        assert_eq!(host.frames_requested, requested);

        b.pointer_left(&mut host);
        assert!(!host.is_active(spawn));

        // A spawn tick already queued when the timer was cleared.
        b.on_timer(spawn, now, &mut host);
        assert!(b.particles().is_empty());
    }

    #[test]
    fn leave_stops_spawning_and_clears_surface() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();
        let start = Instant::now();

        b.pointer_entered(&mut host);
        b.pointer_moved(Point::new(50.0, 50.0));
        b.on_timer(host.only_timer(), start, &mut host);
        frame(&mut b, &mut host, start + ms(300));
        assert!(!b.canvas().is_blank());

        b.pointer_left(&mut host);

        assert_eq!(b.state(), AnimationState::Stopping);
        assert!(b.canvas().is_blank());
        // Only the drain poll remains; the frame loop keeps going.
        assert_eq!(host.timer_count(), 1);
        assert!(host.frame.is_some());
        assert_eq!(host.frames_cancelled, 0);
    }

    #[test]
    fn full_hover_cycle_returns_to_idle() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();
        let start = Instant::now();

        b.pointer_entered(&mut host);
        b.pointer_moved(Point::new(50.0, 80.0));
        let spawn = host.only_timer();

        for i in 1..=3 {
            b.on_timer(spawn, start + ms(70 * i), &mut host);
        }
        assert_eq!(b.particles().len(), 3);

        frame(&mut b, &mut host, start + ms(250));

        b.pointer_left(&mut host);
        let drain = host.only_timer();
        assert_ne!(drain, spawn);

        // Still draining: the poll leaves everything running.
        b.on_timer(drain, start + ms(300), &mut host);
        assert_eq!(b.state(), AnimationState::Stopping);
        assert_eq!(b.particles().len(), 3);

        frame(&mut b, &mut host, start + ms(600));
        assert_eq!(b.particles().len(), 3);

        frame(&mut b, &mut host, start + ms(1300));
        assert!(b.particles().is_empty());

        b.on_timer(drain, start + ms(1310), &mut host);

        assert_eq!(b.state(), AnimationState::Idle);
        assert!(b.canvas().is_blank());
        assert!(host.frame.is_none());
        assert_eq!(host.timer_count(), 0);
    }

    #[test]
    fn reenter_while_stopping_reuses_frame_loop() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();
        let start = Instant::now();

        b.pointer_entered(&mut host);
        b.on_timer(host.only_timer(), start, &mut host);
        b.pointer_left(&mut host);
        let drain = host.only_timer();

        let requested = host.frames_requested;
        b.pointer_entered(&mut host);

        assert_eq!(b.state(), AnimationState::Running);
        assert_eq!(host.frames_requested, requested);
        assert_eq!(host.frames_cancelled, 0);
        assert!(!host.is_active(drain));
        assert_eq!(host.timer_count(), 1);

        // Everything expires, then a drain tick that was already queued
        // arrives: nothing stops.
        frame(&mut b, &mut host, start + ms(2000));
        assert!(b.particles().is_empty());

        b.on_timer(drain, start + ms(2010), &mut host);
        assert_eq!(b.state(), AnimationState::Running);
        assert!(host.frame.is_some());

        b.on_timer(host.only_timer(), start + ms(2070), &mut host);
        assert_eq!(b.particles().len(), 1);
    }

    #[test]
    fn drains_from_the_frame_loop_without_a_poll_timer() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();
        let start = Instant::now();

        b.pointer_entered(&mut host);
        b.on_timer(host.only_timer(), start, &mut host);

        host.fail_intervals = true;
        b.pointer_left(&mut host);
        assert_eq!(b.state(), AnimationState::Stopping);
        assert_eq!(host.timer_count(), 0);

        frame(&mut b, &mut host, start + ms(500));
        assert_eq!(b.state(), AnimationState::Stopping);
        assert!(host.frame.is_some());

        frame(&mut b, &mut host, start + ms(1000));
        assert_eq!(b.state(), AnimationState::Idle);
        assert!(b.canvas().is_blank());
        assert!(host.frame.is_none());

        // The next hover starts from scratch.
        host.fail_intervals = false;
        b.pointer_entered(&mut host);
        assert_eq!(b.state(), AnimationState::Running);
        assert!(host.frame.is_some());
        assert_eq!(host.timer_count(), 1);
    }

    #[test]
    fn enter_without_a_spawn_timer_still_animates() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();
        host.fail_intervals = true;

        b.pointer_entered(&mut host);
        assert_eq!(b.state(), AnimationState::Running);
        assert!(host.frame.is_some());

        frame(&mut b, &mut host, Instant::now());
        assert!(host.frame.is_some());
        assert!(b.particles().is_empty());
    }

    #[test]
    fn leave_while_idle_is_ignored() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();

        b.pointer_left(&mut host);

        assert_eq!(b.state(), AnimationState::Idle);
        assert_eq!(host.timer_count(), 0);
    }

    #[test]
    fn live_particles_follow_a_resize() {
        let mut b = bubbles(100, 100);
        let mut host = ManualScheduler::new();
        let start = Instant::now();

        b.pointer_entered(&mut host);
        b.on_timer(host.only_timer(), start, &mut host);
        assert_eq!(b.particles().iter().next().unwrap().size, 10.0);

        b.resize(400, 100);
        frame(&mut b, &mut host, start + ms(500));

        let size = b.particles().iter().next().unwrap().size;
        assert!((size - 10.9).abs() < 1e-4, "{size}");
    }

    #[test]
    fn zero_sized_surface_still_animates() {
        let mut b = bubbles(0, 0);
        let mut host = ManualScheduler::new();
        let start = Instant::now();

        b.pointer_entered(&mut host);
        b.on_timer(host.only_timer(), start, &mut host);
        frame(&mut b, &mut host, start + ms(100));

        assert_eq!(b.particles().len(), 1);
        assert!(b.canvas().is_blank());
    }
}
