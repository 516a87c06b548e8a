use std::time::{Duration, Instant};

use crate::{
    data::Config,
    graphics::Argb,
    math::{Point, Vec2},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub created_at: Instant,
    pub position: Point,
    /// Subtracted from `position.x` on every frame.
    pub horizontal_drift: i32,
    pub fill: Argb,
    pub size: f32,
    pub opacity: f32,
}

impl Particle {
    pub fn new(created_at: Instant, position: Point, horizontal_drift: i32, config: &Config) -> Self {
        Self {
            created_at,
            position,
            horizontal_drift,
            fill: config.fill,
            size: config.size.max,
            opacity: 1.0,
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Advances the particle by one frame. Returns `false` once it has
    /// outlived `config.lifetime`, leaving it untouched.
    pub fn update(&mut self, now: Instant, config: &Config) -> bool {
        let elapsed = self.elapsed(now);

        if elapsed >= config.lifetime {
            return false;
        }

        let t = progress(elapsed, config.lifetime);
        let velocity = config.speed.at(t);

        self.size = config.size.at(t);
        self.opacity = opacity(elapsed, config.lifetime);
        self.position -= Vec2::new(self.horizontal_drift as f32, velocity);

        true
    }
}

/// Fraction of the lifetime that has passed, in [0, 1).
pub fn progress(elapsed: Duration, lifetime: Duration) -> f32 {
    if lifetime.is_zero() {
        return 1.0;
    }

    elapsed.as_secs_f32() / lifetime.as_secs_f32()
}

/// Triangular envelope: rises to 1 at half the lifetime, back to 0 at the
/// end. Rounded to three decimals.
pub fn opacity(elapsed: Duration, lifetime: Duration) -> f32 {
    let mut o = 2.0 * progress(elapsed, lifetime);

    if o > 1.0 {
        o = 1.0 - (o - 1.0);
    }

    ((o * 1000.0).round() / 1000.0).clamp(0.0, 1.0)
}
