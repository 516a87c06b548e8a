pub mod args;
pub mod log;

use std::time::Duration;

use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use crate::{
    bubbles::Bubbles,
    graphics::Argb,
    math::interpolate,
};

pub const DEFAULT_FILL: Argb = 0xFF_4D_D6_FD;
pub const DEFAULT_BACKGROUND: Argb = 0xFF_24_24_24;

pub const DEFAULT_SPEED: Range = Range { min: 4.0, max: 8.0 };
pub const DEFAULT_X_DEVIATION: i32 = 2;
pub const DEFAULT_SPAWN_PERIOD: Duration = Duration::from_millis(70);
pub const DEFAULT_LIFETIME: Duration = Duration::from_millis(1000);

/// `max` is replaced by `round(sqrt(width))` on every resize.
pub const DEFAULT_SIZE: Range = Range { min: 1.8, max: 40.0 };

/// Used when the monitor refresh rate cannot be queried.
pub const FALLBACK_MILLI_HZ: u32 = 60 * 1000;
pub const CAP_MILLI_HZ: u32 = 240 * 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    /// Linear position between `min` and `max` at progress `t`.
    pub fn at(&self, t: f32) -> f32 {
        interpolate::linearf(self.min, self.max, t)
    }
}

/// Fixed bubble parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub fill: Argb,
    pub speed: Range,
    pub x_deviation: i32,
    pub spawn_period: Duration,
    pub lifetime: Duration,
    pub size: Range,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fill: DEFAULT_FILL,
            speed: DEFAULT_SPEED,
            x_deviation: DEFAULT_X_DEVIATION,
            spawn_period: DEFAULT_SPAWN_PERIOD,
            lifetime: DEFAULT_LIFETIME,
            size: DEFAULT_SIZE,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum RefreshRateMode {
    Sync,
    Specified,
}

/// Main program struct: one bubble engine plus the window options.
pub(crate) struct Program {
    pub bubbles: Bubbles<StdRng>,

    resizable: bool,
    size: (u16, u16),

    milli_hz: u32,
    refresh_rate_mode: RefreshRateMode,
}

impl Program {
    pub fn new(config: Config, size: (u16, u16), background: Argb) -> Self {
        let mut bubbles = Bubbles::new(
            config,
            size.0 as usize,
            size.1 as usize,
            StdRng::from_entropy(),
        );

        bubbles.set_background(background);

        Self {
            bubbles,
            resizable: false,
            size,
            milli_hz: FALLBACK_MILLI_HZ,
            refresh_rate_mode: RefreshRateMode::Sync,
        }
    }

    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    pub fn set_resizable(&mut self, b: bool) {
        self.resizable = b;
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn get_rr_mode(&self) -> RefreshRateMode {
        self.refresh_rate_mode
    }

    pub fn get_milli_hz(&self) -> u32 {
        self.milli_hz
    }

    /// Whole frames per second for the frame pacer, at least 1.
    pub fn fps(&self) -> u32 {
        ((self.milli_hz + 500) / 1000).max(1)
    }

    pub fn change_fps_frac(&mut self, milli_hz: u32) {
        self.milli_hz = milli_hz.clamp(1000, CAP_MILLI_HZ);
    }

    pub fn lock_fps(&mut self, milli_hz: u32) {
        self.change_fps_frac(milli_hz);
        self.refresh_rate_mode = RefreshRateMode::Specified;
    }

    pub fn print_startup_info(&self) {
        let (w, h) = self.size;

        info!(
            width = w,
            height = h,
            refresh_rate = self.milli_hz as f32 / 1000.0,
            mode = ?self.refresh_rate_mode,
            "starting mousebubbles"
        );

        if self.resizable {
            info!("window is resizable, bubble size follows the window width");
        }
    }
}
