mod vec2;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

/// A position on the drawing surface, in pixels.
pub type Point = Vec2<f32>;

impl<T> Vec2<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

pub mod interpolate {
    pub fn linearf(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}
