pub mod blend;
pub mod draw;

pub use blend::Argb;

pub(crate) trait Pixel: Copy + Clone + Sized + std::fmt::Debug {
    fn black() -> Self;
    fn trans() -> Self;

    fn mix(self, other: Self) -> Self;

    fn alpha(self) -> u8;
    fn fade(self, alpha: u8) -> Self;

    fn decompose(self) -> [u8; 4];
    fn compose(array: [u8; 4]) -> Self;
}

/// Immediate-mode drawing surface.
///
/// Pixels are stored with straight alpha on a transparent field and are
/// composited over `background` only when presented. The fill colour and
/// global alpha apply to every following draw call, like a 2D context.
pub struct Canvas {
    buffer: Vec<Argb>,
    width: usize,
    height: usize,

    color: Argb,
    alpha: f32,

    background: Argb,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            buffer: vec![Argb::trans(); w * h],
            width: w,
            height: h,

            color: Argb::black(),
            alpha: 1.0,

            background: crate::data::DEFAULT_BACKGROUND,
        }
    }

    pub fn color(&mut self, c: Argb) {
        self.color = c;
    }

    /// Sets the global alpha, clamped to [0, 1].
    pub fn alpha(&mut self, a: f32) {
        self.alpha = a.clamp(0.0, 1.0);
    }

    pub fn set_background(&mut self, bg: Argb) {
        self.background = bg;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// No pixels at all: one of the dimensions is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn clear(&mut self) {
        self.buffer.fill(Argb::trans());
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.buffer.clear();
        self.buffer.resize(w * h, Argb::trans());
        self.width = w;
        self.height = h;
    }

    #[cfg(test)]
    pub fn pixel_xy(&self, x: usize, y: usize) -> Option<Argb> {
        if x >= self.width {
            return None;
        }

        self.buffer.get(y * self.width + x).copied()
    }

    #[cfg(test)]
    pub fn is_blank(&self) -> bool {
        self.buffer.iter().all(|p| p.alpha() == 0)
    }

    /// Writes the canvas composited over the background into `dest`,
    /// a 0RGB buffer of the same dimensions.
    pub fn present_to(&self, dest: &mut [u32]) {
        if self.is_empty() {
            return;
        }

        self.buffer
            .iter()
            .zip(dest.iter_mut())
            .for_each(|(src, dst)| *dst = self.background.mix(*src) & 0x00_FF_FF_FF);
    }
}
