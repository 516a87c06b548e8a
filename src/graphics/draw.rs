use super::{blend::alpha_from_unit, Argb, Canvas, Pixel};
use crate::math::Point;

impl Canvas {
    /// Fills every pixel whose centre lies within `radius` of `center`,
    /// using the current colour and global alpha.
    ///
    /// Each covered pixel is blended exactly once, so translucent circles
    /// come out uniform.
    pub fn fill_circle(&mut self, center: Point, radius: f32) {
        if radius <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }

        let color = self.color.fade(alpha_from_unit(self.alpha));

        if color.alpha() == 0 {
            return;
        }

        let (w, h) = (self.width as f32, self.height as f32);
        let r2 = radius * radius;

        let y_start = (center.y - radius - 0.5).ceil().clamp(0.0, h);
        let y_end = (center.y + radius - 0.5).floor().clamp(-1.0, h - 1.0);

        let mut y = y_start;
        while y <= y_end {
            let dy = y + 0.5 - center.y;
            let half = (r2 - dy * dy).max(0.0).sqrt();

            let x_start = (center.x - half - 0.5).ceil().clamp(0.0, w);
            let x_end = (center.x + half - 0.5).floor().clamp(-1.0, w - 1.0);

            if x_start <= x_end {
                self.blend_span(y as usize, x_start as usize, x_end as usize, color);
            }

            y += 1.0;
        }
    }

    fn blend_span(&mut self, y: usize, xs: usize, xe: usize, c: Argb) {
        let row = y * self.width;

        let Some(span) = self.buffer.get_mut(row + xs..=row + xe) else {
            return;
        };

        for p in span {
            *p = p.mix(c);
        }
    }
}
