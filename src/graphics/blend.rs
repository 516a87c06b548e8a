pub type Argb = u32;

use super::Pixel;
use crate::error::{Error, Result};

/// `a * b / 255`, rounded.
pub fn u8_mul(a: u8, b: u8) -> u8 {
    let t = a as u16 * b as u16 + 128;
    ((t + (t >> 8)) >> 8) as u8
}

/// Converts a unit opacity into an alpha byte.
pub fn alpha_from_unit(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Source-over compositing of `c2` on top of `c1`.
pub fn composite_u32(c1: Argb, c2: Argb) -> Argb {
    let [a1, r1, g1, b1] = c1.decompose();
    let [a2, r2, g2, b2] = c2.decompose();

    let (a, a3) = {
        let a1 = a1 as u16;
        let a2 = a2 as u16;

        let a3 = (a1 * (255 - a2)) / 255;

        (a2 + a3, a3)
    };

    if a == 0 {
        return Argb::compose([0, 0, 0, 0]);
    }

    let composite_channel = |c1: u8, c2: u8| -> u8 {
        let c1 = c1 as u16;
        let c2 = c2 as u16;
        let a2 = a2 as u16;

        ((c2 * a2 + c1 * a3) / a) as u8
    };

    Argb::compose([
        a as u8,
        composite_channel(r1, r2),
        composite_channel(g1, g2),
        composite_channel(b1, b2),
    ])
}

/// Parses `#rrggbb` (or `rrggbb`) into an opaque colour.
pub fn parse_hex(s: &str) -> Result<Argb> {
    let hex = s.trim().trim_start_matches('#');

    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidColor(s.to_string()));
    }

    u32::from_str_radix(hex, 16)
        .map(|rgb| Argb::black() | rgb)
        .map_err(|_| Error::InvalidColor(s.to_string()))
}

impl Pixel for Argb {
    fn black() -> Argb {
        0xFF_00_00_00
    }

    fn trans() -> Argb {
        0x0
    }

    fn alpha(self) -> u8 {
        self.decompose()[0]
    }

    fn fade(self, alpha: u8) -> Argb {
        let [aa, r, g, b] = self.decompose();
        Argb::compose([u8_mul(aa, alpha), r, g, b])
    }

    fn decompose(self) -> [u8; 4] {
        self.to_be_bytes()
    }

    fn compose(array: [u8; 4]) -> Argb {
        Argb::from_be_bytes(array)
    }

    fn mix(self, other: Argb) -> Argb {
        composite_u32(self, other)
    }
}
