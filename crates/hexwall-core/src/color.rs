//! Linear RGB color with the HSL helpers the cell and light animators need.

use crate::constants::{
    BASE_COLOR_LIGHTNESS_SCALE, RNG_HUE_MIN, RNG_HUE_SPAN, RNG_LIGHTNESS_MIN, RNG_LIGHTNESS_SPAN,
    RNG_SATURATION,
};
use rand::Rng;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_hex(self) -> u32 {
        let q = |c: f32| ((c.clamp(0.0, 1.0) * 255.0).round() as u32) & 0xff;
        (q(self.r) << 16) | (q(self.g) << 8) | q(self.b)
    }

    /// Build from hue/saturation/lightness, each in \[0, 1\]. Hue wraps.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            return Self::new(l, l, l);
        }
        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;
        Self {
            r: hue_to_rgb(q, p, h + 1.0 / 3.0),
            g: hue_to_rgb(q, p, h),
            b: hue_to_rgb(q, p, h - 1.0 / 3.0),
        }
    }

    /// Returns `(hue, saturation, lightness)`.
    pub fn to_hsl(self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let lightness = (min + max) / 2.0;
        if min == max {
            return (0.0, 0.0, lightness);
        }
        let delta = max - min;
        let saturation = if lightness <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };
        let hue = if max == self.r {
            (self.g - self.b) / delta + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };
        // rounding in from_hsl can leave red a hair below a full turn
        let hue = (hue / 6.0).rem_euclid(1.0);
        let hue = if 1.0 - hue < 1e-5 { 0.0 } else { hue };
        (hue, saturation, lightness)
    }

    #[inline]
    pub fn lerp(self, to: Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (to.r - self.r) * t,
            g: self.g + (to.g - self.g) * t,
            b: self.b + (to.b - self.b) * t,
        }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * 6.0 * (2.0 / 3.0 - t);
    }
    p
}

/// Random intro color: hue in \[0.5, 0.8), saturation 0.95, lightness in \[0.65, 0.95).
pub fn random_cell_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    let h = RNG_HUE_MIN + rng.gen::<f32>() * RNG_HUE_SPAN;
    let l = RNG_LIGHTNESS_MIN + rng.gen::<f32>() * RNG_LIGHTNESS_SPAN;
    Rgb::from_hsl(h, RNG_SATURATION, l)
}

/// Tiles sit on a dark version of whatever color the host picks.
pub fn darkened_base_color(color: Rgb) -> Rgb {
    let (h, s, l) = color.to_hsl();
    Rgb::from_hsl(h, s, l * BASE_COLOR_LIGHTNESS_SCALE)
}
