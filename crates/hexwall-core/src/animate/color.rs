use crate::color::Rgb;
use crate::easing::Easing;
use crate::grid::Grid;

/// In-place color lerp for one cell of the instanced color buffer.
///
/// Each `update` moves the running color toward `to` by `t` and writes it
/// back, so successive updates compound. `t >= 1` lands exactly on `to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorLerp {
    index: usize,
    current: Rgb,
    to: Rgb,
}

impl ColorLerp {
    pub fn new(index: usize, from: Rgb, to: Rgb) -> Self {
        Self {
            index,
            current: from,
            to,
        }
    }

    pub fn update(&mut self, t: f32, grid: &mut Grid) {
        let t = t.clamp(0.0, 1.0);
        self.current = if t >= 1.0 {
            self.to
        } else {
            self.current.lerp(self.to, t)
        };
        grid.set_color(self.index, self.current);
    }

    pub fn current(&self) -> Rgb {
        self.current
    }

    pub fn target(&self) -> Rgb {
        self.to
    }
}

/// Two-stage cell color: current -> random (intro), random -> base (outro).
#[derive(Clone, Copy, Debug)]
pub struct CellColorAnimation {
    index: usize,
    intro: ColorLerp,
    outro: ColorLerp,
    outro_easing: Easing,
    base: Rgb,
}

impl CellColorAnimation {
    pub fn new(index: usize, from: Rgb, random: Rgb, base: Rgb, outro_easing: Easing) -> Self {
        Self {
            index,
            intro: ColorLerp::new(index, from, random),
            outro: ColorLerp::new(index, random, base),
            outro_easing,
            base,
        }
    }

    /// `t` is intro progress in \[0, 1\].
    pub fn intro(&mut self, t: f32, grid: &mut Grid) {
        self.intro.update(t, grid);
    }

    /// `u` is linear outro progress in \[0, 1\]; the recipe's curve is applied here.
    pub fn outro(&mut self, u: f32, grid: &mut Grid) {
        let k = if u <= 0.0 {
            0.0
        } else {
            self.outro_easing.apply(u)
        };
        self.outro.update(k, grid);
    }

    /// Snap to the base color.
    pub fn finish(&mut self, grid: &mut Grid) {
        grid.set_color(self.index, self.base);
    }

    pub fn random_color(&self) -> Rgb {
        self.intro.target()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridLayout, HexGeometry};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid() -> Grid {
        let mut rng = StdRng::seed_from_u64(5);
        Grid::build(
            GridLayout::new(1, 3, 1.0),
            HexGeometry::new(0.9, 0.2),
            Rgb::from_hex(0x14242f),
            &mut rng,
        )
    }

    #[test]
    fn update_at_one_is_exact() {
        let mut g = grid();
        let to = Rgb::new(0.123_456_7, 0.765_432_1, 0.333_333_3);
        let mut lerp = ColorLerp::new(1, Rgb::new(0.9, 0.1, 0.7), to);
        lerp.update(0.37, &mut g);
        lerp.update(0.81, &mut g);
        lerp.update(1.0, &mut g);
        let got = g.color(1).unwrap();
        assert_eq!(got.r.to_bits(), to.r.to_bits());
        assert_eq!(got.g.to_bits(), to.g.to_bits());
        assert_eq!(got.b.to_bits(), to.b.to_bits());
    }

    #[test]
    fn update_clamps_overshoot() {
        let mut g = grid();
        let to = Rgb::new(0.2, 0.4, 0.6);
        let mut lerp = ColorLerp::new(0, Rgb::BLACK, to);
        lerp.update(3.5, &mut g);
        assert_eq!(g.color(0), Some(to));
    }

    #[test]
    fn updates_compound_toward_target() {
        let mut g = grid();
        let mut lerp = ColorLerp::new(2, Rgb::BLACK, Rgb::WHITE);
        lerp.update(0.5, &mut g);
        lerp.update(0.5, &mut g);
        assert!((g.color(2).unwrap().r - 0.75).abs() < 1e-6);
        assert!(g.take_dirty().colors);
    }
}
