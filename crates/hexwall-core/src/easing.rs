/// Easing curves mapping linear progress in \[0, 1\] to eased progress.
///
/// Every curve maps 0 to 0 and 1 to 1; animators still snap to exact end
/// poses on completion so callers never rely on that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    #[default]
    Linear,
    ExponentialIn,
    ExponentialOut,
    /// `4096^(t-1)`: stays near zero for most of the window, then rushes in.
    SteepExponentialIn,
    BounceOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::ExponentialIn => {
                if t == 0.0 {
                    0.0
                } else {
                    1024f32.powf(t - 1.0)
                }
            }
            Easing::ExponentialOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Easing::SteepExponentialIn => {
                if t == 0.0 {
                    0.0
                } else {
                    4096f32.powf(t - 1.0)
                }
            }
            Easing::BounceOut => bounce_out(t),
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::ExponentialIn,
        Easing::ExponentialOut,
        Easing::SteepExponentialIn,
        Easing::BounceOut,
    ];

    #[test]
    fn endpoints_are_pinned() {
        for e in ALL {
            assert_eq!(e.apply(0.0), 0.0, "{e:?} at 0");
            assert!((e.apply(1.0) - 1.0).abs() < 1e-5, "{e:?} at 1");
        }
    }

    #[test]
    fn input_is_clamped() {
        for e in ALL {
            assert_eq!(e.apply(-3.0), e.apply(0.0));
            assert_eq!(e.apply(7.0), e.apply(1.0));
        }
    }

    #[test]
    fn exponential_curves_are_monotonic() {
        for e in [
            Easing::ExponentialIn,
            Easing::ExponentialOut,
            Easing::SteepExponentialIn,
        ] {
            let mut prev = e.apply(0.0);
            for i in 1..=100 {
                let v = e.apply(i as f32 / 100.0);
                assert!(v >= prev, "{e:?} decreased at step {i}");
                prev = v;
            }
        }
    }
}
