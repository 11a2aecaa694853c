use crate::easing::Easing;
use crate::grid::CellPose;
use crate::phase::Phase;
use glam::Vec3;
use std::f32::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// Continuous pointer/touch movement; deduplicated per cell.
    Hover,
    /// Discrete press; may retrigger the same cell and toggles its freeze latch.
    Click,
}

/// Where the intro phase moves a cell, as a function of its phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetPose {
    /// Rise toward the camera and stretch along z.
    Lift { depth_gain: f32, scale_gain: f32 },
    /// Half turn about x (phase x >= 0) or y, settling at a phase-dependent z.
    Flip { z_gain: f32 },
}

/// Timing, easing and target for one kind of cell animation.
///
/// Lengths are in animation seconds; the animation clock runs at the
/// effective animation speed, so real time is `len / speed`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationRecipe {
    pub intro_base: f32,
    pub intro_per_depth: f32,
    pub outro_base: f32,
    pub outro_per_depth: f32,
    pub intro_easing: Easing,
    pub outro_easing: Easing,
    pub color_outro_easing: Easing,
    pub target: TargetPose,
}

impl AnimationRecipe {
    pub const HOVER: AnimationRecipe = AnimationRecipe {
        intro_base: 6.0,
        intro_per_depth: 0.25,
        outro_base: 4.0,
        outro_per_depth: 0.125,
        intro_easing: Easing::ExponentialOut,
        outro_easing: Easing::ExponentialIn,
        color_outro_easing: Easing::SteepExponentialIn,
        target: TargetPose::Lift {
            depth_gain: 0.0625,
            scale_gain: 0.0025,
        },
    };

    pub const CLICK: AnimationRecipe = AnimationRecipe {
        intro_base: 4.0,
        intro_per_depth: 0.0,
        outro_base: 2.0,
        outro_per_depth: 0.0,
        intro_easing: Easing::BounceOut,
        outro_easing: Easing::Linear,
        color_outro_easing: Easing::Linear,
        target: TargetPose::Flip { z_gain: 0.00625 },
    };

    pub fn for_kind(kind: TriggerKind) -> Self {
        match kind {
            TriggerKind::Hover => Self::HOVER,
            TriggerKind::Click => Self::CLICK,
        }
    }

    #[inline]
    pub fn intro_len(&self, phase: &Phase) -> f32 {
        self.intro_base + phase.depth * self.intro_per_depth
    }

    #[inline]
    pub fn outro_len(&self, phase: &Phase) -> f32 {
        self.outro_base + phase.depth * self.outro_per_depth
    }

    /// Intro end pose for a cell resting at `rest`.
    pub fn target_pose(&self, rest: &CellPose, phase: &Phase) -> CellPose {
        match self.target {
            TargetPose::Lift {
                depth_gain,
                scale_gain,
            } => {
                let delta = phase.depth * scale_gain;
                CellPose {
                    position: Vec3::new(
                        rest.position.x,
                        rest.position.y,
                        phase.depth * depth_gain + delta,
                    ),
                    scale: Vec3::new(1.0, 1.0, 1.0 + delta),
                    rotation: Vec3::ZERO,
                }
            }
            TargetPose::Flip { z_gain } => {
                let about_x = phase.x >= 0.0;
                CellPose {
                    position: Vec3::new(
                        rest.position.x,
                        rest.position.y,
                        phase.z * phase.depth * z_gain,
                    ),
                    scale: Vec3::ONE,
                    rotation: Vec3::new(
                        if about_x { PI } else { 0.0 },
                        if about_x { 0.0 } else { PI },
                        0.0,
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(x: f32, depth: f32) -> Phase {
        Phase {
            x,
            y: 0.0,
            z: 1.5,
            depth,
        }
    }

    #[test]
    fn hover_lifts_by_depth() {
        let rest = CellPose::rest(Vec3::new(2.0, 3.0, 0.0));
        let p = phase(0.0, 4.0);
        let t = AnimationRecipe::HOVER.target_pose(&rest, &p);
        assert!((t.scale.z - 1.01).abs() < 1e-6);
        assert!((t.position.z - (0.25 + 0.01)).abs() < 1e-6);
        assert_eq!((t.position.x, t.position.y), (2.0, 3.0));
        assert!((AnimationRecipe::HOVER.intro_len(&p) - 7.0).abs() < 1e-6);
        assert!((AnimationRecipe::HOVER.outro_len(&p) - 4.5).abs() < 1e-6);
    }

    #[test]
    fn click_flip_axis_follows_phase_sign() {
        let rest = CellPose::rest(Vec3::ZERO);
        let a = AnimationRecipe::CLICK.target_pose(&rest, &phase(0.5, 2.0));
        let b = AnimationRecipe::CLICK.target_pose(&rest, &phase(-0.5, 2.0));
        assert_eq!(a.rotation, Vec3::new(PI, 0.0, 0.0));
        assert_eq!(b.rotation, Vec3::new(0.0, PI, 0.0));
        assert!((a.position.z - 1.5 * 2.0 * 0.00625).abs() < 1e-7);
    }
}
