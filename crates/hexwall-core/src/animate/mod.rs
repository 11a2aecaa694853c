//! Per-cell animation.
//!
//! Each cell owns at most one live animation: a transform tween (intro then
//! outro) and a color lerp pair that share the same animation clock. Both
//! hover and click go through the same machinery; only the `AnimationRecipe`
//! differs.

mod color;
mod recipe;
mod transform;

pub use color::{CellColorAnimation, ColorLerp};
pub use recipe::{AnimationRecipe, TargetPose, TriggerKind};
pub use transform::{CellAnimator, CellTween, TriggerOptions, TweenPhase, TweenStatus};

/// Speed multiplier actually applied to animation clocks. A configured speed
/// of zero runs at the default rate instead of pausing.
#[inline]
pub fn effective_speed(speed: f32) -> f32 {
    if speed == 0.0 {
        1.0
    } else {
        speed
    }
}
