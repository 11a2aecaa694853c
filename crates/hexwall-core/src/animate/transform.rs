use super::color::CellColorAnimation;
use super::effective_speed;
use super::recipe::{AnimationRecipe, TriggerKind};
use crate::color::{random_cell_color, Rgb};
use crate::grid::{CellPose, Grid};
use crate::phase::Phase;
use crate::schedule::{FrameHandle, FrameQueue, FrameTask};
use instant::Instant;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenPhase {
    Intro,
    Outro,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenStatus {
    Running,
    /// Intro finished on a frozen cell; the pose stays at the intro target.
    Holding,
    /// Outro finished; the pose is back at rest.
    Finished,
}

/// Intro/outro transform tween of one cell.
#[derive(Clone, Copy, Debug)]
pub struct CellTween {
    phase: TweenPhase,
    start: CellPose,
    target: CellPose,
    rest: CellPose,
    intro_len: f32,
    outro_len: f32,
    recipe: AnimationRecipe,
}

impl CellTween {
    pub fn new(start: CellPose, rest: CellPose, recipe: AnimationRecipe, phase: &Phase) -> Self {
        Self {
            phase: TweenPhase::Intro,
            start,
            target: recipe.target_pose(&rest, phase),
            rest,
            intro_len: recipe.intro_len(phase),
            outro_len: recipe.outro_len(phase),
            recipe,
        }
    }

    pub fn phase(&self) -> TweenPhase {
        self.phase
    }

    pub fn intro_len(&self) -> f32 {
        self.intro_len
    }

    pub fn outro_len(&self) -> f32 {
        self.outro_len
    }

    pub fn total_len(&self) -> f32 {
        self.intro_len + self.outro_len
    }

    pub fn target(&self) -> CellPose {
        self.target
    }

    pub fn rest(&self) -> CellPose {
        self.rest
    }

    /// Pose at animation time `t` since the trigger.
    ///
    /// The frame that crosses the intro boundary lands exactly on the target;
    /// the outro starts counting from the intro length, not from that frame.
    pub fn sample(&mut self, t: f32, frozen: bool) -> (CellPose, TweenStatus) {
        match self.phase {
            TweenPhase::Intro => {
                if t < self.intro_len {
                    let k = self.recipe.intro_easing.apply(t / self.intro_len);
                    return (self.start.lerp(&self.target, k), TweenStatus::Running);
                }
                if frozen {
                    return (self.target, TweenStatus::Holding);
                }
                self.phase = TweenPhase::Outro;
                (self.target, TweenStatus::Running)
            }
            TweenPhase::Outro => {
                let u = if self.outro_len > 0.0 {
                    (t - self.intro_len) / self.outro_len
                } else {
                    1.0
                };
                if u < 1.0 {
                    let k = self.recipe.outro_easing.apply(u);
                    (self.target.lerp(&self.rest, k), TweenStatus::Running)
                } else {
                    (self.rest, TweenStatus::Finished)
                }
            }
        }
    }
}

/// Everything needed to start one cell animation.
#[derive(Clone, Copy, Debug)]
pub struct TriggerOptions {
    pub kind: TriggerKind,
    /// Configured animation speed; zero means default.
    pub speed: f32,
    pub base_color: Rgb,
    /// Flip the cell's freeze latch before starting.
    pub toggle_freeze: bool,
    pub now: Instant,
}

#[derive(Clone, Copy, Debug)]
struct CellAnimation {
    tween: CellTween,
    color: CellColorAnimation,
    started_at: Instant,
    speed: f32,
}

/// Per-cell timer and tween registries.
///
/// Invariant: each cell has at most one parked frame callback and at most one
/// live tween. Retriggering cancels both before installing new ones.
#[derive(Debug, Default)]
pub struct CellAnimator {
    timers: Vec<Option<FrameHandle>>,
    tweens: Vec<Option<CellAnimation>>,
}

impl CellAnimator {
    pub fn new(cell_count: usize) -> Self {
        Self {
            timers: vec![None; cell_count],
            tweens: vec![None; cell_count],
        }
    }

    /// Drop every animation and resize for a rebuilt grid.
    pub fn reset(&mut self, cell_count: usize, queue: &mut FrameQueue) {
        for handle in self.timers.iter_mut().filter_map(Option::take) {
            queue.cancel(handle);
        }
        self.timers = vec![None; cell_count];
        self.tweens = vec![None; cell_count];
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn timer(&self, index: usize) -> Option<FrameHandle> {
        self.timers.get(index).copied().flatten()
    }

    pub fn tween(&self, index: usize) -> Option<&CellTween> {
        self.tweens
            .get(index)
            .and_then(Option::as_ref)
            .map(|a| &a.tween)
    }

    pub fn is_animating(&self, index: usize) -> bool {
        self.tween(index).is_some()
    }

    /// Number of cells with a live tween.
    pub fn active(&self) -> usize {
        self.tweens.iter().filter(|t| t.is_some()).count()
    }

    /// Start (or restart) the animation of `index` from `start`.
    ///
    /// Returns false when `index` is not a cell, or when a frozen cell is
    /// triggered without toggling the freeze.
    pub fn trigger<R: Rng + ?Sized>(
        &mut self,
        grid: &mut Grid,
        queue: &mut FrameQueue,
        index: usize,
        start: CellPose,
        opts: TriggerOptions,
        rng: &mut R,
    ) -> bool {
        let (Some(phase), Some(rest), Some(from)) =
            (grid.phase(index).copied(), grid.rest_pose(index), grid.color(index))
        else {
            return false;
        };
        if index >= self.timers.len() {
            return false;
        }
        // a frozen cell keeps its pose until the next freeze toggle
        if grid.is_frozen(index) && !opts.toggle_freeze {
            return false;
        }
        self.stop(index, grid, queue);
        if opts.toggle_freeze {
            let frozen = grid.toggle_frozen(index);
            log::debug!("[cell] {} frozen={}", index, frozen);
        }

        let recipe = AnimationRecipe::for_kind(opts.kind);
        let random = random_cell_color(rng);
        self.tweens[index] = Some(CellAnimation {
            tween: CellTween::new(start, rest, recipe, &phase),
            color: CellColorAnimation::new(
                index,
                from,
                random,
                opts.base_color,
                recipe.color_outro_easing,
            ),
            started_at: opts.now,
            speed: effective_speed(opts.speed),
        });
        self.timers[index] = Some(queue.request(FrameTask::Cell(index)));
        true
    }

    /// Run the frame callback of `index`. Returns true when the grid changed.
    pub fn tick(
        &mut self,
        index: usize,
        now: Instant,
        grid: &mut Grid,
        queue: &mut FrameQueue,
    ) -> bool {
        let Some(slot) = self.timers.get_mut(index) else {
            return false;
        };
        *slot = None;
        let Some(anim) = self.tweens.get_mut(index).and_then(Option::as_mut) else {
            return false;
        };

        let t = anim.speed * now.saturating_duration_since(anim.started_at).as_secs_f32();
        let frozen = grid.is_frozen(index);
        let intro_len = anim.tween.intro_len();
        if t <= intro_len {
            anim.color.intro(t / intro_len, grid);
        } else if !frozen {
            let outro_len = anim.tween.outro_len();
            let u = if outro_len > 0.0 {
                (t - intro_len) / outro_len
            } else {
                1.0
            };
            anim.color.outro(u, grid);
        }

        let (pose, status) = anim.tween.sample(t, frozen);
        grid.set_pose(index, &pose);
        match status {
            TweenStatus::Running => {
                self.timers[index] = Some(queue.request(FrameTask::Cell(index)));
            }
            TweenStatus::Holding => {
                anim.color.intro(1.0, grid);
                self.tweens[index] = None;
            }
            TweenStatus::Finished => {
                anim.color.finish(grid);
                self.tweens[index] = None;
            }
        }
        true
    }

    /// Cancel the timer and tween of `index`. A tween still in flight leaves
    /// the cell at its exact rest pose; the color is left where it is.
    pub fn stop(&mut self, index: usize, grid: &mut Grid, queue: &mut FrameQueue) {
        if let Some(handle) = self.timers.get_mut(index).and_then(Option::take) {
            queue.cancel(handle);
        }
        if let Some(anim) = self.tweens.get_mut(index).and_then(Option::take) {
            grid.set_pose(index, &anim.tween.rest());
        }
    }
}
