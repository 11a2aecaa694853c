//! Cooperative frame scheduling.
//!
//! `FrameQueue` stands in for the host's animation-frame primitive: a task
//! requested while frame N is being processed runs in frame N+1, and every
//! request hands back a handle that can cancel it. Nothing here is threaded.

use crate::lights::Side;
use instant::Instant;
use std::time::Duration;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

/// Work that can be parked until the next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameTask {
    /// Advance the transform and color animation of one cell.
    Cell(usize),
    /// Advance the beat-driven light animation.
    Beat,
    /// Advance a one-shot side light color transition.
    SideLightColor(Side),
}

pub type FrameBatch = SmallVec<[(FrameHandle, FrameTask); 16]>;

#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: Vec<(FrameHandle, FrameTask)>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, task: FrameTask) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push((handle, task));
        handle
    }

    /// Returns false when the handle already ran or was cancelled.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        match self.pending.iter().position(|(h, _)| *h == handle) {
            Some(pos) => {
                self.pending.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.iter().any(|(h, _)| *h == handle)
    }

    /// How many callbacks are parked for `task`.
    pub fn count(&self, task: FrameTask) -> usize {
        self.pending.iter().filter(|(_, t)| *t == task).count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take everything due this frame, in request order.
    pub fn drain(&mut self) -> FrameBatch {
        self.pending.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Trailing-edge debounce: fires once `delay` after the last poke.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// (Re)start the quiet period.
    pub fn poke(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per quiet period, when it has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
