//! Render-on-demand bookkeeping: redraw coalescing, fps ceiling and resize
//! detection. The GPU side lives in the web front-end.

use crate::constants::RESIZE_DEBOUNCE_MS;
use crate::schedule::Debouncer;
use instant::Instant;
use std::time::Duration;

/// Drawing surface size in layout (CSS) pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Minimum spacing between draws; `None` when unthrottled (fps 0).
pub fn frame_budget(fps: u32) -> Option<Duration> {
    (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64))
}

#[derive(Clone, Debug, Default)]
pub struct RenderScheduler {
    requested: bool,
    last_draw: Option<Instant>,
    skipped: u64,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when this call set the flag.
    pub fn request_render_if_not_requested(&mut self) -> bool {
        if self.requested {
            return false;
        }
        self.requested = true;
        true
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Run the render step of a frame. The flag is cleared before deciding,
    /// so anything requested while drawing schedules a follow-up frame.
    /// A throttled frame skips the draw and the request is spent; the next
    /// mutation asks again.
    pub fn on_frame(&mut self, now: Instant, fps: u32) -> bool {
        if !self.requested {
            return false;
        }
        self.requested = false;
        if let (Some(budget), Some(last)) = (frame_budget(fps), self.last_draw) {
            if now.saturating_duration_since(last) < budget {
                self.skipped += 1;
                return false;
            }
        }
        self.last_draw = Some(now);
        true
    }

    pub fn last_draw(&self) -> Option<Instant> {
        self.last_draw
    }

    /// Frames dropped by the fps ceiling so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

/// Watches the surface's layout box and settles size changes after a quiet period.
#[derive(Clone, Debug)]
pub struct ResizeWatcher {
    current: Viewport,
    debounce: Debouncer,
}

impl ResizeWatcher {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            current: viewport,
            debounce: Debouncer::from_millis(RESIZE_DEBOUNCE_MS),
        }
    }

    /// Compare the layout box against the last seen size. Returns true when it changed.
    pub fn check(&mut self, layout: Viewport, now: Instant) -> bool {
        if layout.is_empty() || layout == self.current {
            return false;
        }
        self.current = layout;
        self.debounce.poke(now);
        true
    }

    /// The settled size, once per burst of changes.
    pub fn fire(&mut self, now: Instant) -> Option<Viewport> {
        self.debounce.fire(now).then_some(self.current)
    }

    pub fn is_armed(&self) -> bool {
        self.debounce.is_armed()
    }

    pub fn viewport(&self) -> Viewport {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_coalesce() {
        let mut r = RenderScheduler::new();
        assert!(r.request_render_if_not_requested());
        assert!(!r.request_render_if_not_requested());
        assert!(r.on_frame(Instant::now(), 60));
        assert!(!r.is_requested());
        assert!(!r.on_frame(Instant::now(), 60));
    }

    #[test]
    fn throttle_skips_and_clears_request() {
        let t0 = Instant::now();
        let mut r = RenderScheduler::new();
        r.request_render_if_not_requested();
        assert!(r.on_frame(t0, 30));
        r.request_render_if_not_requested();
        assert!(!r.on_frame(t0 + Duration::from_millis(10), 30));
        assert!(!r.is_requested());
        assert!(!r.on_frame(t0 + Duration::from_millis(40), 30));
        assert!(r.request_render_if_not_requested());
        assert!(r.on_frame(t0 + Duration::from_millis(40), 30));
        assert_eq!(r.skipped(), 1);
    }

    #[test]
    fn fps_zero_never_skips() {
        let t0 = Instant::now();
        let mut r = RenderScheduler::new();
        for i in 0..10 {
            r.request_render_if_not_requested();
            assert!(r.on_frame(t0 + Duration::from_micros(i), 0));
        }
        assert_eq!(frame_budget(0), None);
    }

    #[test]
    fn resize_settles_after_quiet_period() {
        let t0 = Instant::now();
        let mut w = ResizeWatcher::new(Viewport::new(800, 600));
        assert!(!w.check(Viewport::new(800, 600), t0));
        assert!(!w.check(Viewport::new(0, 600), t0));
        assert!(w.check(Viewport::new(1024, 600), t0));
        assert!(w.check(Viewport::new(1280, 720), t0 + Duration::from_millis(100)));
        assert_eq!(w.fire(t0 + Duration::from_millis(250)), None);
        assert_eq!(
            w.fire(t0 + Duration::from_millis(300)),
            Some(Viewport::new(1280, 720))
        );
        assert!(!w.is_armed());
    }
}
