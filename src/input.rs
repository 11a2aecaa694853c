use glam::Vec2;

/// Layout box of the drawing surface in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

// ---------------- Pointer helpers ----------------

/// Client coordinates to normalized device coordinates, +y up.
/// Points outside the box map outside \[-1, 1\]; an empty box yields nothing.
#[inline]
pub fn client_to_ndc(client: Vec2, rect: LayoutRect) -> Option<Vec2> {
    if rect.is_empty() || !client.is_finite() {
        return None;
    }
    let u = (client.x - rect.left) / rect.width;
    let v = (client.y - rect.top) / rect.height;
    Some(Vec2::new(u * 2.0 - 1.0, 1.0 - v * 2.0))
}

/// The point a touch gesture acts on: the first active touch, else the first
/// one that just ended.
#[inline]
pub fn primary_touch(touches: &[Vec2], changed: &[Vec2]) -> Option<Vec2> {
    touches.first().or_else(|| changed.first()).copied()
}

// ---------------- Surface sizing ----------------

/// Device pixels backing a CSS box; never zero so the surface stays valid.
#[inline]
pub fn backing_size(css_width: f64, css_height: f64, dpr: f64) -> (u32, u32) {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    let w = (css_width.max(0.0) * dpr).round() as u32;
    let h = (css_height.max(0.0) * dpr).round() as u32;
    (w.max(1), h.max(1))
}
