use crate::constants::{CANVAS_ID, CLASS_HIDDEN, CLASS_VISIBLE, DPR_MAX, DPR_MIN};
use crate::input::{self, LayoutRect};
use hexwall_core::Viewport;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn find_canvas(document: &web::Document) -> anyhow::Result<web::HtmlCanvasElement> {
    document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{} element", CANVAS_ID))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!("#{} is not a canvas: {:?}", CANVAS_ID, e))
}

/// Size the canvas is allotted: its parent's box, or its own when the parent
/// reports nothing.
pub fn layout_viewport(canvas: &web::HtmlCanvasElement) -> Viewport {
    let parent = canvas
        .parent_element()
        .map(|p| (p.client_width(), p.client_height()))
        .unwrap_or((0, 0));
    let width = if parent.0 > 0 {
        parent.0
    } else {
        canvas.client_width()
    };
    let height = if parent.1 > 0 {
        parent.1
    } else {
        canvas.client_height()
    };
    Viewport::new(width.max(0) as u32, height.max(0) as u32)
}

pub fn layout_rect(canvas: &web::HtmlCanvasElement) -> LayoutRect {
    let rect = canvas.get_bounding_client_rect();
    LayoutRect::new(
        rect.left() as f32,
        rect.top() as f32,
        rect.width() as f32,
        rect.height() as f32,
    )
}

pub fn device_pixel_ratio() -> f64 {
    web::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .clamp(DPR_MIN, DPR_MAX)
}

/// Match the backing store to the layout box. Returns the new pixel size.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, viewport: Viewport) -> (u32, u32) {
    let (w, h) = input::backing_size(
        viewport.width as f64,
        viewport.height as f64,
        device_pixel_ratio(),
    );
    if canvas.width() != w {
        canvas.set_width(w);
    }
    if canvas.height() != h {
        canvas.set_height(h);
    }
    (w, h)
}

/// Hide the canvas while a resize is settling.
pub fn set_resizing(canvas: &web::HtmlCanvasElement, resizing: bool) {
    let classes = canvas.class_list();
    let (from, to) = if resizing {
        (CLASS_VISIBLE, CLASS_HIDDEN)
    } else {
        (CLASS_HIDDEN, CLASS_VISIBLE)
    };
    if classes.contains(from) {
        _ = classes.replace(from, to);
    }
}
