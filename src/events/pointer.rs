use crate::dom;
use crate::frame::FrameLoop;
use crate::input;
use glam::Vec2;
use hexwall_core::Engine;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys as web;

#[derive(Clone)]
pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub engine: Rc<RefCell<Engine>>,
    pub frames: Rc<FrameLoop>,
}

impl InputWiring {
    fn ndc(&self, client: Vec2) -> Option<Vec2> {
        input::client_to_ndc(client, dom::layout_rect(&self.canvas))
    }

    /// Run an engine call, then make sure a frame follows if it queued work.
    fn with_engine(&self, f: impl FnOnce(&mut Engine)) {
        f(&mut *self.engine.borrow_mut());
        self.frames.kick_if_pending();
    }
}

pub fn wire_input_handlers(w: InputWiring) {
    let Some(document) = dom::window_document() else {
        log::warn!("[input] no document; pointer input disabled");
        return;
    };
    wire_pointermove(&w, &document);
    wire_touchmove(&w, &document);
    wire_pointerdown(&w, &document);
    wire_pointerup(&w);
    wire_resize(&w);
}

fn client_point(ev: &web::MouseEvent) -> Vec2 {
    Vec2::new(ev.client_x() as f32, ev.client_y() as f32)
}

fn wire_pointermove(w: &InputWiring, document: &web::Document) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let Some(ndc) = w.ndc(client_point(&ev)) else {
            return;
        };
        w.with_engine(|e| {
            e.pointer_move(ndc, Instant::now());
        });
    }) as Box<dyn FnMut(_)>);
    _ = document.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn touch_points(list: &web::TouchList) -> Vec<Vec2> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .map(|t| Vec2::new(t.client_x() as f32, t.client_y() as f32))
        .collect()
}

fn wire_touchmove(w: &InputWiring, document: &web::Document) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::TouchEvent| {
        let touches = touch_points(&ev.touches());
        let changed = touch_points(&ev.changed_touches());
        let Some(ndc) = input::primary_touch(&touches, &changed).and_then(|p| w.ndc(p)) else {
            return;
        };
        w.with_engine(|e| {
            e.pointer_move(ndc, Instant::now());
        });
    }) as Box<dyn FnMut(_)>);
    _ = document.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointerdown(w: &InputWiring, document: &web::Document) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let Some(ndc) = w.ndc(client_point(&ev)) else {
            return;
        };
        w.with_engine(|e| {
            if e.pointer_down(ndc, Instant::now()) {
                log::debug!("[input] click at ({:.2}, {:.2})", ndc.x, ndc.y);
            }
        });
    }) as Box<dyn FnMut(_)>);
    _ = document.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointerup(w: &InputWiring) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
        w.engine.borrow_mut().pointer_up();
    }) as Box<dyn FnMut(_)>);
    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
        _ = wnd.add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

/// Window resizes only kick a frame; the engine notices the new layout box
/// and waits for it to settle.
fn wire_resize(w: &InputWiring) {
    let frames = w.frames.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move || {
        frames.kick();
    }) as Box<dyn FnMut()>);
    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
