#![cfg(target_arch = "wasm32")]
use hexwall_core::Engine;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod render;
mod wallpaper;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("hexwall-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    static STARTED: AtomicBool = AtomicBool::new(false);
    if STARTED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::find_canvas(&document)?;

    // Backing store follows the layout box times devicePixelRatio
    let viewport = dom::layout_viewport(&canvas);
    dom::sync_canvas_backing_size(&canvas, viewport);

    let engine = Rc::new(RefCell::new(Engine::new(viewport, rand::random())));
    let geometry = *engine.borrow().grid().geometry();
    let gpu = frame::init_gpu(&canvas, &geometry).await;
    if gpu.is_none() {
        log::warn!("[gpu] running without a renderer");
    }

    let ctx = Rc::new(RefCell::new(frame::FrameContext::new(
        engine.clone(),
        canvas.clone(),
        gpu,
    )));
    let frames = frame::FrameLoop::start(ctx);

    events::wire_input_handlers(events::InputWiring {
        canvas,
        engine: engine.clone(),
        frames: frames.clone(),
    });
    if let Err(e) = wallpaper::register(engine, frames) {
        log::warn!("[wallpaper] host bridge unavailable: {:?}", e);
    }
    Ok(())
}
