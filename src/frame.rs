use crate::dom;
use crate::render;
use hexwall_core::grid::HexGeometry;
use hexwall_core::{Engine, InstanceRaw};
use instant::Instant;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext<'a> {
    pub engine: Rc<RefCell<Engine>>,
    pub canvas: web::HtmlCanvasElement,
    pub gpu: Option<render::GpuState<'a>>,
    instances: Vec<InstanceRaw>,
    // a rebuild seen on a throttled frame still has to reach the GPU
    mesh_stale: bool,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        engine: Rc<RefCell<Engine>>,
        canvas: web::HtmlCanvasElement,
        gpu: Option<render::GpuState<'a>>,
    ) -> Self {
        Self {
            engine,
            canvas,
            gpu,
            instances: Vec::new(),
            mesh_stale: true,
        }
    }

    /// One animation frame: advance the engine, then draw if it asks to.
    pub fn frame(&mut self) {
        let now = Instant::now();
        let layout = dom::layout_viewport(&self.canvas);
        let out = self.engine.borrow_mut().frame(now, Some(layout));
        dom::set_resizing(&self.canvas, out.resizing);
        self.mesh_stale |= out.rebuilt;

        if let Some(vp) = out.resized {
            let (w, h) = dom::sync_canvas_backing_size(&self.canvas, vp);
            if let Some(g) = &mut self.gpu {
                g.resize_if_needed(w, h);
            }
        }
        if !out.draw {
            return;
        }
        let Some(g) = &mut self.gpu else {
            return;
        };

        let mut engine = self.engine.borrow_mut();
        let rebuilt = std::mem::take(&mut self.mesh_stale);
        if rebuilt {
            g.set_mesh(engine.grid().geometry());
        }
        let dirty = engine.take_dirty();
        if rebuilt || dirty.any() {
            engine.write_instances(&mut self.instances);
            g.upload_instances(&self.instances);
        }
        g.set_scene(
            engine.camera(),
            engine.lights(),
            engine.settings().tile_opacity(),
        );
        drop(engine);

        match g.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Reconfigure on the next draw
                let (w, h) = (self.canvas.width(), self.canvas.height());
                g.resize_if_needed(w, h);
                self.engine.borrow_mut().request_render();
            }
            Err(e) => log::error!("render error: {:?}", e),
        }
    }
}

pub async fn init_gpu(
    canvas: &web::HtmlCanvasElement,
    geometry: &HexGeometry,
) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas, geometry).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

/// Render-on-demand driver. At most one animation frame is requested at a
/// time, and a frame re-requests itself only while the engine has work left.
pub struct FrameLoop {
    ctx: Rc<RefCell<FrameContext<'static>>>,
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
    scheduled: Cell<bool>,
}

impl FrameLoop {
    pub fn start(ctx: Rc<RefCell<FrameContext<'static>>>) -> Rc<Self> {
        let frames = Rc::new(Self {
            ctx,
            tick: RefCell::new(None),
            scheduled: Cell::new(false),
        });
        let weak: Weak<Self> = Rc::downgrade(&frames);
        *frames.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if let Some(f) = weak.upgrade() {
                f.run();
            }
        }) as Box<dyn FnMut()>));
        frames.kick();
        frames
    }

    /// Make sure a frame is coming.
    pub fn kick(&self) {
        if self.scheduled.replace(true) {
            return;
        }
        let requested = web::window().is_some_and(|w| {
            self.tick
                .borrow()
                .as_ref()
                .is_some_and(|cb| w.request_animation_frame(cb.as_ref().unchecked_ref()).is_ok())
        });
        if !requested {
            self.scheduled.set(false);
        }
    }

    /// Kick only when the engine has something to do.
    pub fn kick_if_pending(&self) {
        let pending = self.ctx.borrow().engine.borrow().has_pending_frame();
        if pending {
            self.kick();
        }
    }

    fn run(&self) {
        self.scheduled.set(false);
        self.ctx.borrow_mut().frame();
        self.kick_if_pending();
    }
}
