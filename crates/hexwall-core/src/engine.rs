//! The engine context: one object owning everything a wallpaper instance
//! needs, driven by the host through input calls and `frame`.

use crate::animate::{CellAnimator, TriggerKind, TriggerOptions};
use crate::camera::Camera;
use crate::color::Rgb;
use crate::grid::{CellPose, DirtyFlags, Grid, GridLayout, HexGeometry, InstanceRaw};
use crate::lights::{BeatAnimator, LightRig, Side, SideLightColorAnimator};
use crate::pick::{Hit, IntersectionResolver};
use crate::property::{parse_property, PropertyError, PropertyValue};
use crate::render::{RenderScheduler, ResizeWatcher, Viewport};
use crate::schedule::{FrameQueue, FrameTask};
use crate::settings::{SettingKey, SettingValue, Settings, SettingsError, SideEffect};
use glam::Vec2;
use instant::Instant;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// What the host has to do after a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameOutcome {
    /// Draw the scene now.
    pub draw: bool,
    /// The surface size settled; render targets need resizing.
    pub resized: Option<Viewport>,
    /// The grid was rebuilt, so instance buffers changed length.
    pub rebuilt: bool,
    /// A size change is waiting out its quiet period.
    pub resizing: bool,
}

pub struct Engine {
    viewport: Viewport,
    camera: Camera,
    grid: Grid,
    lights: LightRig,
    settings: Settings,
    resolver: IntersectionResolver,
    cells: CellAnimator,
    beat: BeatAnimator,
    side_colors: SideLightColorAnimator,
    queue: FrameQueue,
    render: RenderScheduler,
    resize: ResizeWatcher,
    rng: StdRng,
    pointer_held: bool,
    rebuilt: bool,
}

fn build_grid<R: rand::Rng + ?Sized>(
    settings: &Settings,
    camera: &mut Camera,
    rng: &mut R,
) -> Grid {
    let size = settings.tile_size();
    let layout = GridLayout::for_camera(camera, size);
    let center = layout.center();
    camera.center_on(center.x, center.y);
    let geometry = HexGeometry::new(settings.tile_width() * size, settings.tile_height());
    Grid::build(layout, geometry, settings.base_color(), rng)
}

impl Engine {
    pub fn new(viewport: Viewport, seed: u64) -> Self {
        Self::with_settings(viewport, seed, Settings::new())
    }

    pub fn with_settings(viewport: Viewport, seed: u64, settings: Settings) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut camera = Camera::new(settings.camera_fov(), viewport.aspect());
        let grid = build_grid(&settings, &mut camera, &mut rng);
        let mut engine = Self {
            viewport,
            camera,
            cells: CellAnimator::new(grid.len()),
            grid,
            lights: LightRig::new(),
            settings,
            resolver: IntersectionResolver::new(),
            beat: BeatAnimator::new(),
            side_colors: SideLightColorAnimator::new(),
            queue: FrameQueue::new(),
            render: RenderScheduler::new(),
            resize: ResizeWatcher::new(viewport),
            rng,
            pointer_held: false,
            rebuilt: true,
        };
        engine.rebuild_lights();
        log::info!(
            "[engine] {}x{} viewport, {} cells",
            viewport.width,
            viewport.height,
            engine.grid.len()
        );
        engine.request_render();
        engine
    }

    // ---- input ----

    /// Hover. Repeated hits on the same cell are ignored; while the pointer
    /// is held every newly entered cell also toggles its freeze latch.
    pub fn pointer_move(&mut self, ndc: Vec2, now: Instant) -> bool {
        self.trigger_at(ndc, TriggerKind::Hover, now)
    }

    pub fn pointer_down(&mut self, ndc: Vec2, now: Instant) -> bool {
        self.pointer_held = true;
        self.trigger_at(ndc, TriggerKind::Click, now)
    }

    pub fn pointer_up(&mut self) {
        self.pointer_held = false;
    }

    pub fn is_pointer_held(&self) -> bool {
        self.pointer_held
    }

    /// Resolve `ndc` and animate whatever cell is under it.
    pub fn trigger_at(&mut self, ndc: Vec2, kind: TriggerKind, now: Instant) -> bool {
        let repeat = kind == TriggerKind::Click;
        match self
            .resolver
            .resolve(ndc, Some(&self.camera), Some(&self.grid), repeat)
        {
            Some(Hit { index, pose, .. }) => self.start_cell(index, pose, kind, now),
            None => false,
        }
    }

    /// Animate a cell by index, starting from its current pose.
    pub fn trigger_cell(&mut self, index: usize, kind: TriggerKind, now: Instant) -> bool {
        match self.grid.pose(index) {
            Some(pose) => self.start_cell(index, pose, kind, now),
            None => false,
        }
    }

    fn start_cell(
        &mut self,
        index: usize,
        pose: CellPose,
        kind: TriggerKind,
        now: Instant,
    ) -> bool {
        let opts = TriggerOptions {
            kind,
            speed: self.settings.animation_speed(),
            base_color: self.settings.base_color(),
            toggle_freeze: kind == TriggerKind::Click || self.pointer_held,
            now,
        };
        let started = self.cells.trigger(
            &mut self.grid,
            &mut self.queue,
            index,
            pose,
            opts,
            &mut self.rng,
        );
        if started {
            log::debug!("[cell] {:?} {}", kind, index);
            self.request_render();
        }
        started
    }

    /// Stop a cell's animation, leaving it at its rest pose.
    pub fn stop_cell(&mut self, index: usize) {
        self.cells.stop(index, &mut self.grid, &mut self.queue);
        self.request_render();
    }

    /// Feed one audio spectrum sample (128 bins in \[0, 1\]).
    pub fn audio_sample(&mut self, bins: &[f32], now: Instant) -> bool {
        let cfg = self.settings.light_config();
        self.beat
            .on_sample(bins, &cfg, &self.lights, &mut self.queue, now)
    }

    pub fn set_side_lights_color(&mut self, color: Rgb, side: Side, now: Instant) -> bool {
        self.side_colors.start(
            side,
            color,
            self.settings.animation_speed(),
            &self.lights,
            &mut self.queue,
            now,
        )
    }

    // ---- settings ----

    pub fn set(
        &mut self,
        key: SettingKey,
        value: SettingValue,
        now: Instant,
    ) -> Result<SideEffect, SettingsError> {
        self.settings.set(key, value, now)
    }

    /// Apply a batch of host properties. Malformed ones are logged and
    /// skipped; returns how many were applied.
    pub fn apply_properties<'a, I>(&mut self, props: I, now: Instant) -> usize
    where
        I: IntoIterator<Item = (&'a str, PropertyValue)>,
    {
        let mut applied = 0;
        for (name, value) in props {
            let parsed = parse_property(name, &value);
            match parsed {
                Ok((key, value)) => match self.settings.set(key, value, now) {
                    Ok(_) => applied += 1,
                    Err(e) => log::warn!("[settings] {}", e),
                },
                Err(PropertyError::Unknown(name)) => {
                    log::debug!("[settings] ignoring property {}", name)
                }
                Err(e) => log::warn!("[settings] {}", e),
            }
        }
        applied
    }

    pub fn subscribe(&mut self, f: impl FnMut(SettingKey, SettingValue) + 'static) {
        self.settings.subscribe(f);
    }

    fn apply_effect(&mut self, effect: SideEffect, now: Instant) {
        match effect {
            SideEffect::None => {}
            SideEffect::RebuildGrid => self.rebuild_grid(),
            SideEffect::RebuildLights => self.rebuild_lights(),
            SideEffect::Reinit => self.reinit(),
            SideEffect::SideLightColor(side) => {
                let color = self.settings.side_light_color(side);
                self.set_side_lights_color(color, side, now);
            }
        }
        self.request_render();
    }

    // ---- scene lifecycle ----

    fn rebuild_grid(&mut self) {
        let grid = build_grid(&self.settings, &mut self.camera, &mut self.rng);
        self.cells.reset(grid.len(), &mut self.queue);
        self.resolver.reset();
        self.grid = grid;
        self.rebuilt = true;
        log::info!(
            "[engine] grid rebuilt: {}x{}",
            self.grid.layout().rows,
            self.grid.layout().cols
        );
        self.rebuild_lights();
    }

    fn rebuild_lights(&mut self) {
        self.beat.cancel(&mut self.queue);
        self.side_colors.cancel_all(&mut self.queue);
        self.lights.remove_lights();
        self.lights.dispose_lights();
        let cfg = self.settings.light_config();
        self.lights.add_lights(&cfg, self.grid.layout().center());
    }

    fn reinit(&mut self) {
        self.camera = Camera::new(self.settings.camera_fov(), self.viewport.aspect());
        self.rebuild_grid();
    }

    // ---- frame loop ----

    pub fn request_render(&mut self) {
        self.render.request_render_if_not_requested();
    }

    /// True while anything needs another frame.
    pub fn has_pending_frame(&self) -> bool {
        self.render.is_requested()
            || !self.queue.is_empty()
            || self.settings.has_pending()
            || self.resize.is_armed()
    }

    /// Run one animation frame: settle resizes and settings, dispatch every
    /// callback parked during the previous frame, then decide on the single
    /// coalesced draw.
    pub fn frame(&mut self, now: Instant, layout: Option<Viewport>) -> FrameOutcome {
        if let Some(layout) = layout {
            if self.resize.check(layout, now) {
                log::debug!("[engine] resize pending {}x{}", layout.width, layout.height);
            }
        }
        let resized = self.resize.fire(now);
        if let Some(vp) = resized {
            self.viewport = vp;
            self.camera.aspect = vp.aspect();
            self.rebuild_grid();
            self.request_render();
        }
        for effect in self.settings.poll(now) {
            self.apply_effect(effect, now);
        }

        let mut changed = false;
        for (_, task) in self.queue.drain() {
            changed |= match task {
                FrameTask::Cell(index) => {
                    self.cells
                        .tick(index, now, &mut self.grid, &mut self.queue)
                }
                FrameTask::Beat => {
                    let cfg = self.settings.light_config();
                    self.beat
                        .tick(now, &cfg, &mut self.lights, &mut self.queue)
                }
                FrameTask::SideLightColor(side) => {
                    self.side_colors
                        .tick(side, now, &mut self.lights, &mut self.queue)
                }
            };
        }
        if changed {
            self.request_render();
        }

        FrameOutcome {
            draw: self.render.on_frame(now, self.settings.fps()),
            resized,
            rebuilt: std::mem::take(&mut self.rebuilt),
            resizing: self.resize.is_armed(),
        }
    }

    // ---- renderer access ----

    pub fn take_dirty(&mut self) -> DirtyFlags {
        self.grid.take_dirty()
    }

    pub fn write_instances(&self, out: &mut Vec<InstanceRaw>) {
        self.grid.write_instances(out);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cells(&self) -> &CellAnimator {
        &self.cells
    }

    pub fn queue(&self) -> &FrameQueue {
        &self.queue
    }

    pub fn resolver(&self) -> &IntersectionResolver {
        &self.resolver
    }

    pub fn beat(&self) -> &BeatAnimator {
        &self.beat
    }

    pub fn render_scheduler(&self) -> &RenderScheduler {
        &self.render
    }
}
