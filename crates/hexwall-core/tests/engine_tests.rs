// Host-side integration tests driving the engine the way the web front-end does:
// input calls followed by frames until nothing is pending.

use glam::Vec2;
use hexwall_core::color::Rgb;
use hexwall_core::grid::{GridLayout, HexGeometry};
use hexwall_core::lights::LightKind;
use hexwall_core::schedule::FrameTask;
use hexwall_core::{
    Engine, Grid, PropertyValue, SettingKey, SettingValue, TriggerKind, Viewport,
};
use instant::Instant;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f32::consts::TAU;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

fn engine() -> Engine {
    Engine::new(Viewport::new(1280, 720), 7)
}

/// Step frames until the engine goes idle. Returns the time of the last frame.
fn settle(engine: &mut Engine, from: Instant) -> Instant {
    let mut now = from;
    for _ in 0..2_000 {
        if !engine.has_pending_frame() {
            return now;
        }
        now += FRAME;
        engine.frame(now, None);
    }
    panic!("engine never went idle");
}

fn step(engine: &mut Engine, from: Instant, frames: u32) -> Instant {
    let mut now = from;
    for _ in 0..frames {
        now += FRAME;
        engine.frame(now, None);
    }
    now
}

fn ndc_of(engine: &Engine, index: usize) -> Vec2 {
    let world = engine
        .grid()
        .world_transform(index)
        .unwrap()
        .w_axis
        .truncate();
    let clip = engine.camera().view_projection() * world.extend(1.0);
    Vec2::new(clip.x / clip.w, clip.y / clip.w)
}

fn at_rest(engine: &Engine, index: usize) -> bool {
    let grid = engine.grid();
    *grid.transform(index).unwrap() == grid.rest_pose(index).unwrap().matrix()
}

#[test]
fn two_by_three_grid_has_six_cells_and_phases() {
    let mut rng = StdRng::seed_from_u64(1);
    let grid = Grid::build(
        GridLayout::new(2, 3, 1.0),
        HexGeometry::new(0.9, 0.2),
        Rgb::BLACK,
        &mut rng,
    );
    assert_eq!(grid.len(), 6);
    assert_eq!(grid.phases().len(), 6);
    assert!(grid.phases().iter().all(|p| (0.0..TAU).contains(&p.depth)));
}

#[test]
fn engine_fills_viewport_and_draws_first_frame() {
    let mut e = engine();
    assert_eq!(e.grid().layout().rows, 14);
    assert_eq!(e.grid().layout().cols, 28);
    assert_eq!(e.lights().len(), 4);
    let out = e.frame(Instant::now(), None);
    assert!(out.draw);
    assert!(out.rebuilt);
    assert!(!e.has_pending_frame());
}

#[test]
fn retrigger_leaves_one_callback_per_cell() {
    let mut e = engine();
    let t0 = Instant::now();
    assert!(e.trigger_cell(9, TriggerKind::Hover, t0));
    let t1 = step(&mut e, t0, 3);
    assert!(e.trigger_cell(9, TriggerKind::Hover, t1));
    assert!(e.trigger_cell(9, TriggerKind::Click, t1));
    assert_eq!(e.queue().count(FrameTask::Cell(9)), 1);
    assert_eq!(e.cells().active(), 1);
}

#[test]
fn stop_mid_flight_restores_exact_rest() {
    let mut e = engine();
    let t0 = Instant::now();
    e.trigger_cell(12, TriggerKind::Click, t0);
    step(&mut e, t0, 20);
    assert!(!at_rest(&e, 12));
    e.stop_cell(12);
    assert!(at_rest(&e, 12));
    assert_eq!(e.queue().count(FrameTask::Cell(12)), 0);
}

#[test]
fn double_click_unfreezes_and_returns_to_base() {
    let mut e = engine();
    let base = e.settings().base_color();
    let t0 = Instant::now();
    let ndc = ndc_of(&e, 4);

    assert!(e.pointer_down(ndc, t0));
    e.pointer_up();
    assert!(e.grid().is_frozen(4));
    let t1 = step(&mut e, t0, 5);

    assert!(e.pointer_down(ndc, t1));
    e.pointer_up();
    assert!(!e.grid().is_frozen(4));

    settle(&mut e, t1);
    assert_eq!(e.grid().color(4), Some(base));
    assert!(at_rest(&e, 4));
}

#[test]
fn frozen_cell_holds_pose_and_color() {
    let mut e = engine();
    let base = e.settings().base_color();
    let t0 = Instant::now();
    e.trigger_cell(30, TriggerKind::Click, t0);
    let t1 = settle(&mut e, t0);
    assert!(e.grid().is_frozen(30));
    assert!(!at_rest(&e, 30));
    assert_ne!(e.grid().color(30), Some(base));
    assert!(!e.cells().is_animating(30));

    let held = *e.grid().transform(30).unwrap();
    assert!(!e.trigger_cell(30, TriggerKind::Hover, t1));
    settle(&mut e, t1);
    assert_eq!(*e.grid().transform(30).unwrap(), held);
}

#[test]
fn hover_is_deduplicated_click_is_not() {
    let mut e = engine();
    let t0 = Instant::now();
    let ndc = ndc_of(&e, 40);
    assert!(e.pointer_move(ndc, t0));
    assert!(!e.pointer_move(ndc, t0 + FRAME));
    assert_eq!(e.resolver().last_hit(), Some(40));
    assert!(e.pointer_down(ndc, t0 + FRAME));
    assert!(e.pointer_down(ndc, t0 + FRAME * 2));
}

#[test]
fn dragging_with_pointer_held_toggles_freeze() {
    let mut e = engine();
    let t0 = Instant::now();
    e.pointer_down(ndc_of(&e, 50), t0);
    assert!(e.pointer_move(ndc_of(&e, 51), t0 + FRAME));
    assert!(e.grid().is_frozen(51));
    e.pointer_up();
    assert!(e.pointer_move(ndc_of(&e, 52), t0 + FRAME * 2));
    assert!(!e.grid().is_frozen(52));
}

#[test]
fn cell_zero_is_reachable() {
    let mut e = engine();
    assert!(e.pointer_move(ndc_of(&e, 0), Instant::now()));
    assert!(e.cells().is_animating(0));
}

#[test]
fn fps_zero_never_skips_a_frame() {
    let mut e = engine();
    let t0 = Instant::now();
    e.set(SettingKey::Fps, SettingValue::Uint(0), t0).unwrap();
    for i in 1..=20u64 {
        e.request_render();
        let out = e.frame(t0 + Duration::from_micros(i), None);
        assert!(out.draw);
    }
    assert_eq!(e.render_scheduler().skipped(), 0);
}

#[test]
fn fps_limit_drops_the_throttled_draw() {
    let mut e = engine();
    let t0 = Instant::now();
    assert!(e.frame(t0, None).draw);
    e.request_render();
    assert!(!e.frame(t0 + Duration::from_millis(1), None).draw);
    assert!(!e.render_scheduler().is_requested());
    assert!(!e.frame(t0 + Duration::from_millis(20), None).draw);
    e.request_render();
    assert!(e.frame(t0 + Duration::from_millis(40), None).draw);
    assert_eq!(e.render_scheduler().skipped(), 1);
}

#[test]
fn beat_pulse_settles_lights_back_to_rest() {
    let mut e = engine();
    let t0 = Instant::now();
    assert!(e.audio_sample(&[1.0; 128], t0));
    let t1 = step(&mut e, t0, 4);
    let left = e.lights().get(LightKind::Left).unwrap();
    assert!(left.light.intensity > left.initial_intensity);
    settle(&mut e, t1);
    assert!(!e.beat().is_active());
    for kind in LightKind::ALL {
        let l = e.lights().get(kind).unwrap();
        assert_eq!(l.light.intensity, l.initial_intensity);
    }
}

#[test]
fn silent_audio_schedules_nothing() {
    let mut e = engine();
    assert!(!e.audio_sample(&[0.0; 128], Instant::now()));
    assert!(!e.audio_sample(&[], Instant::now()));
}

#[test]
fn properties_apply_after_debounce() {
    let mut e = engine();
    let cells = e.grid().len();
    let t0 = Instant::now();
    e.frame(t0, None);
    let applied = e.apply_properties(
        [
            ("tilesize", PropertyValue::Number(2.0)),
            ("tileopacity", PropertyValue::Number(500.0)),
            ("basecolor", PropertyValue::Text("1 0".into())),
            ("schemecolor", PropertyValue::Text("0 0 0".into())),
            ("fps", PropertyValue::Number(0.0)),
        ],
        t0,
    );
    assert_eq!(applied, 2);
    assert_eq!(e.settings().fps(), 0);
    assert_eq!(e.settings().tile_opacity(), 1.0);

    let early = e.frame(t0 + Duration::from_millis(100), None);
    assert!(!early.rebuilt);
    let due = e.frame(t0 + Duration::from_millis(200), None);
    assert!(due.rebuilt);
    assert!(e.grid().len() < cells);
}

#[test]
fn base_color_change_rebuilds_with_new_color() {
    let mut e = engine();
    let t0 = Instant::now();
    e.apply_properties([("basecolor", PropertyValue::Text("0 0 1".into()))], t0);
    settle(&mut e, t0);
    let base = e.settings().base_color();
    assert_eq!(e.grid().color(0), Some(base));
    let (_, _, l) = base.to_hsl();
    assert!((l - 0.05).abs() < 1e-4);
}

#[test]
fn side_light_color_setting_lerps_light() {
    let mut e = engine();
    let t0 = Instant::now();
    let red = Rgb::new(1.0, 0.0, 0.0);
    e.set(SettingKey::LeftSideLightColor, SettingValue::Color(red), t0)
        .unwrap();
    settle(&mut e, t0);
    assert_eq!(e.lights().get(LightKind::Left).unwrap().light.color, red);
}

#[test]
fn resize_settles_then_rebuilds() {
    let mut e = engine();
    let t0 = Instant::now();
    e.frame(t0, None);
    let out = e.frame(t0 + FRAME, Some(Viewport::new(720, 1280)));
    assert!(out.resizing);
    assert!(out.resized.is_none());
    assert!(e.has_pending_frame());

    let out = e.frame(t0 + Duration::from_millis(300), Some(Viewport::new(720, 1280)));
    assert_eq!(out.resized, Some(Viewport::new(720, 1280)));
    assert!(out.rebuilt);
    assert!(out.draw);
    assert!(e.grid().layout().rows > e.grid().layout().cols);
}

#[test]
fn rebuild_cancels_running_animations() {
    let mut e = engine();
    let t0 = Instant::now();
    e.trigger_cell(3, TriggerKind::Hover, t0);
    e.set(SettingKey::TileHeight, SettingValue::Float(0.4), t0)
        .unwrap();
    e.frame(t0 + Duration::from_millis(250), None);
    assert_eq!(e.cells().active(), 0);
    assert!(e.queue().is_empty());
}
