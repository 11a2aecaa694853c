// Host-side tests for pure input functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use glam::Vec2;
use input::*;

fn rect() -> LayoutRect {
    LayoutRect::new(100.0, 50.0, 800.0, 400.0)
}

#[test]
fn client_to_ndc_maps_corners_and_center() {
    let r = rect();
    assert_eq!(client_to_ndc(Vec2::new(100.0, 50.0), r), Some(Vec2::new(-1.0, 1.0)));
    assert_eq!(client_to_ndc(Vec2::new(900.0, 450.0), r), Some(Vec2::new(1.0, -1.0)));
    assert_eq!(client_to_ndc(Vec2::new(500.0, 250.0), r), Some(Vec2::ZERO));
}

#[test]
fn client_to_ndc_flips_y_up() {
    // Upper half of the box is positive y
    let ndc = client_to_ndc(Vec2::new(500.0, 150.0), rect()).unwrap();
    assert!(ndc.y > 0.0);
    assert_eq!(ndc.x, 0.0);
}

#[test]
fn points_outside_the_box_leave_ndc_range() {
    let ndc = client_to_ndc(Vec2::new(0.0, 500.0), rect()).unwrap();
    assert!(ndc.x < -1.0);
    assert!(ndc.y < -1.0);
}

#[test]
fn empty_or_invalid_input_yields_nothing() {
    assert_eq!(client_to_ndc(Vec2::ZERO, LayoutRect::default()), None);
    assert_eq!(
        client_to_ndc(Vec2::ZERO, LayoutRect::new(0.0, 0.0, 0.0, 10.0)),
        None
    );
    assert_eq!(client_to_ndc(Vec2::new(f32::NAN, 0.0), rect()), None);
}

#[test]
fn primary_touch_prefers_active_touches() {
    let a = Vec2::new(1.0, 2.0);
    let b = Vec2::new(3.0, 4.0);
    assert_eq!(primary_touch(&[a], &[b]), Some(a));
    assert_eq!(primary_touch(&[], &[b]), Some(b));
    assert_eq!(primary_touch(&[], &[]), None);
}

#[test]
fn backing_size_scales_by_pixel_ratio() {
    assert_eq!(backing_size(800.0, 600.0, 2.0), (1600, 1200));
    assert_eq!(backing_size(801.0, 601.0, 1.5), (1202, 902));
}

#[test]
fn backing_size_is_never_zero() {
    assert_eq!(backing_size(0.0, 0.0, 2.0), (1, 1));
    assert_eq!(backing_size(-5.0, 10.0, 1.0), (1, 10));
    // A bogus ratio falls back to 1
    assert_eq!(backing_size(100.0, 50.0, 0.0), (100, 50));
    assert_eq!(backing_size(100.0, 50.0, f64::NAN), (100, 50));
}
