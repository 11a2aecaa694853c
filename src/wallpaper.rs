//! Bridge to the wallpaper host: user properties and the audio spectrum
//! arrive through callbacks the host looks up on `window`.

use crate::frame::FrameLoop;
use hexwall_core::constants::SPECTRUM_BINS;
use hexwall_core::{Engine, PropertyValue};
use instant::Instant;
use js_sys::{Array, Function, Object, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

pub fn register(engine: Rc<RefCell<Engine>>, frames: Rc<FrameLoop>) -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    register_property_listener(&window, engine.clone(), frames.clone())?;
    register_audio_listener(&window, engine, frames)?;
    Ok(())
}

fn register_property_listener(
    window: &web::Window,
    engine: Rc<RefCell<Engine>>,
    frames: Rc<FrameLoop>,
) -> anyhow::Result<()> {
    let closure = Closure::wrap(Box::new(move |props: JsValue| {
        let parsed = read_properties(&props);
        let applied = engine.borrow_mut().apply_properties(
            parsed.iter().map(|(name, value)| (name.as_str(), value.clone())),
            Instant::now(),
        );
        log::info!("[wallpaper] applied {}/{} properties", applied, parsed.len());
        frames.kick_if_pending();
    }) as Box<dyn FnMut(JsValue)>);

    let listener = Object::new();
    Reflect::set(
        &listener,
        &JsValue::from_str("applyUserProperties"),
        closure.as_ref(),
    )
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Reflect::set(
        window,
        &JsValue::from_str("wallpaperPropertyListener"),
        &listener,
    )
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    closure.forget();
    Ok(())
}

/// Outside the wallpaper host there is no audio; that is not an error.
fn register_audio_listener(
    window: &web::Window,
    engine: Rc<RefCell<Engine>>,
    frames: Rc<FrameLoop>,
) -> anyhow::Result<()> {
    let register = Reflect::get(window, &JsValue::from_str("wallpaperRegisterAudioListener"))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let Some(register) = register.dyn_ref::<Function>() else {
        log::info!("[wallpaper] no audio listener available");
        return Ok(());
    };

    let mut bins: Vec<f32> = Vec::with_capacity(SPECTRUM_BINS);
    let closure = Closure::wrap(Box::new(move |audio: JsValue| {
        read_spectrum(&audio, &mut bins);
        let scheduled = engine.borrow_mut().audio_sample(&bins, Instant::now());
        if scheduled {
            frames.kick();
        }
    }) as Box<dyn FnMut(JsValue)>);
    register
        .call1(&JsValue::NULL, closure.as_ref())
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    closure.forget();
    log::info!("[wallpaper] audio listener registered");
    Ok(())
}

/// `{ name: { value } }` records; entries without a usable value are dropped.
fn read_properties(props: &JsValue) -> Vec<(String, PropertyValue)> {
    let Some(obj) = props.dyn_ref::<Object>() else {
        return Vec::new();
    };
    Object::keys(obj)
        .iter()
        .filter_map(|key| {
            let name = key.as_string()?;
            let entry = Reflect::get(props, &key).ok()?;
            let value = Reflect::get(&entry, &JsValue::from_str("value")).ok()?;
            Some((name, to_property_value(&value)?))
        })
        .collect()
}

fn to_property_value(value: &JsValue) -> Option<PropertyValue> {
    if let Some(b) = value.as_bool() {
        Some(PropertyValue::Bool(b))
    } else if let Some(n) = value.as_f64() {
        Some(PropertyValue::Number(n))
    } else {
        value.as_string().map(PropertyValue::Text)
    }
}

fn read_spectrum(audio: &JsValue, out: &mut Vec<f32>) {
    out.clear();
    if !Array::is_array(audio) {
        return;
    }
    let array = Array::from(audio);
    out.extend(
        array
            .iter()
            .take(SPECTRUM_BINS)
            .map(|v| v.as_f64().unwrap_or(0.0) as f32),
    );
}
