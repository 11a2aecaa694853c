//! Runtime settings store.
//!
//! Every key carries a typed value and a declared side effect. `set` stores
//! the value and notifies subscribers immediately; the side effect itself is
//! debounced and surfaces later through `poll`, which the engine calls once
//! per frame.

use crate::color::Rgb;
use crate::constants::{
    ANIMATION_SPEED, BASE_COLOR, BEAT_ANIMATION_SPEED, BEAT_ENABLED, BEAT_IMPACT,
    CAMERA_FOV_DEG, DIRECT_LIGHT_INTENSITY, DIRECT_TOP_LIGHT_INTENSITY, FPS_LIMIT, FPS_MAX,
    LEFT_SIDE_LIGHT_COLOR, RIGHT_SIDE_LIGHT_COLOR, SETTINGS_DEBOUNCE_MS, SIZE, TILE_HEIGHT,
    TILE_OPACITY, TILE_WIDTH,
};
use crate::lights::{LightConfig, Side};
use crate::schedule::Debouncer;
use fnv::FnvHashMap;
use instant::Instant;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Fps,
    TileHeight,
    TileOpacity,
    TileWidth,
    TileSize,
    AnimationSpeed,
    BaseColor,
    BeatEnabled,
    BeatImpact,
    BeatAnimationSpeed,
    SideLightIntensity,
    LeftSideLightColor,
    RightSideLightColor,
    EnableLeftSideLight,
    EnableRightSideLight,
    EnableTopLight,
    TopLightIntensity,
    CameraFov,
}

/// What has to happen after a key changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SideEffect {
    None,
    RebuildGrid,
    RebuildLights,
    /// Camera, grid and lights from scratch.
    Reinit,
    SideLightColor(Side),
}

impl SideEffect {
    // poll order; heavier effects first
    const ORDER: [SideEffect; 5] = [
        SideEffect::Reinit,
        SideEffect::RebuildGrid,
        SideEffect::RebuildLights,
        SideEffect::SideLightColor(Side::Left),
        SideEffect::SideLightColor(Side::Right),
    ];

    /// Running `self` already does everything `other` would.
    fn covers(self, other: SideEffect) -> bool {
        match self {
            SideEffect::Reinit => {
                matches!(other, SideEffect::RebuildGrid | SideEffect::RebuildLights)
            }
            SideEffect::RebuildGrid => other == SideEffect::RebuildLights,
            _ => false,
        }
    }
}

impl SettingKey {
    pub const ALL: [SettingKey; 18] = [
        SettingKey::Fps,
        SettingKey::TileHeight,
        SettingKey::TileOpacity,
        SettingKey::TileWidth,
        SettingKey::TileSize,
        SettingKey::AnimationSpeed,
        SettingKey::BaseColor,
        SettingKey::BeatEnabled,
        SettingKey::BeatImpact,
        SettingKey::BeatAnimationSpeed,
        SettingKey::SideLightIntensity,
        SettingKey::LeftSideLightColor,
        SettingKey::RightSideLightColor,
        SettingKey::EnableLeftSideLight,
        SettingKey::EnableRightSideLight,
        SettingKey::EnableTopLight,
        SettingKey::TopLightIntensity,
        SettingKey::CameraFov,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SettingKey::Fps => "fps",
            SettingKey::TileHeight => "tileHeight",
            SettingKey::TileOpacity => "tileOpacity",
            SettingKey::TileWidth => "tileWidth",
            SettingKey::TileSize => "tileSize",
            SettingKey::AnimationSpeed => "animationSpeed",
            SettingKey::BaseColor => "baseColor",
            SettingKey::BeatEnabled => "beatEnabled",
            SettingKey::BeatImpact => "beatImpact",
            SettingKey::BeatAnimationSpeed => "beatAnimationSpeed",
            SettingKey::SideLightIntensity => "sideLightIntensity",
            SettingKey::LeftSideLightColor => "leftSideLightColor",
            SettingKey::RightSideLightColor => "rightSideLightColor",
            SettingKey::EnableLeftSideLight => "enableLeftSideLight",
            SettingKey::EnableRightSideLight => "enableRightSideLight",
            SettingKey::EnableTopLight => "enableTopLight",
            SettingKey::TopLightIntensity => "topLightIntensity",
            SettingKey::CameraFov => "cameraFov",
        }
    }

    pub fn side_effect(self) -> SideEffect {
        match self {
            SettingKey::Fps | SettingKey::AnimationSpeed | SettingKey::BeatAnimationSpeed => {
                SideEffect::None
            }
            SettingKey::TileHeight
            | SettingKey::TileOpacity
            | SettingKey::TileWidth
            | SettingKey::TileSize
            | SettingKey::BaseColor => SideEffect::RebuildGrid,
            SettingKey::BeatEnabled | SettingKey::BeatImpact | SettingKey::CameraFov => {
                SideEffect::Reinit
            }
            SettingKey::SideLightIntensity
            | SettingKey::EnableLeftSideLight
            | SettingKey::EnableRightSideLight
            | SettingKey::EnableTopLight
            | SettingKey::TopLightIntensity => SideEffect::RebuildLights,
            SettingKey::LeftSideLightColor => SideEffect::SideLightColor(Side::Left),
            SettingKey::RightSideLightColor => SideEffect::SideLightColor(Side::Right),
        }
    }

    pub fn default_value(self) -> SettingValue {
        use SettingValue::*;
        match self {
            SettingKey::Fps => Uint(FPS_LIMIT),
            SettingKey::TileHeight => Float(TILE_HEIGHT),
            SettingKey::TileOpacity => Float(TILE_OPACITY),
            SettingKey::TileWidth => Float(TILE_WIDTH),
            SettingKey::TileSize => Float(SIZE),
            SettingKey::AnimationSpeed => Float(ANIMATION_SPEED),
            SettingKey::BaseColor => Color(Rgb::from_hex(BASE_COLOR)),
            SettingKey::BeatEnabled => Bool(BEAT_ENABLED),
            SettingKey::BeatImpact => Float(BEAT_IMPACT),
            SettingKey::BeatAnimationSpeed => Float(BEAT_ANIMATION_SPEED),
            SettingKey::SideLightIntensity => Float(DIRECT_LIGHT_INTENSITY),
            SettingKey::LeftSideLightColor => Color(Rgb::from_hex(LEFT_SIDE_LIGHT_COLOR)),
            SettingKey::RightSideLightColor => Color(Rgb::from_hex(RIGHT_SIDE_LIGHT_COLOR)),
            SettingKey::EnableLeftSideLight
            | SettingKey::EnableRightSideLight
            | SettingKey::EnableTopLight => Bool(true),
            SettingKey::TopLightIntensity => Float(DIRECT_TOP_LIGHT_INTENSITY),
            SettingKey::CameraFov => Float(CAMERA_FOV_DEG),
        }
    }

    /// Inclusive bounds for numeric keys.
    fn range(self) -> Option<(f32, f32)> {
        match self {
            SettingKey::Fps => Some((0.0, FPS_MAX as f32)),
            SettingKey::TileOpacity => Some((0.0, 1.0)),
            SettingKey::TileSize => Some((f32::MIN_POSITIVE, f32::MAX)),
            SettingKey::CameraFov => Some((1.0, 179.0)),
            SettingKey::TileHeight
            | SettingKey::TileWidth
            | SettingKey::AnimationSpeed
            | SettingKey::BeatImpact
            | SettingKey::BeatAnimationSpeed
            | SettingKey::SideLightIntensity
            | SettingKey::TopLightIntensity => Some((0.0, f32::MAX)),
            _ => None,
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SettingValue {
    Uint(u32),
    Float(f32),
    Bool(bool),
    Color(Rgb),
}

impl SettingValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SettingValue::Uint(_) => "uint",
            SettingValue::Float(_) => "float",
            SettingValue::Bool(_) => "bool",
            SettingValue::Color(_) => "color",
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            SettingValue::Float(v) => Some(v),
            SettingValue::Uint(v) => Some(v as f32),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            SettingValue::Uint(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            SettingValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgb> {
        match *self {
            SettingValue::Color(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
    #[error("setting `{key}` expects a {expected} value, got {got}")]
    TypeMismatch {
        key: SettingKey,
        expected: &'static str,
        got: &'static str,
    },
    #[error("setting `{key}` value {value} is out of range")]
    OutOfRange { key: SettingKey, value: f32 },
}

pub type Subscriber = Box<dyn FnMut(SettingKey, SettingValue)>;

/// Effects that came due in one `poll`.
pub type DueEffects = SmallVec<[SideEffect; 4]>;

pub struct Settings {
    values: FnvHashMap<SettingKey, SettingValue>,
    pending: FnvHashMap<SideEffect, Debouncer>,
    subscribers: Vec<Subscriber>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("values", &self.values)
            .field("pending", &self.pending.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Settings {
    pub fn new() -> Self {
        Self {
            values: SettingKey::ALL
                .into_iter()
                .map(|k| (k, k.default_value()))
                .collect(),
            pending: FnvHashMap::default(),
            subscribers: Vec::new(),
        }
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        self.values
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.default_value())
    }

    /// Store `value`, notify subscribers and arm the key's side effect.
    /// A rejected value leaves the previous one in place.
    pub fn set(
        &mut self,
        key: SettingKey,
        value: SettingValue,
        now: Instant,
    ) -> Result<SideEffect, SettingsError> {
        let value = Self::validate(key, value)?;
        self.values.insert(key, value);
        for sub in self.subscribers.iter_mut() {
            sub(key, value);
        }
        let effect = key.side_effect();
        if effect != SideEffect::None {
            self.pending
                .entry(effect)
                .or_insert_with(|| Debouncer::from_millis(SETTINGS_DEBOUNCE_MS))
                .poke(now);
        }
        log::debug!("[settings] {} = {:?}", key, value);
        Ok(effect)
    }

    fn validate(key: SettingKey, value: SettingValue) -> Result<SettingValue, SettingsError> {
        let expected = key.default_value();
        let value = match (expected, value) {
            // integral floats are accepted for uint keys
            (SettingValue::Uint(_), SettingValue::Float(v))
                if v.is_finite() && v >= 0.0 && v.fract() == 0.0 =>
            {
                SettingValue::Uint(v as u32)
            }
            (SettingValue::Float(_), SettingValue::Uint(v)) => SettingValue::Float(v as f32),
            (e, v) if std::mem::discriminant(&e) == std::mem::discriminant(&v) => v,
            (e, v) => {
                return Err(SettingsError::TypeMismatch {
                    key,
                    expected: e.type_name(),
                    got: v.type_name(),
                })
            }
        };
        if let (Some((lo, hi)), Some(v)) = (key.range(), value.as_f32()) {
            if !v.is_finite() || v < lo || v > hi {
                return Err(SettingsError::OutOfRange { key, value: v });
            }
        }
        Ok(value)
    }

    pub fn subscribe(&mut self, f: impl FnMut(SettingKey, SettingValue) + 'static) {
        self.subscribers.push(Box::new(f));
    }

    /// Side effects whose quiet period has elapsed, heaviest first.
    pub fn poll(&mut self, now: Instant) -> DueEffects {
        let mut due = DueEffects::new();
        for effect in SideEffect::ORDER {
            if let Some(d) = self.pending.get_mut(&effect) {
                if d.fire(now) {
                    due.push(effect);
                }
            }
        }
        self.pending.retain(|_, d| d.is_armed());
        let fired = due.clone();
        due.retain(|e| !fired.iter().any(|f| f.covers(*e)));
        due
    }

    pub fn has_pending(&self) -> bool {
        self.pending.values().any(Debouncer::is_armed)
    }

    fn float(&self, key: SettingKey) -> f32 {
        self.get(key)
            .as_f32()
            .or_else(|| key.default_value().as_f32())
            .unwrap_or_default()
    }

    fn flag(&self, key: SettingKey) -> bool {
        self.get(key).as_bool().unwrap_or(false)
    }

    fn color(&self, key: SettingKey) -> Rgb {
        self.get(key)
            .as_color()
            .or_else(|| key.default_value().as_color())
            .unwrap_or_default()
    }

    pub fn fps(&self) -> u32 {
        self.get(SettingKey::Fps).as_u32().unwrap_or(FPS_LIMIT)
    }

    pub fn tile_height(&self) -> f32 {
        self.float(SettingKey::TileHeight)
    }

    pub fn tile_opacity(&self) -> f32 {
        self.float(SettingKey::TileOpacity)
    }

    pub fn tile_width(&self) -> f32 {
        self.float(SettingKey::TileWidth)
    }

    pub fn tile_size(&self) -> f32 {
        self.float(SettingKey::TileSize)
    }

    /// Horizontal cell spacing; follows `tileSize`.
    pub fn unit(&self) -> f32 {
        3f32.sqrt() * self.tile_size()
    }

    pub fn animation_speed(&self) -> f32 {
        self.float(SettingKey::AnimationSpeed)
    }

    /// Color cells return to at the end of an animation.
    pub fn base_color(&self) -> Rgb {
        self.color(SettingKey::BaseColor)
    }

    pub fn beat_enabled(&self) -> bool {
        self.flag(SettingKey::BeatEnabled)
    }

    pub fn beat_impact(&self) -> f32 {
        self.float(SettingKey::BeatImpact)
    }

    pub fn beat_animation_speed(&self) -> f32 {
        self.float(SettingKey::BeatAnimationSpeed)
    }

    pub fn side_light_color(&self, side: Side) -> Rgb {
        match side {
            Side::Left => self.color(SettingKey::LeftSideLightColor),
            Side::Right => self.color(SettingKey::RightSideLightColor),
        }
    }

    pub fn camera_fov(&self) -> f32 {
        self.float(SettingKey::CameraFov)
    }

    pub fn light_config(&self) -> LightConfig {
        LightConfig {
            tile_size: self.tile_size(),
            tile_height: self.tile_height(),
            tile_opacity: self.tile_opacity(),
            beat_enabled: self.beat_enabled(),
            beat_impact: self.beat_impact(),
            beat_animation_speed: self.beat_animation_speed(),
            side_intensity: self.float(SettingKey::SideLightIntensity),
            top_intensity: self.float(SettingKey::TopLightIntensity),
            left_color: self.side_light_color(Side::Left),
            right_color: self.side_light_color(Side::Right),
            enable_left: self.flag(SettingKey::EnableLeftSideLight),
            enable_right: self.flag(SettingKey::EnableRightSideLight),
            enable_top: self.flag(SettingKey::EnableTopLight),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn defaults_match_constants() {
        let s = Settings::new();
        assert_eq!(s.fps(), FPS_LIMIT);
        assert_eq!(s.tile_size(), SIZE);
        assert!((s.unit() - 3f32.sqrt()).abs() < 1e-6);
        assert_eq!(s.base_color(), Rgb::from_hex(BASE_COLOR));
        assert_eq!(s.light_config(), LightConfig::default());
    }

    #[test]
    fn names_parse_back() {
        for key in SettingKey::ALL {
            assert_eq!(key.name().parse::<SettingKey>(), Ok(key));
        }
        assert!("antialias".parse::<SettingKey>().is_err());
    }

    #[test]
    fn rejected_value_keeps_previous() {
        let mut s = Settings::new();
        let now = Instant::now();
        let err = s
            .set(SettingKey::TileSize, SettingValue::Bool(true), now)
            .unwrap_err();
        assert!(matches!(err, SettingsError::TypeMismatch { .. }));
        let err = s
            .set(SettingKey::TileOpacity, SettingValue::Float(1.5), now)
            .unwrap_err();
        assert_eq!(
            err,
            SettingsError::OutOfRange {
                key: SettingKey::TileOpacity,
                value: 1.5
            }
        );
        assert_eq!(s.tile_opacity(), TILE_OPACITY);
        assert!(!s.has_pending());
    }

    #[test]
    fn subscribers_see_changes_synchronously() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut s = Settings::new();
        let sink = seen.clone();
        s.subscribe(move |k, v| sink.borrow_mut().push((k, v)));
        s.set(SettingKey::Fps, SettingValue::Uint(30), Instant::now())
            .unwrap();
        assert_eq!(
            seen.borrow().as_slice(),
            &[(SettingKey::Fps, SettingValue::Uint(30))]
        );
    }

    #[test]
    fn immediate_keys_arm_nothing() {
        let mut s = Settings::new();
        let effect = s
            .set(SettingKey::AnimationSpeed, SettingValue::Float(2.0), Instant::now())
            .unwrap();
        assert_eq!(effect, SideEffect::None);
        assert!(!s.has_pending());
        assert_eq!(s.animation_speed(), 2.0);
    }

    #[test]
    fn side_effects_are_debounced_and_coalesced() {
        let mut s = Settings::new();
        let t0 = Instant::now();
        s.set(SettingKey::TileSize, SettingValue::Float(2.0), t0).unwrap();
        s.set(
            SettingKey::TileHeight,
            SettingValue::Float(0.4),
            t0 + Duration::from_millis(100),
        )
        .unwrap();
        s.set(
            SettingKey::BeatImpact,
            SettingValue::Float(0.5),
            t0 + Duration::from_millis(100),
        )
        .unwrap();
        assert!(s.poll(t0 + Duration::from_millis(250)).is_empty());
        let due = s.poll(t0 + Duration::from_millis(300));
        assert_eq!(due.as_slice(), &[SideEffect::Reinit]);
        assert!(!s.has_pending());
    }

    #[test]
    fn grid_rebuild_absorbs_light_rebuild() {
        let mut s = Settings::new();
        let t0 = Instant::now();
        s.set(SettingKey::TileWidth, SettingValue::Float(1.2), t0).unwrap();
        s.set(SettingKey::TopLightIntensity, SettingValue::Float(0.4), t0).unwrap();
        s.set(
            SettingKey::LeftSideLightColor,
            SettingValue::Color(Rgb::new(1.0, 0.0, 0.0)),
            t0,
        )
        .unwrap();
        let due = s.poll(t0 + Duration::from_secs(1));
        assert_eq!(
            due.as_slice(),
            &[SideEffect::RebuildGrid, SideEffect::SideLightColor(Side::Left)]
        );
    }

    #[test]
    fn integral_float_is_accepted_for_fps() {
        let mut s = Settings::new();
        s.set(SettingKey::Fps, SettingValue::Float(0.0), Instant::now())
            .unwrap();
        assert_eq!(s.fps(), 0);
    }
}
