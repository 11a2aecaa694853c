//! Scene lights and their beat-reactive animation.
//!
//! The rig holds up to four lights (ambient, left, right, top). Lights are
//! plain data here; the renderer reads them through `LightRig::ordered`.
//! `BeatAnimator` turns spectrum samples into short intensity/position pulses
//! and `SideLightColorAnimator` runs one-shot side light color changes.

use crate::animate::effective_speed;
use crate::color::Rgb;
use crate::constants::{
    AMBIENT_LIGHT_COLOR, AMBIENT_LIGHT_INTENSITY, BEAT_ANIMATION_SPEED, BEAT_CHANGE_THRESHOLD,
    BEAT_ENABLED, BEAT_IMPACT, DIRECT_LIGHT_INTENSITY, DIRECT_TOP_LIGHT_INTENSITY,
    LEFT_SIDE_LIGHT_COLOR, RIGHT_SIDE_LIGHT_COLOR, SIDE_LIGHT_COLOR_TIME, SIZE, TILE_HEIGHT,
    TILE_OPACITY, TOP_LIGHT_COLOR, TOP_LIGHT_DISTANCE_UNITS,
};
use crate::schedule::{FrameHandle, FrameQueue, FrameTask};
use fnv::FnvHashMap;
use glam::{Vec2, Vec3};
use instant::Instant;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LightKind {
    Ambient,
    Left,
    Right,
    Top,
}

impl LightKind {
    pub const ALL: [LightKind; 4] = [
        LightKind::Ambient,
        LightKind::Left,
        LightKind::Right,
        LightKind::Top,
    ];

    pub fn is_directional(self) -> bool {
        !matches!(self, LightKind::Ambient)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn kind(self) -> LightKind {
        match self {
            Side::Left => LightKind::Left,
            Side::Right => LightKind::Right,
        }
    }
}

/// Inputs the rig needs from the settings store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightConfig {
    pub tile_size: f32,
    pub tile_height: f32,
    pub tile_opacity: f32,
    pub beat_enabled: bool,
    pub beat_impact: f32,
    pub beat_animation_speed: f32,
    pub side_intensity: f32,
    pub top_intensity: f32,
    pub left_color: Rgb,
    pub right_color: Rgb,
    pub enable_left: bool,
    pub enable_right: bool,
    pub enable_top: bool,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            tile_size: SIZE,
            tile_height: TILE_HEIGHT,
            tile_opacity: TILE_OPACITY,
            beat_enabled: BEAT_ENABLED,
            beat_impact: BEAT_IMPACT,
            beat_animation_speed: BEAT_ANIMATION_SPEED,
            side_intensity: DIRECT_LIGHT_INTENSITY,
            top_intensity: DIRECT_TOP_LIGHT_INTENSITY,
            left_color: Rgb::from_hex(LEFT_SIDE_LIGHT_COLOR),
            right_color: Rgb::from_hex(RIGHT_SIDE_LIGHT_COLOR),
            enable_left: true,
            enable_right: true,
            enable_top: true,
        }
    }
}

impl LightConfig {
    #[inline]
    pub fn unit(&self) -> f32 {
        3f32.sqrt() * self.tile_size
    }

    /// Share of a light's intensity handed over to beats.
    pub fn beat_impact_for(&self, kind: LightKind) -> f32 {
        if !self.beat_enabled {
            return 0.0;
        }
        match kind {
            LightKind::Ambient if self.beat_impact > 0.3 => self.beat_impact * 0.9,
            LightKind::Ambient => 0.0,
            _ => self.beat_impact * 0.75,
        }
    }

    /// Rest intensity: the part not reserved for beats, compensated for tile opacity.
    pub fn initial_light_intensity(&self, base: f32, impact: f32) -> f32 {
        if self.tile_opacity <= 0.0 {
            return 1.0;
        }
        let share = if self.beat_enabled {
            base * (1.0 - impact)
        } else {
            base
        };
        share / self.tile_opacity
    }

    pub fn max_intensity(&self, kind: LightKind) -> f32 {
        match kind {
            LightKind::Ambient => AMBIENT_LIGHT_INTENSITY,
            LightKind::Left | LightKind::Right => self.side_intensity,
            LightKind::Top => self.top_intensity,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub color: Rgb,
    pub intensity: f32,
    pub position: Vec3,
    /// Point the light aims at; unused for ambient.
    pub target: Vec3,
    /// False once detached from the scene by `remove_lights`.
    pub attached: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneLight {
    pub light: Light,
    pub initial_intensity: f32,
    pub initial_position: Option<Vec3>,
    pub max_intensity: f32,
}

#[derive(Debug, Default)]
pub struct LightRig {
    lights: FnvHashMap<LightKind, SceneLight>,
    z_amplitude: f32,
}

impl LightRig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the lights for a grid centred on `center`. Returns how many were added.
    pub fn add_lights(&mut self, cfg: &LightConfig, center: Vec2) -> usize {
        if cfg.tile_opacity <= 0.0 {
            return 0;
        }
        self.z_amplitude = cfg.tile_size / 4.0 * cfg.beat_impact;
        let target = center.extend(0.0);
        let side_z = -(cfg.tile_height
            + cfg.tile_size * if cfg.beat_enabled { cfg.beat_impact } else { 1.0 })
            * 2.0;

        let ambient = cfg.initial_light_intensity(
            AMBIENT_LIGHT_INTENSITY,
            cfg.beat_impact_for(LightKind::Ambient),
        );
        self.insert(
            LightKind::Ambient,
            Rgb::from_hex(AMBIENT_LIGHT_COLOR),
            ambient,
            None,
            target,
            cfg,
        );
        let direct = cfg.beat_impact_for(LightKind::Left);
        if cfg.enable_left {
            let position = Vec3::new(
                -center.x * 0.5 - cfg.tile_size,
                center.y + cfg.tile_size,
                side_z,
            );
            let intensity = cfg.initial_light_intensity(cfg.side_intensity, direct);
            self.insert(
                LightKind::Left,
                cfg.left_color,
                intensity,
                Some(position),
                target,
                cfg,
            );
        }
        if cfg.enable_right {
            let position = Vec3::new(
                center.x * 0.5 + cfg.tile_size,
                -center.y + cfg.tile_size,
                side_z,
            );
            let intensity = cfg.initial_light_intensity(cfg.side_intensity, direct);
            self.insert(
                LightKind::Right,
                cfg.right_color,
                intensity,
                Some(position),
                target,
                cfg,
            );
        }
        if cfg.enable_top {
            let position = Vec3::new(0.0, 0.0, TOP_LIGHT_DISTANCE_UNITS * cfg.unit());
            let intensity = cfg.initial_light_intensity(
                cfg.top_intensity,
                cfg.beat_impact_for(LightKind::Top),
            );
            self.insert(
                LightKind::Top,
                Rgb::from_hex(TOP_LIGHT_COLOR),
                intensity,
                Some(position),
                target,
                cfg,
            );
        }
        log::info!("[lights] added {}", self.lights.len());
        self.lights.len()
    }

    fn insert(
        &mut self,
        kind: LightKind,
        color: Rgb,
        intensity: f32,
        position: Option<Vec3>,
        target: Vec3,
        cfg: &LightConfig,
    ) {
        self.lights.insert(
            kind,
            SceneLight {
                light: Light {
                    color,
                    intensity,
                    position: position.unwrap_or(Vec3::ZERO),
                    target,
                    attached: true,
                },
                initial_intensity: intensity,
                initial_position: position,
                max_intensity: cfg.max_intensity(kind),
            },
        );
    }

    /// Detach every light from the scene; entries stay until disposed.
    pub fn remove_lights(&mut self) {
        for l in self.lights.values_mut() {
            l.light.attached = false;
        }
    }

    pub fn dispose_lights(&mut self) {
        self.lights.clear();
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn z_amplitude(&self) -> f32 {
        self.z_amplitude
    }

    pub fn get(&self, kind: LightKind) -> Option<&SceneLight> {
        self.lights.get(&kind)
    }

    pub fn get_mut(&mut self, kind: LightKind) -> Option<&mut SceneLight> {
        self.lights.get_mut(&kind)
    }

    /// Attached lights in a stable order.
    pub fn ordered(&self) -> impl Iterator<Item = (LightKind, &SceneLight)> {
        LightKind::ALL.into_iter().filter_map(move |k| {
            self.lights
                .get(&k)
                .filter(|l| l.light.attached)
                .map(|l| (k, l))
        })
    }
}

/// Scalar signals derived from one 128-bin spectrum sample, each in \[0, 1\].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BeatSignals {
    pub left_mid: f32,
    pub right_mid: f32,
    pub left_beat: f32,
    pub right_beat: f32,
    pub snare: f32,
    pub max_beat: f32,
}

fn bin_max(bins: &[f32], start: usize, end: usize) -> f32 {
    let end = end.min(bins.len());
    if start >= end {
        return 0.0;
    }
    bins[start..end]
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0, f32::max)
        .clamp(0.0, 1.0)
}

impl BeatSignals {
    /// Short or noisy arrays are tolerated: missing bins read as silence.
    pub fn from_spectrum(bins: &[f32]) -> Self {
        let left_beat = bin_max(bins, 0, 3);
        let right_beat = bin_max(bins, 64, 67);
        Self {
            left_mid: bin_max(bins, 10, 40),
            right_mid: bin_max(bins, 74, 104),
            left_beat,
            right_beat,
            snare: bin_max(bins, 5, 10).max(bin_max(bins, 69, 74)),
            max_beat: left_beat.max(right_beat),
        }
    }

    /// Largest change of the signals that drive animation.
    pub fn max_delta(&self, prev: &BeatSignals) -> f32 {
        (self.max_beat - prev.max_beat)
            .abs()
            .max((self.left_mid - prev.left_mid).abs())
            .max((self.right_mid - prev.right_mid).abs())
            .max((self.snare - prev.snare).abs())
    }
}

/// Up to a beat-scaled peak in the first half, back to rest in the second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntensityLerp {
    pub from: f32,
    pub peak: f32,
    pub rest: f32,
}

impl IntensityLerp {
    pub fn on_beat(from: f32, rest: f32, max: f32, beat_impact: f32, signal: f32) -> Self {
        let max = if max > 0.0 { max } else { DIRECT_LIGHT_INTENSITY };
        let peak = rest.max((rest * (1.0 - beat_impact) + max * beat_impact * signal).min(max));
        // an interrupted louder pulse must not make the rise half fall
        let from = from.min(peak);
        Self { from, peak, rest }
    }

    pub fn value(&self, delta: f32) -> f32 {
        let d = delta.clamp(0.0, 1.0);
        if d >= 1.0 {
            self.rest
        } else if d < 0.5 {
            lerp(self.from, self.peak, d * 2.0)
        } else {
            lerp(self.peak, self.rest, (d - 0.5) * 2.0)
        }
    }
}

/// Push a side light outward, then ease it home (40/60 split).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionLerp {
    pub target: Vec3,
    pub rest: Vec3,
}

impl PositionLerp {
    pub fn on_beat(rest: Vec3, beat_impact: f32, signal: f32, z_amplitude: f32) -> Self {
        let amplitude = (beat_impact * signal * 0.5).sin();
        let z_max = rest.z * z_amplitude;
        let z_gain = if z_amplitude != 0.0 { z_amplitude } else { 1.0 };
        let mut z = z_max * (1.0 - amplitude) * z_gain;
        if z.abs() > z_max.abs() {
            z = z_max;
        }
        Self {
            target: Vec3::new(rest.x * (1.0 + amplitude), rest.y * (1.0 + amplitude), z),
            rest,
        }
    }

    /// Moves `current` toward the pulse target, or back toward rest; compounds per frame.
    pub fn apply(&self, current: Vec3, delta: f32) -> Vec3 {
        let d = delta.clamp(0.0, 1.0);
        if d >= 1.0 {
            self.rest
        } else if d < 0.4 {
            current.lerp(self.target, d * 2.5)
        } else {
            current.lerp(self.rest, (d - 0.4) / 0.6)
        }
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[derive(Clone, Debug)]
struct BeatCycle {
    started_at: Instant,
    speed: f32,
    window: f32,
    intensity: SmallVec<[(LightKind, IntensityLerp); 4]>,
    position: SmallVec<[(LightKind, PositionLerp); 2]>,
}

#[derive(Debug, Default)]
pub struct BeatAnimator {
    prev: BeatSignals,
    handle: Option<FrameHandle>,
    cycle: Option<BeatCycle>,
}

impl BeatAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn handle(&self) -> Option<FrameHandle> {
        self.handle
    }

    pub fn last_signals(&self) -> &BeatSignals {
        &self.prev
    }

    /// Feed one spectrum sample. Returns true when a new pulse was scheduled.
    pub fn on_sample(
        &mut self,
        bins: &[f32],
        cfg: &LightConfig,
        rig: &LightRig,
        queue: &mut FrameQueue,
        now: Instant,
    ) -> bool {
        if !cfg.beat_enabled || rig.is_empty() || cfg.beat_impact == 0.0 {
            return false;
        }
        let signals = BeatSignals::from_spectrum(bins);
        if signals.max_delta(&self.prev) <= BEAT_CHANGE_THRESHOLD {
            return false;
        }
        self.prev = signals;
        self.cancel(queue);

        let mut cycle = BeatCycle {
            started_at: now,
            speed: effective_speed(cfg.beat_animation_speed),
            window: 0.0,
            intensity: SmallVec::new(),
            position: SmallVec::new(),
        };
        cycle.window = 1000.0 / cycle.speed;
        for (kind, l) in LightKind::ALL
            .into_iter()
            .filter_map(|k| rig.get(k).map(|l| (k, l)))
        {
            let signal = match kind {
                LightKind::Ambient | LightKind::Top => signals.max_beat,
                LightKind::Left | LightKind::Right => signals.snare,
            };
            cycle.intensity.push((
                kind,
                IntensityLerp::on_beat(
                    l.light.intensity,
                    l.initial_intensity,
                    l.max_intensity,
                    cfg.beat_impact,
                    signal,
                ),
            ));
            let mid = match kind {
                LightKind::Left => signals.left_mid,
                LightKind::Right => signals.right_mid,
                _ => continue,
            };
            if let Some(rest) = l.initial_position {
                cycle.position.push((
                    kind,
                    PositionLerp::on_beat(rest, cfg.beat_impact, mid, rig.z_amplitude()),
                ));
            }
        }
        log::trace!("[beat] pulse max_beat={:.2}", signals.max_beat);
        self.cycle = Some(cycle);
        self.handle = Some(queue.request(FrameTask::Beat));
        true
    }

    /// Advance the current pulse. Returns true when any light changed.
    pub fn tick(
        &mut self,
        now: Instant,
        cfg: &LightConfig,
        rig: &mut LightRig,
        queue: &mut FrameQueue,
    ) -> bool {
        self.handle = None;
        let Some(cycle) = self.cycle.as_ref() else {
            return false;
        };
        if rig.is_empty() || !cfg.beat_enabled {
            self.cycle = None;
            return false;
        }
        let t = cycle.speed * now.saturating_duration_since(cycle.started_at).as_secs_f32();
        let delta = t / cycle.window;
        for (kind, lerp) in &cycle.intensity {
            if *kind == LightKind::Ambient && cfg.beat_impact <= 0.5 {
                continue;
            }
            if let Some(l) = rig.get_mut(*kind) {
                l.light.intensity = lerp.value(delta);
            }
        }
        for (kind, lerp) in &cycle.position {
            if let Some(l) = rig.get_mut(*kind) {
                l.light.position = lerp.apply(l.light.position, delta);
            }
        }
        if t < cycle.window {
            self.handle = Some(queue.request(FrameTask::Beat));
        } else {
            self.cycle = None;
        }
        true
    }

    pub fn cancel(&mut self, queue: &mut FrameQueue) {
        if let Some(h) = self.handle.take() {
            queue.cancel(h);
        }
        self.cycle = None;
    }
}

#[derive(Clone, Copy, Debug)]
struct ColorTransition {
    to: Rgb,
    started_at: Instant,
    speed: f32,
    window: f32,
    handle: Option<FrameHandle>,
}

/// One-shot side light color transitions, independent of beats.
#[derive(Debug, Default)]
pub struct SideLightColorAnimator {
    left: Option<ColorTransition>,
    right: Option<ColorTransition>,
}

impl SideLightColorAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, side: Side) -> &mut Option<ColorTransition> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn is_active(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left.is_some(),
            Side::Right => self.right.is_some(),
        }
    }

    pub fn start(
        &mut self,
        side: Side,
        color: Rgb,
        animation_speed: f32,
        rig: &LightRig,
        queue: &mut FrameQueue,
        now: Instant,
    ) -> bool {
        if rig.get(side.kind()).is_none() {
            return false;
        }
        self.cancel(side, queue);
        let speed = effective_speed(animation_speed);
        *self.slot(side) = Some(ColorTransition {
            to: color,
            started_at: now,
            speed,
            window: SIDE_LIGHT_COLOR_TIME,
            handle: Some(queue.request(FrameTask::SideLightColor(side))),
        });
        true
    }

    pub fn tick(
        &mut self,
        side: Side,
        now: Instant,
        rig: &mut LightRig,
        queue: &mut FrameQueue,
    ) -> bool {
        let slot = self.slot(side);
        let Some(tr) = slot.as_mut() else {
            return false;
        };
        tr.handle = None;
        let Some(l) = rig.get_mut(side.kind()) else {
            *slot = None;
            return false;
        };
        let t = tr.speed * now.saturating_duration_since(tr.started_at).as_secs_f32();
        let delta = (t / tr.window).clamp(0.0, 1.0);
        l.light.color = if delta >= 1.0 {
            tr.to
        } else {
            l.light.color.lerp(tr.to, delta)
        };
        if t < tr.window {
            tr.handle = Some(queue.request(FrameTask::SideLightColor(side)));
        } else {
            *slot = None;
        }
        true
    }

    pub fn cancel(&mut self, side: Side, queue: &mut FrameQueue) {
        if let Some(h) = self.slot(side).take().and_then(|t| t.handle) {
            queue.cancel(h);
        }
    }

    pub fn cancel_all(&mut self, queue: &mut FrameQueue) {
        self.cancel(Side::Left, queue);
        self.cancel(Side::Right, queue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn rig(cfg: &LightConfig) -> LightRig {
        let mut rig = LightRig::new();
        rig.add_lights(cfg, Vec2::new(10.0, 6.0));
        rig
    }

    #[test]
    fn add_lights_places_rig_around_center() {
        let cfg = LightConfig::default();
        let rig = rig(&cfg);
        assert_eq!(rig.len(), 4);
        let left = rig.get(LightKind::Left).unwrap();
        assert!(left.light.position.abs_diff_eq(Vec3::new(-6.0, 7.0, -2.4), 1e-5));
        assert_eq!(left.light.target, Vec3::new(10.0, 6.0, 0.0));
        let top = rig.get(LightKind::Top).unwrap();
        assert!((top.light.position.z - 100.0 * 3f32.sqrt()).abs() < 1e-4);
        // beat impact 1: direct lights keep a quarter at rest
        assert!((left.initial_intensity - 0.125).abs() < 1e-6);
        assert!(rig.get(LightKind::Ambient).unwrap().initial_position.is_none());
    }

    #[test]
    fn zero_opacity_skips_lights() {
        let cfg = LightConfig {
            tile_opacity: 0.0,
            ..LightConfig::default()
        };
        assert!(rig(&cfg).is_empty());
    }

    #[test]
    fn disabled_lights_are_not_created() {
        let cfg = LightConfig {
            enable_left: false,
            enable_top: false,
            ..LightConfig::default()
        };
        let rig = rig(&cfg);
        let kinds: Vec<_> = rig.ordered().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![LightKind::Ambient, LightKind::Right]);
    }

    #[test]
    fn remove_detaches_dispose_clears() {
        let cfg = LightConfig::default();
        let mut rig = rig(&cfg);
        rig.remove_lights();
        assert_eq!(rig.len(), 4);
        assert_eq!(rig.ordered().count(), 0);
        rig.dispose_lights();
        assert!(rig.is_empty());
    }

    #[test]
    fn signals_tolerate_short_and_loud_input() {
        let s = BeatSignals::from_spectrum(&[2.0, 0.5]);
        assert_eq!(s.left_beat, 1.0);
        assert_eq!(s.right_mid, 0.0);
        assert_eq!(BeatSignals::from_spectrum(&[]), BeatSignals::default());
    }

    #[test]
    fn snare_reads_both_channels() {
        let mut bins = vec![0.0; 128];
        bins[70] = 0.6;
        assert_eq!(BeatSignals::from_spectrum(&bins).snare, 0.6);
    }

    #[test]
    fn intensity_rises_then_falls() {
        for impact in [0.1, 0.5, 1.0] {
            for signal in [0.0, 0.3, 1.0] {
                let l = IntensityLerp::on_beat(0.2, 0.2, 0.9, impact, signal);
                let mut prev = l.value(0.0);
                for i in 1..=50 {
                    let v = l.value(i as f32 / 100.0);
                    assert!(v >= prev);
                    prev = v;
                }
                for i in 51..=100 {
                    let v = l.value(i as f32 / 100.0);
                    assert!(v <= prev + 1e-6);
                    prev = v;
                }
                assert_eq!(l.value(1.0), 0.2);
            }
        }
    }

    #[test]
    fn weaker_beat_mid_pulse_never_dips_on_the_rise() {
        let loud = IntensityLerp::on_beat(0.2, 0.2, 0.9, 1.0, 1.0);
        let at_peak = loud.value(0.5);
        let quiet = IntensityLerp::on_beat(at_peak, 0.2, 0.9, 0.5, 0.3);
        assert!(quiet.peak < at_peak);
        assert_eq!(quiet.value(0.0), quiet.peak);
        let mut prev = quiet.value(0.0);
        for i in 1..=50 {
            let v = quiet.value(i as f32 / 100.0);
            assert!(v >= prev - 1e-6);
            prev = v;
        }
    }

    #[test]
    fn position_pulse_pushes_outward() {
        let rest = Vec3::new(-4.0, 3.0, -2.0);
        let p = PositionLerp::on_beat(rest, 1.0, 1.0, 0.25);
        assert!(p.target.x < rest.x);
        assert!(p.target.y > rest.y);
        assert_eq!(p.apply(Vec3::ZERO, 1.0), rest);
    }

    #[test]
    fn steady_signal_schedules_once() {
        let cfg = LightConfig::default();
        let rig = rig(&cfg);
        let mut q = FrameQueue::new();
        let mut beat = BeatAnimator::new();
        let mut bins = vec![0.0; 128];
        bins[1] = 0.8;
        let now = Instant::now();
        assert!(beat.on_sample(&bins, &cfg, &rig, &mut q, now));
        assert!(!beat.on_sample(&bins, &cfg, &rig, &mut q, now));
        assert_eq!(q.count(FrameTask::Beat), 1);
        assert!(beat.is_active());
    }

    #[test]
    fn beat_disabled_is_a_no_op() {
        let cfg = LightConfig {
            beat_enabled: false,
            ..LightConfig::default()
        };
        let rig = rig(&cfg);
        let mut q = FrameQueue::new();
        let mut beat = BeatAnimator::new();
        assert!(!beat.on_sample(&[1.0; 128], &cfg, &rig, &mut q, Instant::now()));
        assert!(q.is_empty());
    }

    #[test]
    fn pulse_settles_back_to_rest() {
        let cfg = LightConfig::default();
        let mut rig = rig(&cfg);
        let mut q = FrameQueue::new();
        let mut beat = BeatAnimator::new();
        let t0 = Instant::now();
        beat.on_sample(&[1.0; 128], &cfg, &rig, &mut q, t0);
        let mut now = t0;
        for _ in 0..40 {
            now += Duration::from_millis(16);
            if q.drain().iter().any(|(_, t)| *t == FrameTask::Beat) {
                beat.tick(now, &cfg, &mut rig, &mut q);
            }
        }
        assert!(!beat.is_active());
        let left = rig.get(LightKind::Left).unwrap();
        assert_eq!(left.light.intensity, left.initial_intensity);
        assert_eq!(Some(left.light.position), left.initial_position);
    }

    #[test]
    fn side_color_reaches_target() {
        let cfg = LightConfig::default();
        let mut rig = rig(&cfg);
        let mut q = FrameQueue::new();
        let mut anim = SideLightColorAnimator::new();
        let t0 = Instant::now();
        let red = Rgb::new(1.0, 0.0, 0.0);
        assert!(anim.start(Side::Left, red, 40.0, &rig, &mut q, t0));
        let mut now = t0;
        for _ in 0..20 {
            now += Duration::from_millis(16);
            for (_, task) in q.drain() {
                if let FrameTask::SideLightColor(side) = task {
                    anim.tick(side, now, &mut rig, &mut q);
                }
            }
        }
        assert!(!anim.is_active(Side::Left));
        assert_eq!(rig.get(LightKind::Left).unwrap().light.color, red);
    }
}
