//! Platform-free core of the hexwall wallpaper: grid, per-cell animation,
//! beat-reactive lights, settings and frame scheduling.
//!
//! Nothing here touches the DOM or the GPU. The host owns an [`Engine`],
//! forwards input and audio to it and calls [`Engine::frame`] from its
//! animation-frame callback while [`Engine::has_pending_frame`] holds.

pub mod animate;
pub mod camera;
pub mod color;
pub mod constants;
pub mod easing;
pub mod engine;
pub mod grid;
pub mod lights;
pub mod phase;
pub mod pick;
pub mod property;
pub mod render;
pub mod schedule;
pub mod settings;

pub use animate::TriggerKind;
pub use camera::Camera;
pub use color::Rgb;
pub use engine::{Engine, FrameOutcome};
pub use grid::{Grid, InstanceRaw, MeshVertex};
pub use lights::{LightKind, Side};
pub use property::{PropertyError, PropertyValue};
pub use render::Viewport;
pub use settings::{SettingKey, SettingValue, Settings, SettingsError, SideEffect};
