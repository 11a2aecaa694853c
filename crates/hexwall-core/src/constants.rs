// Default tuning values. Runtime overrides go through `Settings`.

// Grid geometry
pub const SIZE: f32 = 1.0; // hex circumradius used for layout spacing
pub const TILE_WIDTH: f32 = SIZE * 0.9; // rendered prism radius
pub const TILE_HEIGHT: f32 = 0.2; // rendered prism depth along z
pub const TILE_OPACITY: f32 = 1.0;
pub const MESH_Z_OFFSET: f32 = 0.5; // whole mesh is pushed toward the camera

// Camera
pub const CAMERA_Z_DISTANCE: f32 = 10.0;
pub const CAMERA_FOV_DEG: f32 = 70.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 50.0;

// Palette
pub const BASE_COLOR: u32 = 0x14242f;
pub const AMBIENT_LIGHT_COLOR: u32 = 0xffffff;
pub const LEFT_SIDE_LIGHT_COLOR: u32 = 0x33ffff;
pub const RIGHT_SIDE_LIGHT_COLOR: u32 = 0xff33ff;
pub const TOP_LIGHT_COLOR: u32 = 0xeeeeee;

// Random intro color band (HSL); kept cool and light
pub const RNG_HUE_MIN: f32 = 0.5;
pub const RNG_HUE_SPAN: f32 = 0.3;
pub const RNG_SATURATION: f32 = 0.95;
pub const RNG_LIGHTNESS_MIN: f32 = 0.65;
pub const RNG_LIGHTNESS_SPAN: f32 = 0.3;

// Host-supplied base colors are darkened to this fraction of their lightness
pub const BASE_COLOR_LIGHTNESS_SCALE: f32 = 0.1;

// Animation
pub const ANIMATION_SPEED: f32 = 4.0;
pub const BEAT_ANIMATION_SPEED: f32 = 60.0;
pub const SIDE_LIGHT_COLOR_TIME: f32 = 4.0; // animation seconds
pub const FPS_LIMIT: u32 = 60;
pub const FPS_MAX: u32 = 240;

// Beat reaction
pub const BEAT_ENABLED: bool = true;
pub const BEAT_IMPACT: f32 = 1.0;
pub const BEAT_CHANGE_THRESHOLD: f32 = 0.01; // min signal delta that schedules a new cycle
pub const SPECTRUM_BINS: usize = 128;

// Light intensities
pub const DIRECT_LIGHT_INTENSITY: f32 = 0.5;
pub const AMBIENT_LIGHT_INTENSITY: f32 = 0.9;
pub const DIRECT_TOP_LIGHT_INTENSITY: f32 = 0.4;
pub const TOP_LIGHT_DISTANCE_UNITS: f32 = 100.0;

// Debounce windows (milliseconds)
pub const SETTINGS_DEBOUNCE_MS: u64 = 200;
pub const RESIZE_DEBOUNCE_MS: u64 = 200;
