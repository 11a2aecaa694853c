/// Front-end tuning constants: DOM hooks and post-processing.
///
/// Scene defaults (tile size, camera, colors) live in `hexwall_core::constants`;
/// only values the browser side needs are kept here.
pub const CANVAS_ID: &str = "webgl-canvas";

// Canvas fades out while a resize settles, then back in
pub const CLASS_VISIBLE: &str = "opacity-100";
pub const CLASS_HIDDEN: &str = "opacity-0";

// Bloom (threshold 0 lets every lit tile glow)
pub const BLOOM_STRENGTH: f32 = 1.5;
pub const BLOOM_THRESHOLD: f32 = 0.0;
pub const BLOOM_RADIUS: f32 = 0.05; // blur step scale in bloom texels

// Clear color of the scene target; the page background shows through the alpha
pub const CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.0, 0.0];

// Lighting constants shared with the hex shader
pub const MAX_LIGHTS: usize = 4;
pub const LIGHT_KIND_AMBIENT: f32 = 0.0;
pub const LIGHT_KIND_DIRECTIONAL: f32 = 1.0;

// Device pixel ratio bounds for the backing store
pub const DPR_MIN: f64 = 1.0;
pub const DPR_MAX: f64 = 3.0;
