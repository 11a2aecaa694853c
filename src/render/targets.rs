use super::helpers::{offscreen_texture, DEPTH_FORMAT, HDR_FORMAT};

/// Offscreen targets: full-resolution HDR scene color with its depth buffer,
/// plus two half-resolution bloom ping-pong textures.
pub(crate) struct RenderTargets {
    _hdr_tex: wgpu::Texture,
    pub(crate) hdr_view: wgpu::TextureView,
    _depth_tex: wgpu::Texture,
    pub(crate) depth_view: wgpu::TextureView,
    _bloom_a: wgpu::Texture,
    pub(crate) bloom_a_view: wgpu::TextureView,
    _bloom_b: wgpu::Texture,
    pub(crate) bloom_b_view: wgpu::TextureView,
}

#[inline]
pub(crate) fn bloom_size(width: u32, height: u32) -> (u32, u32) {
    ((width.max(1) / 2).max(1), (height.max(1) / 2).max(1))
}

impl RenderTargets {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let full = (width, height);
        let (hdr_tex, hdr_view) = offscreen_texture(device, "hdr_tex", full, HDR_FORMAT);
        let (depth_tex, depth_view) = offscreen_texture(device, "depth_tex", full, DEPTH_FORMAT);
        let half = bloom_size(width, height);
        let (bloom_a, bloom_a_view) = offscreen_texture(device, "bloom_a", half, HDR_FORMAT);
        let (bloom_b, bloom_b_view) = offscreen_texture(device, "bloom_b", half, HDR_FORMAT);
        Self {
            _hdr_tex: hdr_tex,
            hdr_view,
            _depth_tex: depth_tex,
            depth_view,
            _bloom_a: bloom_a,
            bloom_a_view,
            _bloom_b: bloom_b,
            bloom_b_view,
        }
    }

    pub(crate) fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        *self = Self::new(device, width, height);
    }
}
