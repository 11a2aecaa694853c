use super::helpers::{self, sampler_entry, texture_entry, HDR_FORMAT};
use super::targets::{bloom_size, RenderTargets};
use crate::constants::{BLOOM_RADIUS, BLOOM_STRENGTH, BLOOM_THRESHOLD};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct PostUniforms {
    resolution: [f32; 2],
    blur_dir: [f32; 2],
    bloom_strength: f32,
    threshold: f32,
    radius: f32,
    _pad: f32,
}

impl PostUniforms {
    fn new(resolution: [f32; 2], blur_dir: [f32; 2]) -> Self {
        Self {
            resolution,
            blur_dir,
            bloom_strength: BLOOM_STRENGTH,
            threshold: BLOOM_THRESHOLD,
            radius: BLOOM_RADIUS,
            _pad: 0.0,
        }
    }
}

/// Which way a uniform block blurs. Each pass owns its block so one command
/// encoder can record the whole chain.
#[derive(Clone, Copy)]
enum Pass {
    Still,
    Horizontal,
    Vertical,
}

impl Pass {
    fn dir(self) -> [f32; 2] {
        match self {
            Pass::Still => [0.0, 0.0],
            Pass::Horizontal => [1.0, 0.0],
            Pass::Vertical => [0.0, 1.0],
        }
    }
}

pub(crate) struct PostResources {
    bgl0: wgpu::BindGroupLayout, // tex+sampler+uniform
    bgl1: wgpu::BindGroupLayout, // tex+sampler
    sampler: wgpu::Sampler,
    uniforms: [wgpu::Buffer; 3],
    pub(crate) bright_pipeline: wgpu::RenderPipeline,
    pub(crate) blur_pipeline: wgpu::RenderPipeline,
    pub(crate) composite_pipeline: wgpu::RenderPipeline,
}

pub(crate) struct PostBindGroups {
    pub(crate) from_hdr: wgpu::BindGroup,
    pub(crate) from_bloom_a: wgpu::BindGroup,
    pub(crate) from_bloom_b: wgpu::BindGroup,
    pub(crate) bloom_a_only: wgpu::BindGroup,
}

pub(crate) fn create_post_resources(
    device: &wgpu::Device,
    swap_format: wgpu::TextureFormat,
) -> PostResources {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("post_shader"),
        source: wgpu::ShaderSource::Wgsl(super::POST_WGSL.into()),
    });
    let bgl0 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("post_bgl0"),
        entries: &[
            texture_entry(0),
            sampler_entry(1),
            helpers::uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
        ],
    });
    let bgl1 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("post_bgl1"),
        entries: &[texture_entry(0), sampler_entry(1)],
    });
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("linear_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });
    let uniforms = ["post_uniforms_still", "post_uniforms_h", "post_uniforms_v"]
        .map(|label| helpers::uniform_buffer::<PostUniforms>(device, label));
    let pl_bright_blur = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pl_post_0"),
        bind_group_layouts: &[&bgl0],
        push_constant_ranges: &[],
    });
    let pl_composite = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pl_post_comp"),
        bind_group_layouts: &[&bgl0, &bgl1],
        push_constant_ranges: &[],
    });
    let bright_pipeline = helpers::fullscreen_pipeline(
        device,
        &pl_bright_blur,
        &shader,
        "fs_bright",
        HDR_FORMAT,
        None,
    );
    let blur_pipeline = helpers::fullscreen_pipeline(
        device,
        &pl_bright_blur,
        &shader,
        "fs_blur",
        HDR_FORMAT,
        None,
    );
    let composite_pipeline = helpers::fullscreen_pipeline(
        device,
        &pl_composite,
        &shader,
        "fs_composite",
        swap_format,
        Some(wgpu::BlendState::REPLACE),
    );

    PostResources {
        bgl0,
        bgl1,
        sampler,
        uniforms,
        bright_pipeline,
        blur_pipeline,
        composite_pipeline,
    }
}

impl PostResources {
    fn uniform(&self, pass: Pass) -> &wgpu::Buffer {
        &self.uniforms[pass as usize]
    }

    /// Refresh the per-pass blocks for a new surface size.
    pub(crate) fn write_uniforms(&self, queue: &wgpu::Queue, width: u32, height: u32) {
        let (bw, bh) = bloom_size(width, height);
        let res = [bw as f32, bh as f32];
        for pass in [Pass::Still, Pass::Horizontal, Pass::Vertical] {
            let u = PostUniforms::new(res, pass.dir());
            queue.write_buffer(self.uniform(pass), 0, bytemuck::bytes_of(&u));
        }
    }

    fn source(
        &self,
        device: &wgpu::Device,
        label: &str,
        view: &wgpu::TextureView,
        pass: Pass,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bgl0,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform(pass).as_entire_binding(),
                },
            ],
        })
    }

    /// Bind groups reference target views, so they follow every target rebuild.
    pub(crate) fn bind_groups(
        &self,
        device: &wgpu::Device,
        targets: &RenderTargets,
    ) -> PostBindGroups {
        let bloom_a_only = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bg_bloom_a_only"),
            layout: &self.bgl1,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&targets.bloom_a_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        PostBindGroups {
            from_hdr: self.source(device, "bg_hdr", &targets.hdr_view, Pass::Still),
            from_bloom_a: self.source(
                device,
                "bg_from_bloom_a",
                &targets.bloom_a_view,
                Pass::Horizontal,
            ),
            from_bloom_b: self.source(
                device,
                "bg_from_bloom_b",
                &targets.bloom_b_view,
                Pass::Vertical,
            ),
            bloom_a_only,
        }
    }
}

pub(crate) fn blit(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    clear: wgpu::Color,
    pipeline: &wgpu::RenderPipeline,
    bg0: &wgpu::BindGroup,
    bg1: Option<&wgpu::BindGroup>,
) {
    let mut r = helpers::clearing_pass(encoder, label, target, clear, None);
    r.set_pipeline(pipeline);
    r.set_bind_group(0, bg0, &[]);
    if let Some(g1) = bg1 {
        r.set_bind_group(1, g1, &[]);
    }
    r.draw(0..3, 0..1);
}
