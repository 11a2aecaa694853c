use super::helpers::{self, DEPTH_FORMAT, HDR_FORMAT};
use crate::constants::{LIGHT_KIND_AMBIENT, LIGHT_KIND_DIRECTIONAL, MAX_LIGHTS};
use hexwall_core::grid::HexGeometry;
use hexwall_core::lights::LightRig;
use hexwall_core::{Camera, InstanceRaw, MeshVertex};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct LightPacked {
    position_kind: [f32; 4],
    color_intensity: [f32; 4],
    target: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    lights: [LightPacked; MAX_LIGHTS],
    light_count: u32,
    opacity: f32,
    _pad: [f32; 2],
}

/// Camera and attached lights in the layout `hex.wgsl` expects.
pub(crate) fn pack_scene(camera: &Camera, rig: &LightRig, opacity: f32) -> SceneUniforms {
    let mut lights = [LightPacked::default(); MAX_LIGHTS];
    let mut count = 0;
    for (slot, (kind, scene_light)) in lights.iter_mut().zip(rig.ordered()) {
        let l = &scene_light.light;
        let kind = if kind.is_directional() {
            LIGHT_KIND_DIRECTIONAL
        } else {
            LIGHT_KIND_AMBIENT
        };
        *slot = LightPacked {
            position_kind: l.position.extend(kind).to_array(),
            color_intensity: [l.color.r, l.color.g, l.color.b, l.intensity],
            target: l.target.extend(0.0).to_array(),
        };
        count += 1;
    }
    SceneUniforms {
        view_proj: camera.view_projection().to_cols_array_2d(),
        lights,
        light_count: count,
        opacity: opacity.clamp(0.0, 1.0),
        _pad: [0.0; 2],
    }
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const INSTANCE_ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4,
    6 => Float32x4
];

/// Instanced hex prism pass: one mesh, one instance per cell.
pub(crate) struct HexResources {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_count: u32,
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("hex_instances"),
        size: (capacity.max(1) * std::mem::size_of::<InstanceRaw>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_mesh_buffers(
    device: &wgpu::Device,
    geometry: &HexGeometry,
) -> (wgpu::Buffer, wgpu::Buffer, u32) {
    let (vertices, indices) = geometry.mesh();
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("hex_vertices"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("hex_indices"),
        contents: bytemuck::cast_slice(&indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    (vertex_buffer, index_buffer, indices.len() as u32)
}

pub(crate) fn create_hex_resources(device: &wgpu::Device, geometry: &HexGeometry) -> HexResources {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("hex_shader"),
        source: wgpu::ShaderSource::Wgsl(super::HEX_WGSL.into()),
    });
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("hex_bgl"),
        entries: &[helpers::uniform_entry(
            0,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        )],
    });
    let uniform_buffer = helpers::uniform_buffer::<SceneUniforms>(device, "hex_uniforms");
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("hex_bg"),
        layout: &bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("hex_pl"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("hex_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRS,
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceRaw>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &INSTANCE_ATTRS,
                },
            ],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        // Flipped tiles show their back faces
        primitive: wgpu::PrimitiveState {
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: HDR_FORMAT,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    });
    let (vertex_buffer, index_buffer, index_count) = create_mesh_buffers(device, geometry);
    HexResources {
        pipeline,
        uniform_buffer,
        bind_group,
        vertex_buffer,
        index_buffer,
        index_count,
        instance_buffer: create_instance_buffer(device, 0),
        instance_capacity: 0,
        instance_count: 0,
    }
}

impl HexResources {
    /// Swap in a new prism after the tile geometry changed.
    pub(crate) fn set_mesh(&mut self, device: &wgpu::Device, geometry: &HexGeometry) {
        let (vb, ib, count) = create_mesh_buffers(device, geometry);
        self.vertex_buffer = vb;
        self.index_buffer = ib;
        self.index_count = count;
    }

    /// Upload every instance, growing the buffer when the grid outgrew it.
    pub(crate) fn upload_instances(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        instances: &[InstanceRaw],
    ) {
        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
            log::debug!("[gpu] instance buffer grown to {}", self.instance_capacity);
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
        self.instance_count = instances.len() as u32;
    }

    pub(crate) fn write_scene(&self, queue: &wgpu::Queue, scene: &SceneUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(scene));
    }

    pub(crate) fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        clear: wgpu::Color,
    ) {
        let mut rpass = helpers::clearing_pass(encoder, "hex_pass", color, clear, Some(depth));
        if self.instance_count == 0 {
            return;
        }
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
    }
}
