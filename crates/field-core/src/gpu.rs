//! wgpu renderer for the spherical field, shared by the web and native
//! front-ends. Surface setup stays with each front-end; this only owns the
//! pipelines and buffers and records into a caller-provided render pass.

use crate::constants::{field_cyan_unit, LINE_OPACITY, SPRITE_OPACITY, SPRITE_SIZE};
use crate::spherical::SphereFrame;
use glam::Vec3;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SphereUniforms {
    projection: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

const VEC3_STRIDE: u64 = std::mem::size_of::<Vec3>() as u64;

/// Source-alpha times one, added onto the destination.
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub struct SphereRenderer {
    sprite_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    quad_vb: wgpu::Buffer,
    point_vb: wgpu::Buffer,
    point_capacity: usize,
    point_count: u32,
    line_vb: wgpu::Buffer,
    line_capacity: usize,
    line_vertex_count: u32,
}

impl SphereRenderer {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        point_capacity: usize,
        line_vertex_capacity: usize,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sphere_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::SPHERE_WGSL.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sphere_uniforms"),
            size: std::mem::size_of::<SphereUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sphere_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sphere_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sphere_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });

        // Quad corners for two triangles, spanning [-0.5, 0.5]
        let quad_vertices: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_quad_vb"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let sprite_buffers = [
            // slot 0: quad corners
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                }],
            },
            // slot 1: particle centres
            wgpu::VertexBufferLayout {
                array_stride: VEC3_STRIDE,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 1,
                }],
            },
        ];
        let sprite_pipeline = make_pipeline(
            device,
            &layout,
            &shader,
            ("vs_sprite", "fs_sprite"),
            &sprite_buffers,
            wgpu::PrimitiveTopology::TriangleList,
            color_format,
        );

        let line_buffers = [wgpu::VertexBufferLayout {
            array_stride: VEC3_STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            }],
        }];
        let line_pipeline = make_pipeline(
            device,
            &layout,
            &shader,
            ("vs_line", "fs_line"),
            &line_buffers,
            wgpu::PrimitiveTopology::LineList,
            color_format,
        );

        Self {
            sprite_pipeline,
            line_pipeline,
            uniform_buffer,
            bind_group,
            quad_vb,
            point_vb: vec3_buffer(device, "sphere_point_vb", point_capacity),
            point_capacity,
            point_count: 0,
            line_vb: vec3_buffer(device, "sphere_line_vb", line_vertex_capacity),
            line_capacity: line_vertex_capacity,
            line_vertex_count: 0,
        }
    }

    /// Write uniforms and vertex data for `frame`, growing buffers if needed.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: &SphereFrame) {
        let [r, g, b] = field_cyan_unit();
        let uniforms = SphereUniforms {
            projection: frame.projection.to_cols_array_2d(),
            view: frame.view.to_cols_array_2d(),
            model: frame.model.to_cols_array_2d(),
            color: [r, g, b, 1.0],
            params: [SPRITE_SIZE, SPRITE_OPACITY, LINE_OPACITY, 0.0],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        if frame.points.len() > self.point_capacity {
            self.point_capacity = frame.points.len();
            self.point_vb = vec3_buffer(device, "sphere_point_vb", self.point_capacity);
        }
        if frame.line_vertices.len() > self.line_capacity {
            self.line_capacity = frame.line_vertices.len();
            self.line_vb = vec3_buffer(device, "sphere_line_vb", self.line_capacity);
        }
        if !frame.points.is_empty() {
            queue.write_buffer(&self.point_vb, 0, bytemuck::cast_slice(frame.points));
        }
        if !frame.line_vertices.is_empty() {
            queue.write_buffer(&self.line_vb, 0, bytemuck::cast_slice(frame.line_vertices));
        }
        self.point_count = frame.points.len() as u32;
        self.line_vertex_count = frame.line_vertices.len() as u32;
    }

    /// Record lines, then sprites, into `pass`.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.bind_group, &[]);
        if self.line_vertex_count > 0 {
            pass.set_pipeline(&self.line_pipeline);
            pass.set_vertex_buffer(0, self.line_vb.slice(..));
            pass.draw(0..self.line_vertex_count, 0..1);
        }
        if self.point_count > 0 {
            pass.set_pipeline(&self.sprite_pipeline);
            pass.set_vertex_buffer(0, self.quad_vb.slice(..));
            pass.set_vertex_buffer(1, self.point_vb.slice(..));
            pass.draw(0..6, 0..self.point_count);
        }
    }
}

fn vec3_buffer(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: VEC3_STRIDE * capacity.max(1) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn make_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    (vs_entry, fs_entry): (&str, &str),
    buffers: &[wgpu::VertexBufferLayout],
    topology: wgpu::PrimitiveTopology,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(vs_entry),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs_entry),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(ADDITIVE_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}
