//! Render pipeline for extracted surface meshes
//!
//! Draws are queued during the frame and replayed in one render pass.
//! Each mesh buffer keeps its own GPU vertex buffer, re-uploaded only when
//! the mesh revision changes. Model matrices go into one uniform buffer
//! addressed with dynamic offsets. Mirrored octants need the opposite
//! front face, so there is one pipeline per winding.

use std::collections::HashMap;

use prism_math::Mat4;
use prism_surface::{Mesh, MeshId, MeshVertex};

use super::types::{FrameUniforms, ModelUniform, MODEL_UNIFORM_STRIDE};
use crate::Winding;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct GpuMesh {
    buffer: wgpu::Buffer,
    capacity: u64,
    revision: u64,
    vertex_count: u32,
}

struct DrawCommand {
    mesh: MeshId,
    vertex_count: u32,
    winding: Winding,
}

/// Render pipeline for lit surface meshes
pub struct MeshPipeline {
    ccw_pipeline: wgpu::RenderPipeline,
    cw_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    model_capacity: usize,
    meshes: HashMap<MeshId, GpuMesh>,
    models: Vec<ModelUniform>,
    commands: Vec<DrawCommand>,
    depth_texture: Option<wgpu::TextureView>,
    depth_size: (u32, u32),
}

impl MeshPipeline {
    /// Create a new mesh pipeline
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ModelUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &model_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/mesh.wgsl").into()),
        });

        let ccw_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            wgpu::FrontFace::Ccw,
        );
        let cw_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            wgpu::FrontFace::Cw,
        );

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let model_capacity = 64;
        let (model_buffer, model_bind_group) =
            Self::create_model_buffer(device, &model_layout, model_capacity);

        Self {
            ccw_pipeline,
            cw_pipeline,
            frame_buffer,
            frame_bind_group,
            model_layout,
            model_buffer,
            model_bind_group,
            model_capacity,
            meshes: HashMap::new(),
            models: Vec::new(),
            commands: Vec::new(),
            depth_texture: None,
            depth_size: (0, 0),
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        front_face: wgpu::FrontFace,
    ) -> wgpu::RenderPipeline {
        let label = if front_face == wgpu::FrontFace::Ccw {
            "Mesh Pipeline (CCW)"
        } else {
            "Mesh Pipeline (CW)"
        };
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Self::vertex_buffer_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn create_model_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniform Buffer"),
            size: capacity as u64 * MODEL_UNIFORM_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniform>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Get the vertex buffer layout for MeshVertex
    fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position: vec3<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                // normal: vec3<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        }
    }

    /// Update per-frame uniforms
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &FrameUniforms) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Forget the previous frame's queued draws
    pub fn begin_frame(&mut self) {
        self.models.clear();
        self.commands.clear();
    }

    /// Queue a draw, uploading the mesh if its contents changed
    pub fn queue_draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mesh: &Mesh,
        model: &Mat4,
        winding: Winding,
    ) {
        if mesh.is_empty() {
            return;
        }
        self.upload_mesh(device, queue, mesh);
        self.models.push(ModelUniform { model: *model });
        self.commands.push(DrawCommand {
            mesh: mesh.id(),
            vertex_count: mesh.vertex_count() as u32,
            winding,
        });
    }

    fn upload_mesh(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, mesh: &Mesh) {
        let bytes = mesh.as_bytes();
        let size = bytes.len() as u64;

        let stale = match self.meshes.get(&mesh.id()) {
            Some(gpu) => gpu.revision != mesh.revision() || gpu.capacity < size,
            None => true,
        };
        if !stale {
            return;
        }

        let needs_buffer = self
            .meshes
            .get(&mesh.id())
            .map_or(true, |gpu| gpu.capacity < size);
        if needs_buffer {
            // Headroom for slowly growing surfaces
            let capacity = (size + size / 2).max(4096);
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Mesh Vertex Buffer"),
                size: capacity,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.meshes.insert(
                mesh.id(),
                GpuMesh {
                    buffer,
                    capacity,
                    revision: 0,
                    vertex_count: 0,
                },
            );
            log::debug!("Allocated {} byte vertex buffer for {:?}", capacity, mesh.id());
        }

        if let Some(gpu) = self.meshes.get_mut(&mesh.id()) {
            queue.write_buffer(&gpu.buffer, 0, bytes);
            gpu.revision = mesh.revision();
            gpu.vertex_count = mesh.vertex_count() as u32;
        }
    }

    /// Number of draws queued this frame
    pub fn queued_draws(&self) -> usize {
        self.commands.len()
    }

    fn upload_models(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.models.len() > self.model_capacity {
            self.model_capacity = self.models.len().next_power_of_two();
            let (buffer, bind_group) =
                Self::create_model_buffer(device, &self.model_layout, self.model_capacity);
            self.model_buffer = buffer;
            self.model_bind_group = bind_group;
        }

        let stride = MODEL_UNIFORM_STRIDE as usize;
        let mut staging = vec![0u8; self.models.len() * stride];
        for (i, model) in self.models.iter().enumerate() {
            let bytes = bytemuck::bytes_of(model);
            staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        if !staging.is_empty() {
            queue.write_buffer(&self.model_buffer, 0, &staging);
        }
    }

    /// Ensure depth texture exists and is the right size
    pub fn ensure_depth_texture(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.depth_texture.is_none() || self.depth_size != (width, height) {
            let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width: width.max(1),
                    height: height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });

            self.depth_texture =
                Some(depth_texture.create_view(&wgpu::TextureViewDescriptor::default()));
            self.depth_size = (width, height);
        }
    }

    /// Record the render pass for all queued draws
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        clear_color: wgpu::Color,
    ) {
        self.upload_models(device, queue);

        let Some(depth_view) = self.depth_texture.as_ref() else {
            log::warn!("Depth texture missing, skipping frame");
            return;
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Mesh Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

        let mut current = None;
        for (i, command) in self.commands.iter().enumerate() {
            let Some(gpu) = self.meshes.get(&command.mesh) else {
                continue;
            };
            if current != Some(command.winding) {
                render_pass.set_pipeline(match command.winding {
                    Winding::Ccw => &self.ccw_pipeline,
                    Winding::Cw => &self.cw_pipeline,
                });
                current = Some(command.winding);
            }
            let offset = (i as u64 * MODEL_UNIFORM_STRIDE) as u32;
            render_pass.set_bind_group(1, &self.model_bind_group, &[offset]);
            render_pass.set_vertex_buffer(0, gpu.buffer.slice(..));
            render_pass.draw(0..command.vertex_count.min(gpu.vertex_count), 0..1);
        }
    }
}
