use anyhow::{anyhow, Context, Result};
use bytemuck::bytes_of;
use log::{info, warn};
use wgpu::util::DeviceExt;

use crate::registry::PlaneMesh;
use crate::uniforms::ShaderState;
use crate::viewport::Viewport;

use super::common::{FrameUniform, PlaneUniform};
use super::shader::SHADER;
use super::texture::TextureSlots;

/// GPU renderer that draws every image plane through one shared crossfade material.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    plane_layout: wgpu::BindGroupLayout,
    planes: Vec<PlaneBuffers>,
    textures: TextureSlots,
}

impl Renderer {
    /// Initializes the GPU renderer for a window or canvas of `size` physical pixels.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
    ) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(anyhow!("render surface has zero area"));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: backends(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: Default::default(),
            backend_options: Default::default(),
        });
        let surface = instance
            .create_surface(target)
            .context("failed to create render surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;
        info!("using GPU adapter {}", adapter.get_info().name);

        let device_descriptor = wgpu::DeviceDescriptor {
            label: Some("crossfade-device"),
            required_features: wgpu::Features::empty(),
            required_limits: required_limits(&adapter),
            memory_hints: Default::default(),
            trace: Default::default(),
        };
        let (device, queue) = adapter
            .request_device(&device_descriptor)
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no texture formats"))?;
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|mode| surface_caps.alpha_modes.contains(mode))
        .or_else(|| surface_caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.0,
            height: size.1,
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("crossfade-shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bind-layout"),
            entries: &[uniform_entry::<FrameUniform>(
                wgpu::ShaderStages::VERTEX_FRAGMENT,
            )],
        });
        let plane_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("plane-bind-layout"),
            entries: &[uniform_entry::<PlaneUniform>(wgpu::ShaderStages::VERTEX)],
        });
        let textures = TextureSlots::new(&device, &queue);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("crossfade-pipeline-layout"),
            bind_group_layouts: &[&frame_layout, &plane_layout, textures.layout()],
            push_constant_ranges: &[],
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniform"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bind-group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("crossfade-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: (5 * std::mem::size_of::<f32>()) as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: (3 * std::mem::size_of::<f32>()) as u64,
                            shader_location: 1,
                        },
                    ],
                }],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            frame_buffer,
            frame_bind_group,
            plane_layout,
            planes: Vec::new(),
            textures,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Resizes the swap chain to match the new physical dimensions.
    pub fn resize(&mut self, size: (u32, u32)) {
        if size.0 == 0 || size.1 == 0 {
            return;
        }
        self.config.width = size.0;
        self.config.height = size.1;
        self.surface.configure(&self.device, &self.config);
    }

    /// Builds vertex data for each plane. Geometry is fixed from here on; only
    /// positions change between frames.
    pub fn set_planes(&mut self, meshes: &[PlaneMesh]) {
        self.planes = meshes
            .iter()
            .enumerate()
            .map(|(index, mesh)| PlaneBuffers::new(&self.device, &self.plane_layout, mesh, index))
            .collect();
    }

    /// Uploads RGBA8 pixels into one of the four image slots.
    pub fn upload_texture(
        &mut self,
        slot: usize,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<()> {
        self.textures
            .upload_rgba(&self.device, &self.queue, slot, width, height, pixels)
    }

    #[cfg(target_arch = "wasm32")]
    pub fn upload_image_element(
        &mut self,
        slot: usize,
        image: &web_sys::HtmlImageElement,
    ) -> Result<()> {
        self.textures
            .upload_image_element(&self.device, &self.queue, slot, image)
    }

    pub fn texture_loaded(&self, slot: usize) -> bool {
        self.textures.is_loaded(slot)
    }

    /// Draws one frame and deals with the recoverable surface errors.
    pub fn render_frame(
        &mut self,
        viewport: &Viewport,
        state: &ShaderState,
        meshes: &[PlaneMesh],
    ) -> Result<()> {
        match self.render(viewport, state, meshes) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(anyhow!("GPU is out of memory")),
            Err(err) => {
                warn!("surface error ({err}); retrying next frame");
                Ok(())
            }
        }
    }

    /// Draws every plane with the shared uniforms.
    pub fn render(
        &mut self,
        viewport: &Viewport,
        state: &ShaderState,
        meshes: &[PlaneMesh],
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = FrameUniform::new(viewport, state);
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytes_of(&frame));
        for (plane, mesh) in self.planes.iter().zip(meshes) {
            self.queue
                .write_buffer(&plane.uniform, 0, bytes_of(&PlaneUniform::new(mesh)));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("crossfade-encoder"),
            });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("crossfade-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        pass.set_bind_group(2, self.textures.bind_group(), &[]);
        for plane in &self.planes {
            pass.set_vertex_buffer(0, plane.vertex.slice(..));
            pass.set_index_buffer(plane.index.slice(..), wgpu::IndexFormat::Uint16);
            pass.set_bind_group(1, &plane.bind_group, &[]);
            pass.draw_indexed(0..PlaneMesh::INDICES.len() as u32, 0, 0..1);
        }

        drop(pass);
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

struct PlaneBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    uniform: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl PlaneBuffers {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        mesh: &PlaneMesh,
        index: usize,
    ) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("plane-{index}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("plane-{index}-indices")),
            contents: bytemuck::cast_slice(&PlaneMesh::INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("plane-{index}-uniform")),
            contents: bytes_of(&PlaneUniform::new(mesh)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("plane-{index}-bind-group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });
        Self {
            vertex,
            index: index_buffer,
            uniform,
            bind_group,
        }
    }
}

fn uniform_entry<T>(visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn backends() -> wgpu::Backends {
    wgpu::Backends::PRIMARY
}

#[cfg(target_arch = "wasm32")]
fn backends() -> wgpu::Backends {
    wgpu::Backends::GL
}

#[cfg(not(target_arch = "wasm32"))]
fn required_limits(_adapter: &wgpu::Adapter) -> wgpu::Limits {
    wgpu::Limits::default()
}

#[cfg(target_arch = "wasm32")]
fn required_limits(adapter: &wgpu::Adapter) -> wgpu::Limits {
    wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits())
}
