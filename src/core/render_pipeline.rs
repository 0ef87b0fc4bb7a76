use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, CommandEncoder, RenderPipeline, Sampler, ShaderModule,
    TextureFormat, TextureView,
};

use super::geometry::{Letterbox, QuadVertex, QUAD_VERTEX_COUNT};
use super::gpu_context::GpuContext;
use super::texture::FrameTexture;
use super::window::FramebufferSize;
use crate::error::DisplayError;

type Result<T> = std::result::Result<T, DisplayError>;

pub const DISPLAY_SHADER: &str = include_str!("../display.wgsl");

/// GPU objects owned while the pipeline is ready
struct PipelineResources {
    vertex_buffer: Buffer,
    render_pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    sampler: Sampler,
    shader: ShaderModule,
}

/// Draws the frame texture as a letterboxed quad
///
/// Exists only fully built: construction either compiles the shader, builds
/// the pipeline and allocates the vertex buffer, or fails and drops whatever
/// it had created.
pub struct QuadPipeline {
    resources: Option<PipelineResources>,
    letterbox: Letterbox,
}

impl QuadPipeline {
    /// Build with the built-in display shader
    pub fn new(gpu: &GpuContext, target_format: TextureFormat) -> Result<Self> {
        Self::with_shader(gpu, target_format, DISPLAY_SHADER)
    }

    /// Build from custom WGSL exposing `vs_main` and `fs_main`
    pub fn with_shader(gpu: &GpuContext, target_format: TextureFormat, source: &str) -> Result<Self> {
        let device = gpu.device();

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Frame Display Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(DisplayError::Shader(err.to_string()));
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Frame Render Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Frame Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[QuadVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                // no triangle fans in wgpu; the strip covers the same two triangles
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(DisplayError::Pipeline(err.to_string()));
        }

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Frame Texture Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let letterbox = Letterbox::new();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(letterbox.vertices()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        log::info!("frame shaders compiled and linked");

        Ok(Self {
            resources: Some(PipelineResources {
                vertex_buffer,
                render_pipeline,
                bind_group_layout,
                sampler,
                shader,
            }),
            letterbox,
        })
    }

    /// False once released
    pub fn is_ready(&self) -> bool {
        self.resources.is_some()
    }

    /// Geometry used by the most recent draw
    pub fn letterbox(&self) -> &Letterbox {
        &self.letterbox
    }

    /// Bind group pairing a frame texture view with the pipeline's sampler
    pub fn create_texture_bind_group(
        &self,
        gpu: &GpuContext,
        view: &TextureView,
    ) -> Result<BindGroup> {
        let resources = self.resources.as_ref().ok_or(DisplayError::Released)?;

        Ok(gpu.device().create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Texture Bind Group"),
            layout: &resources.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&resources.sampler),
                },
            ],
        }))
    }

    /// Record one display cycle into `encoder`: viewport, clear to black,
    /// letterbox update, bind and draw.
    pub fn draw(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        framebuffer: FramebufferSize,
        image_aspect: f32,
        texture: &FrameTexture,
    ) -> Result<()> {
        let Self {
            resources,
            letterbox,
        } = self;
        let resources = resources.as_ref().ok_or(DisplayError::Released)?;
        let bind_group = texture.bind_group().ok_or(DisplayError::Released)?;

        // minimized: keep the last quad
        letterbox.update(framebuffer, image_aspect);
        gpu.queue().write_buffer(
            &resources.vertex_buffer,
            0,
            bytemuck::cast_slice(letterbox.vertices()),
        );

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Frame Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if !framebuffer.is_empty() {
            render_pass.set_viewport(
                0.0,
                0.0,
                framebuffer.width as f32,
                framebuffer.height as f32,
                0.0,
                1.0,
            );
        }
        render_pass.set_pipeline(&resources.render_pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.set_vertex_buffer(0, resources.vertex_buffer.slice(..));
        render_pass.draw(0..QUAD_VERTEX_COUNT, 0..1);

        Ok(())
    }

    /// Free the vertex buffer, then the pipeline and shader. Safe to repeat.
    pub fn release(&mut self) {
        let Some(PipelineResources {
            vertex_buffer,
            render_pipeline,
            bind_group_layout,
            sampler,
            shader,
        }) = self.resources.take()
        else {
            return;
        };

        vertex_buffer.destroy();
        drop(vertex_buffer);
        log::debug!("released quad vertex buffer");

        drop(render_pipeline);
        drop(bind_group_layout);
        drop(sampler);
        drop(shader);
        log::debug!("released shader program");
    }
}
