//! The wgpu side of batch emission.
//!
//! [`BatchRenderer`] implements [`DrawSink`] and [`UniformSink`] on top of a
//! [`GpuContext`]. It owns a single vertex buffer that every batch overwrites,
//! so each draw is encoded and submitted on its own: a later upload in the same
//! frame is only applied after the earlier draw was queued.
//!
//! # Frame shape
//!
//! ```ignore
//! if renderer.begin_frame(wgpu::Color::BLACK) {
//!     renderer.set_matrices(gl.model_matrix(), view, projection);
//!     gl.begin(Topology::Triangles);
//!     // ...
//!     gl.end(&mut renderer);
//!     renderer.present();
//! }
//! ```

use glam::Mat4;

use crate::emitter::{DrawSink, UniformSink};
use crate::gpu::GpuContext;
use crate::pipeline::{BatchPipelines, DEPTH_FORMAT, PipelineConfig};
use crate::texture::Texture;
use crate::vertex::Vertex;

const INITIAL_VERTEX_CAPACITY: usize = 1024;

/// Uniform block read by the batch shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatrixUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl Default for MatrixUniforms {
    fn default() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            model: identity,
            view: identity,
            projection: identity,
        }
    }
}

/// The surface texture acquired for the current frame.
struct FrameTarget {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// Draws closed batches with wgpu.
pub struct BatchRenderer {
    gpu: GpuContext,
    pipelines: Option<BatchPipelines>,
    pipeline_layout: wgpu::PipelineLayout,

    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,

    texture_bind_group_layout: wgpu::BindGroupLayout,
    texture_bind_group: wgpu::BindGroup,

    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),

    frame: Option<FrameTarget>,
}

impl BatchRenderer {
    /// Set up buffers, bind groups and the pipelines described by `config`.
    ///
    /// A shader that fails to compile is logged; the renderer is still
    /// returned and simply skips draws until [`BatchRenderer::reload_pipeline`]
    /// succeeds.
    pub fn new(gpu: GpuContext, config: &PipelineConfig) -> Self {
        let device = &gpu.device;

        // Matrix uniforms (group 0)
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Matrix Uniforms"),
            size: std::mem::size_of::<MatrixUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        gpu.queue.write_buffer(
            &uniform_buffer,
            0,
            bytemuck::cast_slice(&[MatrixUniforms::default()]),
        );

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Matrix Uniform Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Matrix Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Texture and sampler (group 1)
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Batch Texture Layout"),
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
            label: Some("Batch Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffer = Self::create_vertex_buffer(&gpu, INITIAL_VERTEX_CAPACITY);

        // White until bind_texture() is called.
        let texture_bind_group = Self::create_texture_bind_group(
            &gpu,
            &texture_bind_group_layout,
            &Texture::white(&gpu),
        );

        let (depth_texture, depth_view) = Self::create_depth_texture(&gpu);
        let depth_size = (gpu.width(), gpu.height());

        let pipelines = BatchPipelines::compile(&gpu, &pipeline_layout, config);

        Self {
            gpu,
            pipelines,
            pipeline_layout,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            texture_bind_group_layout,
            texture_bind_group,
            depth_texture,
            depth_view,
            depth_size,
            frame: None,
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    /// Whether a working pipeline is loaded.
    pub fn is_valid(&self) -> bool {
        self.pipelines.is_some()
    }

    /// Recompile with a new shader. On failure the previous pipelines stay.
    pub fn reload_pipeline(&mut self, config: &PipelineConfig) -> bool {
        match BatchPipelines::compile(&self.gpu, &self.pipeline_layout, config) {
            Some(pipelines) => {
                self.pipelines = Some(pipelines);
                true
            }
            None => false,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
    }

    /// Bind `texture` for all following draws.
    pub fn bind_texture(&mut self, texture: &Texture) {
        self.texture_bind_group =
            Self::create_texture_bind_group(&self.gpu, &self.texture_bind_group_layout, texture);
    }

    /// Acquire the next surface texture and clear it (color and depth).
    ///
    /// Returns `false` when no frame could be acquired; the caller should skip
    /// drawing and try again next iteration.
    pub fn begin_frame(&mut self, clear: wgpu::Color) -> bool {
        if self.frame.is_some() {
            log::warn!("begin_frame() while a frame is pending; dropping it");
            self.frame = None;
        }

        self.ensure_depth_size();

        let surface_texture = match self.gpu.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                return false;
            }
            Err(error) => {
                log::warn!("skipping frame: {error}");
                return false;
            }
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Clear Encoder"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        self.frame = Some(FrameTarget {
            surface_texture,
            view,
        });
        true
    }

    /// Present the current frame.
    pub fn present(&mut self) {
        match self.frame.take() {
            Some(frame) => frame.surface_texture.present(),
            None => log::warn!("present() without begin_frame() ignored"),
        }
    }

    fn create_vertex_buffer(gpu: &GpuContext, capacity: usize) -> wgpu::Buffer {
        gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Batch Vertex Buffer"),
            size: (capacity * std::mem::size_of::<Vertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_texture_bind_group(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        texture: &Texture,
    ) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Batch Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }

    fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn ensure_depth_size(&mut self) {
        let size = (self.gpu.width(), self.gpu.height());
        if self.depth_size != size {
            let (texture, view) = Self::create_depth_texture(&self.gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = size;
        }
    }
}

impl DrawSink for BatchRenderer {
    fn upload(&mut self, vertices: &[Vertex]) {
        if vertices.is_empty() {
            return;
        }

        if vertices.len() > self.vertex_capacity {
            let capacity = vertices.len().next_power_of_two();
            log::debug!(
                "growing batch vertex buffer {} -> {capacity} vertices",
                self.vertex_capacity
            );
            self.vertex_buffer = Self::create_vertex_buffer(&self.gpu, capacity);
            self.vertex_capacity = capacity;
        }

        self.gpu
            .queue
            .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
    }

    fn draw(&mut self, topology: wgpu::PrimitiveTopology, count: u32) {
        let Some(frame) = &self.frame else {
            log::warn!("draw of {count} vertices outside begin_frame()/present() ignored");
            return;
        };
        let Some(pipeline) = self.pipelines.as_ref().and_then(|p| p.get(topology)) else {
            log::trace!("no valid pipeline, skipping draw of {count} vertices");
            return;
        };

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Batch Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Batch Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..count, 0..1);
        }
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl UniformSink for BatchRenderer {
    fn set_matrices(&mut self, model: Mat4, view: Mat4, projection: Mat4) {
        let uniforms = MatrixUniforms {
            model: model.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        };
        self.gpu
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_are_three_column_major_matrices() {
        assert_eq!(std::mem::size_of::<MatrixUniforms>(), 3 * 64);

        let uniforms = MatrixUniforms::default();
        assert_eq!(uniforms.model, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(uniforms.projection[3][3], 1.0);
    }
}
