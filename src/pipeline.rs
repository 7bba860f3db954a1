//! Shader configuration and render pipeline creation.
//!
//! The shader is not baked into the renderer: a [`PipelineConfig`] carries the
//! WGSL source and entry points, and defaults to the bundled batch shader.
//! Compilation errors never abort the program. They are logged and the renderer
//! keeps running without a pipeline, which shows up as a blank frame.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use crate::gpu::GpuContext;
use crate::vertex::Vertex;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Every wgpu topology a batch can end up drawn with.
const TOPOLOGIES: [wgpu::PrimitiveTopology; 5] = [
    wgpu::PrimitiveTopology::PointList,
    wgpu::PrimitiveTopology::LineList,
    wgpu::PrimitiveTopology::LineStrip,
    wgpu::PrimitiveTopology::TriangleList,
    wgpu::PrimitiveTopology::TriangleStrip,
];

/// Shader stages used to draw batches.
///
/// The shader must read [`Vertex`] attributes at locations 0..=2, a uniform
/// block of three `mat4x4<f32>` (model, view, projection) at group 0 binding 0,
/// and a texture/sampler pair at group 1 bindings 0 and 1.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub label: String,
    pub source: Cow<'static, str>,
    pub vertex_entry: String,
    pub fragment_entry: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::wgsl(include_str!("shaders/immediate.wgsl"))
    }
}

impl PipelineConfig {
    /// A WGSL source with `vs`/`fs` entry points.
    pub fn wgsl(source: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: "Batch Shader".to_string(),
            source: source.into(),
            vertex_entry: "vs".to_string(),
            fragment_entry: "fs".to_string(),
        }
    }

    /// Read a WGSL source from disk.
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Ok(Self {
            label: path.display().to_string(),
            ..Self::wgsl(source)
        })
    }

    pub fn entry_points(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.vertex_entry = vertex.into();
        self.fragment_entry = fragment.into();
        self
    }
}

/// One render pipeline per primitive topology, all sharing a shader.
pub(crate) struct BatchPipelines {
    pipelines: HashMap<wgpu::PrimitiveTopology, wgpu::RenderPipeline>,
}

impl BatchPipelines {
    /// Compile `config` for every topology.
    ///
    /// Returns `None` if the shader or any pipeline fails validation; the
    /// error is logged.
    pub(crate) fn compile(
        gpu: &GpuContext,
        layout: &wgpu::PipelineLayout,
        config: &PipelineConfig,
    ) -> Option<Self> {
        let device = &gpu.device;
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(config.label.as_str()),
            source: wgpu::ShaderSource::Wgsl(config.source.clone()),
        });

        let pipelines: HashMap<_, _> = TOPOLOGIES
            .into_iter()
            .map(|topology| {
                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(&format!("{} {:?} Pipeline", config.label, topology)),
                    layout: Some(layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some(config.vertex_entry.as_str()),
                        buffers: &[Vertex::LAYOUT],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some(config.fragment_entry.as_str()),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: gpu.config.format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology,
                        cull_mode: None,
                        ..Default::default()
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: DEPTH_FORMAT,
                        depth_write_enabled: true,
                        depth_compare: wgpu::CompareFunction::LessEqual,
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                });
                (topology, pipeline)
            })
            .collect();

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            log::error!("shader '{}' failed to build: {error}", config.label);
            return None;
        }

        log::debug!("compiled batch pipelines for '{}'", config.label);
        Some(Self { pipelines })
    }

    pub(crate) fn get(&self, topology: wgpu::PrimitiveTopology) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_bundled_shader() {
        let config = PipelineConfig::default();
        assert_eq!(config.vertex_entry, "vs");
        assert_eq!(config.fragment_entry, "fs");
        assert!(config.source.contains("fn vs("));
        assert!(config.source.contains("fn fs("));
    }

    #[test]
    fn missing_shader_file_is_an_io_error() {
        let result = PipelineConfig::from_file("does/not/exist.wgsl");
        assert!(result.is_err());
    }

    #[test]
    fn entry_points_can_be_renamed() {
        let config = PipelineConfig::wgsl("").entry_points("vertex_main", "fragment_main");
        assert_eq!(config.vertex_entry, "vertex_main");
        assert_eq!(config.fragment_entry, "fragment_main");
    }
}
