//! # immgl
//!
//! **Immediate-mode drawing on top of wgpu.**
//!
//! Issue `begin`, `color3`, `tex_coord2`, `vertex3`, `end` the way classic
//! fixed-function code does, and each batch is uploaded and drawn with exactly
//! one buffer write and one draw call.
//!
//! ## Quick Start
//!
//! ```no_run
//! use immgl::{AppConfig, Topology, run_with_config};
//!
//! fn main() {
//!     run_with_config(AppConfig::new().title("Quad"), |ctx| {
//!         ctx.checkerboard(256, 8);
//!
//!         move |frame| {
//!             frame.gl.push_matrix();
//!             frame.gl.translate(0.0, 0.0, -2.0);
//!             frame.gl.begin(Topology::Quads);
//!             frame.gl.tex_coord2(0.0, 0.0);
//!             frame.gl.vertex3(-0.5, -0.5, 0.0);
//!             frame.gl.tex_coord2(1.0, 0.0);
//!             frame.gl.vertex3(0.5, -0.5, 0.0);
//!             frame.gl.tex_coord2(1.0, 1.0);
//!             frame.gl.vertex3(0.5, 0.5, 0.0);
//!             frame.gl.tex_coord2(0.0, 1.0);
//!             frame.gl.vertex3(-0.5, 0.5, 0.0);
//!             frame.end();
//!             frame.gl.pop_matrix();
//!         }
//!     })
//!     .unwrap();
//! }
//! ```
//!
//! ## Layers
//!
//! - [`TransformStack`], [`AttributeState`] and [`VertexBatch`] are plain CPU
//!   state, gathered behind [`RenderContext`].
//! - [`emit`] turns a closed batch into one upload plus one draw on any
//!   [`DrawSink`]. [`BatchRenderer`] is the wgpu sink; [`RecordingSink`]
//!   records commands for tests.
//! - [`run_with_config`] owns the window and frame loop.

mod app;
mod attributes;
mod batch;
mod camera;
mod context;
mod emitter;
mod gpu;
mod logging;
mod pipeline;
mod renderer;
mod texture;
mod topology;
mod transform;
mod vertex;

pub use app::{AppConfig, AppError, Frame, SetupContext, run, run_with_config};
pub use attributes::AttributeState;
pub use batch::{BatchState, ClosedBatch, VertexBatch};
pub use camera::Camera;
pub use context::RenderContext;
pub use emitter::{Command, DrawSink, Emitted, RecordingSink, UniformSink, emit};
pub use gpu::{GpuContext, GpuError};
pub use logging::{LoggingConfig, init_logging};
pub use pipeline::PipelineConfig;
pub use renderer::{BatchRenderer, MatrixUniforms};
pub use texture::{Texture, TextureError};
pub use topology::Topology;
pub use transform::TransformStack;
pub use vertex::Vertex;

// Re-export the math and GPU crates so callers match our versions.
pub use glam::{Mat4, Vec3, Vec4};
pub use wgpu;
