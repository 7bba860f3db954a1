//! The legacy immediate-mode API.
//!
//! [`RenderContext`] owns the transform stack, the current attributes and the
//! vertex batch. Drawing follows the familiar shape:
//!
//! ```
//! use immgl::{RecordingSink, RenderContext, Topology};
//!
//! let mut gl = RenderContext::new();
//! let mut sink = RecordingSink::new();
//!
//! gl.begin(Topology::Triangles);
//! gl.color3(1.0, 0.0, 0.0);
//! gl.vertex3(0.0, 1.0, 0.0);
//! gl.vertex3(-1.0, -1.0, 0.0);
//! gl.vertex3(1.0, -1.0, 0.0);
//! gl.end(&mut sink);
//!
//! assert_eq!(sink.draws(), vec![(immgl::wgpu::PrimitiveTopology::TriangleList, 3)]);
//! ```
//!
//! Out-of-order calls never panic: a vertex outside `begin`/`end` or an `end`
//! without `begin` is logged and ignored, a nested `begin` discards the open
//! batch and starts over.

use glam::Mat4;

use crate::attributes::AttributeState;
use crate::batch::{BatchState, VertexBatch};
use crate::emitter::{self, DrawSink, Emitted};
use crate::topology::Topology;
use crate::transform::TransformStack;
use crate::vertex::Vertex;

#[derive(Debug)]
pub struct RenderContext {
    transforms: TransformStack,
    attributes: AttributeState,
    batch: VertexBatch,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            transforms: TransformStack::new(),
            attributes: AttributeState::new(),
            batch: VertexBatch::new(),
        }
    }

    /// Reinitialize everything: identity matrix, empty stack, white color,
    /// texture origin, closed empty batch.
    pub fn reset(&mut self) {
        self.transforms.reset();
        self.attributes.reset();
        self.batch.reset();
    }

    // ========================================================================
    // Matrix stack
    // ========================================================================

    pub fn push_matrix(&mut self) {
        self.transforms.push();
    }

    /// Restore the last pushed matrix. Does nothing if the stack is empty.
    pub fn pop_matrix(&mut self) {
        self.transforms.pop();
    }

    pub fn load_identity(&mut self) {
        self.transforms.load_identity();
    }

    pub fn mult_matrix(&mut self, matrix: Mat4) {
        self.transforms.mult_matrix(matrix);
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.transforms.translate(x, y, z);
    }

    /// Rotate by `angle` degrees around `(x, y, z)`.
    pub fn rotate(&mut self, angle: f32, x: f32, y: f32, z: f32) {
        self.transforms.rotate(angle, x, y, z);
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.transforms.scale(x, y, z);
    }

    /// The current model matrix.
    pub fn model_matrix(&self) -> Mat4 {
        self.transforms.current()
    }

    pub fn stack_depth(&self) -> usize {
        self.transforms.depth()
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub fn color3(&mut self, r: f32, g: f32, b: f32) {
        self.attributes.set_color(r, g, b);
    }

    pub fn tex_coord2(&mut self, u: f32, v: f32) {
        self.attributes.set_tex_coord(u, v);
    }

    pub fn attributes(&self) -> &AttributeState {
        &self.attributes
    }

    // ========================================================================
    // Batches
    // ========================================================================

    /// Open a batch, discarding any previously accumulated vertices.
    pub fn begin(&mut self, topology: Topology) {
        self.batch.open(topology);
    }

    /// Submit a vertex, transformed by the current model matrix and tagged
    /// with the current color and texture coordinate.
    pub fn vertex3(&mut self, x: f32, y: f32, z: f32) {
        self.batch
            .push(self.transforms.current(), &self.attributes, x, y, z);
    }

    pub fn vertex2(&mut self, x: f32, y: f32) {
        self.vertex3(x, y, 0.0);
    }

    /// Close the batch: upload its vertices to `sink` and issue one draw.
    ///
    /// Returns `None` (and touches nothing) if no batch was open.
    pub fn end(&mut self, sink: &mut dyn DrawSink) -> Option<Emitted> {
        let closed = self.batch.close()?;
        Some(emitter::emit(closed, sink))
    }

    pub fn is_open(&self) -> bool {
        self.batch.is_open()
    }

    pub fn batch_state(&self) -> BatchState {
        self.batch.state()
    }

    pub fn vertex_count(&self) -> usize {
        self.batch.len()
    }

    /// Vertices of the open batch, or of the last closed one.
    pub fn vertices(&self) -> &[Vertex] {
        self.batch.vertices()
    }
}
