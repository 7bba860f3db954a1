//! Vertex accumulation between `begin` and `end`.

use glam::Mat4;

use crate::attributes::AttributeState;
use crate::topology::Topology;
use crate::vertex::Vertex;

/// Where the begin/vertex/end state machine currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BatchState {
    /// No batch open; vertices are rejected.
    #[default]
    Closed,
    /// Accepting vertices for the recorded topology.
    Open(Topology),
}

/// A batch closed by [`VertexBatch::close`], ready to be emitted.
#[derive(Debug)]
pub struct ClosedBatch<'a> {
    pub topology: Topology,
    pub vertices: &'a [Vertex],
}

/// The ordered vertex sequence of the current batch.
///
/// Transitions are guarded: an invalid call is logged and leaves the batch in a
/// well-defined state instead of panicking.
#[derive(Debug)]
pub struct VertexBatch {
    state: BatchState,
    vertices: Vec<Vertex>,
}

impl Default for VertexBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexBatch {
    pub fn new() -> Self {
        Self {
            state: BatchState::Closed,
            vertices: Vec::with_capacity(1024),
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, BatchState::Open(_))
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertices accumulated so far (or left over from the last closed batch).
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Clear the sequence and start accepting vertices for `topology`.
    ///
    /// Opening while already open discards the unflushed vertices.
    pub fn open(&mut self, topology: Topology) {
        if let BatchState::Open(previous) = self.state {
            log::warn!(
                "begin({topology:?}) while a {previous:?} batch is open; discarding {} unflushed vertices",
                self.vertices.len()
            );
        }
        self.vertices.clear();
        self.state = BatchState::Open(topology);
    }

    /// Append a vertex resolved against `model` and `attributes`.
    ///
    /// Returns `false` (and drops the vertex) when no batch is open.
    pub fn push(
        &mut self,
        model: Mat4,
        attributes: &AttributeState,
        x: f32,
        y: f32,
        z: f32,
    ) -> bool {
        if !self.is_open() {
            log::warn!("vertex({x}, {y}, {z}) outside begin/end ignored");
            return false;
        }
        self.vertices
            .push(Vertex::resolve(model, x, y, z, attributes));
        true
    }

    /// Close the batch and hand out its contents.
    ///
    /// Returns `None` when no batch was open.
    pub fn close(&mut self) -> Option<ClosedBatch<'_>> {
        let BatchState::Open(topology) = self.state else {
            log::warn!("end() without a matching begin() ignored");
            return None;
        };
        self.state = BatchState::Closed;
        Some(ClosedBatch {
            topology,
            vertices: &self.vertices,
        })
    }

    /// Drop all vertices and return to `Closed`.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.state = BatchState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preallocates_like_new() {
        let batch = VertexBatch::default();
        assert_eq!(batch.state(), BatchState::Closed);
        assert!(batch.vertices.capacity() >= 1024);
    }

    #[test]
    fn open_clears_previous_vertices() {
        let attributes = AttributeState::new();
        let mut batch = VertexBatch::new();

        batch.open(Topology::Triangles);
        batch.push(Mat4::IDENTITY, &attributes, 0.0, 0.0, 0.0);
        batch.push(Mat4::IDENTITY, &attributes, 1.0, 0.0, 0.0);
        assert!(batch.close().is_some());
        assert_eq!(batch.len(), 2);

        batch.open(Topology::Lines);
        assert_eq!(batch.len(), 0);
        assert_eq!(batch.state(), BatchState::Open(Topology::Lines));
    }

    #[test]
    fn reopening_discards_unflushed_vertices() {
        let attributes = AttributeState::new();
        let mut batch = VertexBatch::new();

        batch.open(Topology::Triangles);
        batch.push(Mat4::IDENTITY, &attributes, 0.0, 0.0, 0.0);
        batch.open(Topology::Points);

        assert!(batch.is_empty());
        assert_eq!(batch.state(), BatchState::Open(Topology::Points));
    }

    #[test]
    fn push_while_closed_is_rejected() {
        let attributes = AttributeState::new();
        let mut batch = VertexBatch::new();

        assert!(!batch.push(Mat4::IDENTITY, &attributes, 1.0, 2.0, 3.0));
        assert!(batch.is_empty());
    }

    #[test]
    fn close_without_open_returns_none() {
        let mut batch = VertexBatch::new();
        assert!(batch.close().is_none());

        batch.open(Topology::Quads);
        let closed = batch.close().expect("batch was open");
        assert_eq!(closed.topology, Topology::Quads);
        assert!(closed.vertices.is_empty());
        assert!(batch.close().is_none());
    }
}
