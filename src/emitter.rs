//! Turning a closed batch into GPU work.
//!
//! The core never talks to wgpu directly. It hands each closed batch to a
//! [`DrawSink`], always as one full-replace upload followed by exactly one draw.
//! [`BatchRenderer`](crate::BatchRenderer) is the wgpu implementation;
//! [`RecordingSink`] keeps the commands in memory for headless use and tests.

use glam::Mat4;

use crate::batch::ClosedBatch;
use crate::vertex::Vertex;

/// Accepts vertex uploads and draw submissions.
pub trait DrawSink {
    /// Replace the contents of the vertex buffer with `vertices`.
    fn upload(&mut self, vertices: &[Vertex]);

    /// Draw the first `count` uploaded vertices.
    fn draw(&mut self, topology: wgpu::PrimitiveTopology, count: u32);
}

/// Receives the model/view/projection matrices consumed by the shader.
pub trait UniformSink {
    fn set_matrices(&mut self, model: Mat4, view: Mat4, projection: Mat4);
}

/// What a single batch emission amounted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Emitted {
    pub topology: wgpu::PrimitiveTopology,
    pub count: u32,
}

/// Upload `batch` and issue its draw.
///
/// Emulated topologies are expanded first, so `count` is the number of
/// vertices actually uploaded. An empty batch still produces a zero-count draw.
pub fn emit(batch: ClosedBatch<'_>, sink: &mut dyn DrawSink) -> Emitted {
    let assembled = batch.topology.assemble(batch.vertices);
    let topology = batch.topology.primitive();
    let count = assembled.len() as u32;

    sink.upload(&assembled);
    sink.draw(topology, count);

    log::trace!(
        "emitted {:?} batch: {} submitted, {} drawn",
        batch.topology,
        batch.vertices.len(),
        count
    );

    Emitted { topology, count }
}

/// A command seen by a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Upload(Vec<Vertex>),
    Draw {
        topology: wgpu::PrimitiveTopology,
        count: u32,
    },
    Matrices {
        model: Mat4,
        view: Mat4,
        projection: Mat4,
    },
}

/// In-memory sink that records every command in order.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub commands: Vec<Command>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every draw, in submission order.
    pub fn draws(&self) -> Vec<(wgpu::PrimitiveTopology, u32)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Draw { topology, count } => Some((*topology, *count)),
                _ => None,
            })
            .collect()
    }

    /// The vertex data of the most recent upload.
    pub fn last_upload(&self) -> Option<&[Vertex]> {
        self.commands.iter().rev().find_map(|c| match c {
            Command::Upload(vertices) => Some(vertices.as_slice()),
            _ => None,
        })
    }
}

impl DrawSink for RecordingSink {
    fn upload(&mut self, vertices: &[Vertex]) {
        self.commands.push(Command::Upload(vertices.to_vec()));
    }

    fn draw(&mut self, topology: wgpu::PrimitiveTopology, count: u32) {
        self.commands.push(Command::Draw { topology, count });
    }
}

impl UniformSink for RecordingSink {
    fn set_matrices(&mut self, model: Mat4, view: Mat4, projection: Mat4) {
        self.commands.push(Command::Matrices {
            model,
            view,
            projection,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Topology;

    fn quad() -> Vec<Vertex> {
        [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
            .into_iter()
            .map(|[x, y]| Vertex::new([x, y, 0.0], [1.0; 3], [x, y]))
            .collect()
    }

    #[test]
    fn upload_happens_before_draw() {
        let vertices = quad();
        let mut sink = RecordingSink::new();

        emit(
            ClosedBatch {
                topology: Topology::Quads,
                vertices: &vertices,
            },
            &mut sink,
        );

        assert_eq!(sink.commands.len(), 2);
        assert!(matches!(&sink.commands[0], Command::Upload(v) if v.len() == 6));
        assert_eq!(
            sink.commands[1],
            Command::Draw {
                topology: wgpu::PrimitiveTopology::TriangleList,
                count: 6
            }
        );
    }

    #[test]
    fn empty_batch_draws_zero_vertices() {
        let mut sink = RecordingSink::new();
        let emitted = emit(
            ClosedBatch {
                topology: Topology::Triangles,
                vertices: &[],
            },
            &mut sink,
        );

        assert_eq!(emitted.count, 0);
        assert_eq!(
            sink.draws(),
            vec![(wgpu::PrimitiveTopology::TriangleList, 0)]
        );
        assert_eq!(sink.last_upload(), Some(&[][..]));
    }
}
