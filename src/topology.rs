//! Primitive assembly modes.
//!
//! wgpu only knows five primitive topologies. The legacy modes without a native
//! counterpart (line loops, fans, quads, quad strips, polygons) are expanded on
//! the CPU into plain lists when a batch closes.

use std::borrow::Cow;

use crate::vertex::Vertex;

/// How a flat vertex sequence is assembled into primitives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Topology {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
    Quads,
    QuadStrip,
    Polygon,
}

impl Topology {
    /// Map a legacy `GL_*` primitive enum (`GL_POINTS` .. `GL_POLYGON`).
    pub fn from_gl(mode: u32) -> Option<Self> {
        let topology = match mode {
            0x0000 => Self::Points,
            0x0001 => Self::Lines,
            0x0002 => Self::LineLoop,
            0x0003 => Self::LineStrip,
            0x0004 => Self::Triangles,
            0x0005 => Self::TriangleStrip,
            0x0006 => Self::TriangleFan,
            0x0007 => Self::Quads,
            0x0008 => Self::QuadStrip,
            0x0009 => Self::Polygon,
            _ => return None,
        };
        Some(topology)
    }

    /// The wgpu topology the batch is finally drawn with.
    pub fn primitive(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::Points => wgpu::PrimitiveTopology::PointList,
            Self::Lines | Self::LineLoop => wgpu::PrimitiveTopology::LineList,
            Self::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            Self::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
            Self::Triangles
            | Self::TriangleFan
            | Self::Quads
            | Self::QuadStrip
            | Self::Polygon => wgpu::PrimitiveTopology::TriangleList,
        }
    }

    /// Whether the mode is drawn as-is, without CPU expansion.
    pub fn is_native(self) -> bool {
        matches!(
            self,
            Self::Points | Self::Lines | Self::LineStrip | Self::Triangles | Self::TriangleStrip
        )
    }

    /// Turn the submitted vertices into the sequence that is uploaded.
    ///
    /// Native modes borrow the input unchanged, including any incomplete
    /// trailing primitive (the GPU discards it). Emulated modes produce a new
    /// list and drop incomplete trailing primitives.
    pub fn assemble(self, vertices: &[Vertex]) -> Cow<'_, [Vertex]> {
        if self.is_native() {
            return Cow::Borrowed(vertices);
        }
        let expanded = match self {
            Self::LineLoop => line_loop(vertices),
            Self::Quads => quads(vertices),
            Self::QuadStrip => quad_strip(vertices),
            _ => fan(vertices),
        };
        Cow::Owned(expanded)
    }
}

fn line_loop(vertices: &[Vertex]) -> Vec<Vertex> {
    let n = vertices.len();
    if n < 2 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(n * 2);
    for i in 0..n {
        out.push(vertices[i]);
        out.push(vertices[(i + 1) % n]);
    }
    out
}

fn fan(vertices: &[Vertex]) -> Vec<Vertex> {
    let n = vertices.len();
    if n < 3 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        out.extend_from_slice(&[vertices[0], vertices[i], vertices[i + 1]]);
    }
    out
}

fn quads(vertices: &[Vertex]) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(vertices.len() / 4 * 6);
    for quad in vertices.chunks_exact(4) {
        out.extend_from_slice(&[quad[0], quad[1], quad[2], quad[0], quad[2], quad[3]]);
    }
    out
}

// Quad k of a strip is v[2k], v[2k+1], v[2k+3], v[2k+2].
fn quad_strip(vertices: &[Vertex]) -> Vec<Vertex> {
    let quads = vertices.len().saturating_sub(2) / 2;
    let mut out = Vec::with_capacity(quads * 6);
    for k in 0..quads {
        let [a, b, c, d] = [2 * k, 2 * k + 1, 2 * k + 3, 2 * k + 2].map(|i| vertices[i]);
        out.extend_from_slice(&[a, b, c, a, c, d]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<Vertex> {
        (0..n)
            .map(|i| Vertex::new([i as f32, 0.0, 0.0], [1.0; 3], [0.0; 2]))
            .collect()
    }

    fn ids(vertices: &[Vertex]) -> Vec<usize> {
        vertices.iter().map(|v| v.position[0] as usize).collect()
    }

    #[test]
    fn gl_enum_mapping() {
        assert_eq!(Topology::from_gl(0x0004), Some(Topology::Triangles));
        assert_eq!(Topology::from_gl(0x0007), Some(Topology::Quads));
        assert_eq!(Topology::from_gl(0x0009), Some(Topology::Polygon));
        assert_eq!(Topology::from_gl(0x000A), None);
    }

    #[test]
    fn native_modes_are_borrowed_verbatim() {
        let vertices = numbered(7);
        let assembled = Topology::Triangles.assemble(&vertices);
        assert!(matches!(assembled, Cow::Borrowed(_)));
        assert_eq!(assembled.len(), 7);
        assert_eq!(
            Topology::Triangles.primitive(),
            wgpu::PrimitiveTopology::TriangleList
        );
    }

    #[test]
    fn only_emulated_modes_are_expanded() {
        let input = numbered(6);
        let native = [
            Topology::Points,
            Topology::Lines,
            Topology::LineStrip,
            Topology::Triangles,
            Topology::TriangleStrip,
        ];
        for topology in native {
            assert!(topology.is_native(), "{topology:?}");
            assert!(matches!(topology.assemble(&input), Cow::Borrowed(_)));
        }

        let emulated = [
            Topology::LineLoop,
            Topology::TriangleFan,
            Topology::Quads,
            Topology::QuadStrip,
            Topology::Polygon,
        ];
        for topology in emulated {
            assert!(!topology.is_native(), "{topology:?}");
            assert!(matches!(topology.assemble(&input), Cow::Owned(_)));
        }
    }

    #[test]
    fn quads_split_into_two_triangles() {
        let input = numbered(9);
        let assembled = Topology::Quads.assemble(&input);
        assert_eq!(ids(&assembled), vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn fan_and_polygon_share_the_first_vertex() {
        let expected = vec![0, 1, 2, 0, 2, 3, 0, 3, 4];
        assert_eq!(ids(&Topology::TriangleFan.assemble(&numbered(5))), expected);
        assert_eq!(ids(&Topology::Polygon.assemble(&numbered(5))), expected);
        assert!(Topology::TriangleFan.assemble(&numbered(2)).is_empty());
    }

    #[test]
    fn line_loop_closes_back_to_start() {
        let input = numbered(3);
        let assembled = Topology::LineLoop.assemble(&input);
        assert_eq!(ids(&assembled), vec![0, 1, 1, 2, 2, 0]);
        assert!(Topology::LineLoop.assemble(&numbered(1)).is_empty());
        assert_eq!(
            Topology::LineLoop.primitive(),
            wgpu::PrimitiveTopology::LineList
        );
    }

    #[test]
    fn quad_strip_drops_unpaired_vertex() {
        let input = numbered(7);
        let assembled = Topology::QuadStrip.assemble(&input);
        assert_eq!(ids(&assembled), vec![0, 1, 3, 0, 3, 2, 2, 3, 5, 2, 5, 4]);
        assert!(Topology::QuadStrip.assemble(&numbered(3)).is_empty());
    }
}
