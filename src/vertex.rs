//! The vertex format uploaded by every batch.
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | color     | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |

use glam::{Mat4, Vec4};

use crate::attributes::AttributeState;

/// A fully resolved vertex: position already transformed by the model matrix,
/// color and texture coordinate copied from the attribute state.
///
/// Uses `#[repr(C)]` and derives [`bytemuck::Pod`] so a batch can be uploaded
/// with `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// The wgpu vertex buffer layout for [`Vertex`] (32 bytes per vertex).
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // color
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], color: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            color,
            uv,
        }
    }

    /// Resolve a raw position against the current model matrix and attributes.
    ///
    /// The position is treated as a point (`w = 1`); only `xyz` of the
    /// product is kept.
    pub fn resolve(model: Mat4, x: f32, y: f32, z: f32, attributes: &AttributeState) -> Self {
        let world = model * Vec4::new(x, y, z, 1.0);
        Self {
            position: world.truncate().to_array(),
            color: attributes.color(),
            uv: attributes.tex_coord(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn layout_is_32_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(Vertex::LAYOUT.array_stride, 32);
    }

    #[test]
    fn resolve_applies_model_matrix_and_snapshot() {
        let mut attributes = AttributeState::new();
        attributes.set_color(0.2, 0.4, 0.6);
        attributes.set_tex_coord(1.0, 0.5);

        let model = Mat4::from_translation(Vec3::new(1.0, -1.0, -2.0));
        let vertex = Vertex::resolve(model, 0.5, 0.5, 0.5, &attributes);

        assert_eq!(vertex.position, [1.5, -0.5, -1.5]);
        assert_eq!(vertex.color, [0.2, 0.4, 0.6]);
        assert_eq!(vertex.uv, [1.0, 0.5]);
    }
}
