//! Spinning textured cube drawn with begin/vertex/end.
//!
//! Pass an image path as the first argument to texture the cube with it;
//! otherwise a checkerboard is used.

use immgl::{AppConfig, RenderContext, Topology, run_with_config};

/// Degrees added to the spin angle every frame.
const SPIN_STEP: f32 = 5.0;

/// One face: texture coordinate and position for each of its six vertices.
type Face = [([f32; 2], [f32; 3]); 6];

#[rustfmt::skip]
const FACES: [Face; 6] = [
    // Front (Z+)
    [
        ([0.0, 0.0], [-0.5, -0.5,  0.5]), ([1.0, 0.0], [ 0.5, -0.5,  0.5]), ([1.0, 1.0], [ 0.5,  0.5,  0.5]),
        ([0.0, 0.0], [-0.5, -0.5,  0.5]), ([1.0, 1.0], [ 0.5,  0.5,  0.5]), ([0.0, 1.0], [-0.5,  0.5,  0.5]),
    ],
    // Back (Z-)
    [
        ([1.0, 0.0], [-0.5, -0.5, -0.5]), ([1.0, 1.0], [-0.5,  0.5, -0.5]), ([0.0, 1.0], [ 0.5,  0.5, -0.5]),
        ([1.0, 0.0], [-0.5, -0.5, -0.5]), ([0.0, 1.0], [ 0.5,  0.5, -0.5]), ([0.0, 0.0], [ 0.5, -0.5, -0.5]),
    ],
    // Top (Y+)
    [
        ([0.0, 1.0], [-0.5,  0.5, -0.5]), ([0.0, 0.0], [-0.5,  0.5,  0.5]), ([1.0, 0.0], [ 0.5,  0.5,  0.5]),
        ([0.0, 1.0], [-0.5,  0.5, -0.5]), ([1.0, 0.0], [ 0.5,  0.5,  0.5]), ([1.0, 1.0], [ 0.5,  0.5, -0.5]),
    ],
    // Bottom (Y-)
    [
        ([1.0, 1.0], [-0.5, -0.5, -0.5]), ([0.0, 1.0], [ 0.5, -0.5, -0.5]), ([0.0, 0.0], [ 0.5, -0.5,  0.5]),
        ([1.0, 1.0], [-0.5, -0.5, -0.5]), ([0.0, 0.0], [ 0.5, -0.5,  0.5]), ([1.0, 0.0], [-0.5, -0.5,  0.5]),
    ],
    // Right (X+)
    [
        ([1.0, 0.0], [ 0.5, -0.5, -0.5]), ([1.0, 1.0], [ 0.5,  0.5, -0.5]), ([0.0, 1.0], [ 0.5,  0.5,  0.5]),
        ([1.0, 0.0], [ 0.5, -0.5, -0.5]), ([0.0, 1.0], [ 0.5,  0.5,  0.5]), ([0.0, 0.0], [ 0.5, -0.5,  0.5]),
    ],
    // Left (X-)
    [
        ([0.0, 0.0], [-0.5, -0.5, -0.5]), ([1.0, 0.0], [-0.5, -0.5,  0.5]), ([1.0, 1.0], [-0.5,  0.5,  0.5]),
        ([0.0, 0.0], [-0.5, -0.5, -0.5]), ([1.0, 1.0], [-0.5,  0.5,  0.5]), ([0.0, 1.0], [-0.5,  0.5, -0.5]),
    ],
];

fn cube(gl: &mut RenderContext, spin: f32) {
    gl.begin(Topology::Triangles);

    gl.translate(0.0, 0.0, -2.0);
    gl.rotate(spin, 0.0, 1.0, 1.0);

    gl.color3(1.0, 1.0, 1.0);
    for face in &FACES {
        for &([u, v], [x, y, z]) in face {
            gl.tex_coord2(u, v);
            gl.vertex3(x, y, z);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let texture_path = std::env::args().nth(1);

    let config = AppConfig::new()
        .title("immgl - spinning cube")
        .size(800, 600);

    run_with_config(config, move |ctx| {
        match texture_path.as_deref() {
            Some(path) => {
                if let Err(error) = ctx.load_texture(path) {
                    log::error!("{error}; falling back to checkerboard");
                    ctx.checkerboard(256, 8);
                }
            }
            None => ctx.checkerboard(256, 8),
        }

        let mut spin = 0.0f32;

        move |frame| {
            frame.gl.push_matrix();
            cube(frame.gl, spin);
            frame.end();
            frame.gl.pop_matrix();

            spin = (spin + SPIN_STEP) % 360.0;
        }
    })?;

    Ok(())
}
