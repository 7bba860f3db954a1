/// The "current" per-vertex attributes.
///
/// Values set here are baked into every vertex submitted afterwards until the
/// next change. Nothing is validated or clamped: out-of-range colors and
/// texture coordinates reach the shader verbatim.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeState {
    color: [f32; 3],
    tex_coord: [f32; 2],
}

impl Default for AttributeState {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            tex_coord: [0.0, 0.0],
        }
    }
}

impl AttributeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_color(&mut self, r: f32, g: f32, b: f32) {
        self.color = [r, g, b];
    }

    pub fn set_tex_coord(&mut self, u: f32, v: f32) {
        self.tex_coord = [u, v];
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn tex_coord(&self) -> [f32; 2] {
        self.tex_coord
    }

    /// Back to opaque white and the texture origin.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_white_at_origin() {
        let state = AttributeState::new();
        assert_eq!(state.color(), [1.0, 1.0, 1.0]);
        assert_eq!(state.tex_coord(), [0.0, 0.0]);
    }

    #[test]
    fn out_of_range_values_pass_through() {
        let mut state = AttributeState::new();
        state.set_color(2.5, -1.0, 0.5);
        state.set_tex_coord(3.0, -0.25);
        assert_eq!(state.color(), [2.5, -1.0, 0.5]);
        assert_eq!(state.tex_coord(), [3.0, -0.25]);

        state.reset();
        assert_eq!(state, AttributeState::default());
    }
}
