//! The model-matrix stack.
//!
//! [`TransformStack`] holds the current composed model matrix and a save/restore
//! stack, mirroring the legacy `glPushMatrix`/`glPopMatrix` family. Every
//! elementary operation post-multiplies the current matrix, so calls compose in
//! call order and apply to coordinates specified afterwards:
//!
//! ```
//! use immgl::TransformStack;
//! use immgl::Vec3;
//!
//! let mut stack = TransformStack::new();
//! stack.translate(0.0, 0.0, -2.0);
//! stack.scale(2.0, 2.0, 2.0);
//!
//! // Scale first, then translate.
//! let p = stack.current().transform_point3(Vec3::new(1.0, 0.0, 0.0));
//! assert_eq!(p, Vec3::new(2.0, 0.0, -2.0));
//! ```

use glam::{Mat4, Vec3};

/// Current model matrix plus a stack of saved matrices.
#[derive(Clone, Debug)]
pub struct TransformStack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self {
            current: Mat4::IDENTITY,
            saved: Vec::new(),
        }
    }
}

impl TransformStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current composed model matrix.
    pub fn current(&self) -> Mat4 {
        self.current
    }

    /// Number of saved matrices.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Save a copy of the current matrix.
    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the most recently saved matrix.
    ///
    /// Popping an empty stack does nothing: the current matrix is kept and no
    /// error is raised. Unbalanced push/pop pairs are therefore not detected
    /// here beyond a debug-level log line.
    pub fn pop(&mut self) {
        match self.saved.pop() {
            Some(matrix) => self.current = matrix,
            None => log::debug!("pop on empty transform stack ignored"),
        }
    }

    /// Replace the current matrix with identity. Saved matrices are untouched.
    pub fn load_identity(&mut self) {
        self.current = Mat4::IDENTITY;
    }

    /// Post-multiply the current matrix by `matrix`.
    pub fn mult_matrix(&mut self, matrix: Mat4) {
        self.current *= matrix;
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.mult_matrix(Mat4::from_translation(Vec3::new(x, y, z)));
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.mult_matrix(Mat4::from_scale(Vec3::new(x, y, z)));
    }

    /// Rotate by `angle_degrees` around the axis `(x, y, z)`.
    ///
    /// The axis is normalized before the rotation matrix is built, the same
    /// way `glRotatef` treats it, so `(0, 1, 1)` and `(0, 2, 2)` are equivalent.
    /// A zero-length axis defines no rotation and the call is ignored with a
    /// warning. This departs from `glm::rotate`, which would produce a NaN
    /// matrix and poison every later vertex.
    pub fn rotate(&mut self, angle_degrees: f32, x: f32, y: f32, z: f32) {
        let Some(axis) = Vec3::new(x, y, z).try_normalize() else {
            log::warn!("rotate around zero-length axis ({x}, {y}, {z}) ignored");
            return;
        };
        self.mult_matrix(Mat4::from_axis_angle(axis, angle_degrees.to_radians()));
    }

    /// Restore the initial state: identity matrix, empty stack.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn starts_at_identity() {
        let stack = TransformStack::new();
        assert_eq!(stack.current(), Mat4::IDENTITY);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn pop_restores_pushed_matrix() {
        let mut stack = TransformStack::new();
        stack.translate(1.0, 2.0, 3.0);
        let saved = stack.current();

        stack.push();
        stack.scale(4.0, 4.0, 4.0);
        stack.rotate(30.0, 1.0, 0.0, 0.0);
        assert_ne!(stack.current(), saved);

        stack.pop();
        assert_eq!(stack.current(), saved);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn pop_on_empty_stack_is_noop() {
        let mut stack = TransformStack::new();
        stack.translate(5.0, 0.0, 0.0);
        let before = stack.current();

        stack.pop();
        stack.pop();

        assert_eq!(stack.current(), before);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn extra_pops_only_undo_matched_pushes() {
        let mut stack = TransformStack::new();
        stack.push();
        stack.translate(1.0, 0.0, 0.0);
        stack.push();
        stack.translate(0.0, 1.0, 0.0);

        stack.pop();
        assert_eq!(stack.current(), Mat4::from_translation(Vec3::X));
        stack.pop();
        assert_eq!(stack.current(), Mat4::IDENTITY);

        // Nothing left to restore.
        stack.translate(0.0, 0.0, 7.0);
        stack.pop();
        assert_eq!(stack.current(), Mat4::from_translation(Vec3::new(0.0, 0.0, 7.0)));
    }

    #[test]
    fn composition_is_order_sensitive() {
        let point = Vec3::new(1.0, 0.0, 0.0);

        let mut translate_first = TransformStack::new();
        translate_first.translate(1.0, 0.0, 0.0);
        translate_first.rotate(90.0, 0.0, 0.0, 1.0);

        let mut rotate_first = TransformStack::new();
        rotate_first.rotate(90.0, 0.0, 0.0, 1.0);
        rotate_first.translate(1.0, 0.0, 0.0);

        let a = translate_first.current().transform_point3(point);
        let b = rotate_first.current().transform_point3(point);

        assert!(approx(a, Vec3::new(1.0, 1.0, 0.0)));
        assert!(approx(b, Vec3::new(0.0, 2.0, 0.0)));
        assert!(!approx(a, b));
    }

    #[test]
    fn rotate_normalizes_axis() {
        let mut unit = TransformStack::new();
        unit.rotate(45.0, 0.0, 1.0, 1.0);

        let mut long = TransformStack::new();
        long.rotate(45.0, 0.0, 3.0, 3.0);

        assert!(unit.current().abs_diff_eq(long.current(), 1e-6));
    }

    #[test]
    fn rotate_around_zero_axis_is_ignored() {
        let mut stack = TransformStack::new();
        stack.translate(0.0, 1.0, 0.0);
        let before = stack.current();

        stack.rotate(90.0, 0.0, 0.0, 0.0);
        assert_eq!(stack.current(), before);
    }

    #[test]
    fn zero_degree_rotation_keeps_matrix() {
        let mut stack = TransformStack::new();
        stack.translate(0.0, 0.0, -2.0);
        stack.rotate(0.0, 0.0, 1.0, 1.0);
        assert!(
            stack
                .current()
                .abs_diff_eq(Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0)), 1e-6)
        );
    }

    #[test]
    fn load_identity_keeps_saved_matrices() {
        let mut stack = TransformStack::new();
        stack.scale(2.0, 2.0, 2.0);
        stack.push();
        stack.load_identity();
        assert_eq!(stack.current(), Mat4::IDENTITY);

        stack.pop();
        assert_eq!(stack.current(), Mat4::from_scale(Vec3::splat(2.0)));
    }
}
