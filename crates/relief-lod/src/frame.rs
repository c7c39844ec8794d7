//! Per-frame camera snapshot shared by the LOD and displacement stages.

use glam::{Mat3, Mat4, Vec3};

/// Immutable transforms for one frame.
///
/// Built once from the camera before any per-patch work starts and passed by
/// reference into every stage, so no stage reads mutable camera state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    /// Terrain model transform.
    pub model: Mat4,
    /// World-to-eye transform.
    pub view: Mat4,
    /// Eye-to-clip transform.
    pub projection: Mat4,
    /// World-space eye position.
    pub eye_position: Vec3,
}

impl FrameContext {
    /// Assemble a context from explicit transforms.
    pub fn new(model: Mat4, view: Mat4, projection: Mat4, eye_position: Vec3) -> Self {
        Self {
            model,
            view,
            projection,
            eye_position,
        }
    }

    /// A context looking from `eye` at `target` with an identity model transform.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3, projection: Mat4) -> Self {
        Self::new(
            Mat4::IDENTITY,
            Mat4::look_at_rh(eye, target, up),
            projection,
            eye,
        )
    }

    /// `view * model`.
    pub fn model_view(&self) -> Mat4 {
        self.view * self.model
    }

    /// `projection * view`.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Model-space point transformed into eye space.
    pub fn eye_space(&self, point: Vec3) -> Vec3 {
        self.model_view().transform_point3(point)
    }

    /// Inverse transpose of the model's upper 3x3, for carrying normals into world space.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.model).inverse().transpose()
    }

    /// Model-space normal in world space, unit length. Singular models fall back to `+Y`.
    pub fn world_normal(&self, normal: Vec3) -> Vec3 {
        (self.normal_matrix() * normal).normalize_or(Vec3::Y)
    }
}

impl Default for FrameContext {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_at_puts_target_on_negative_z() {
        let ctx = FrameContext::look_at(
            Vec3::new(0.0, 100.0, 0.0),
            Vec3::ZERO,
            Vec3::NEG_Z,
            Mat4::IDENTITY,
        );
        let p = ctx.eye_space(Vec3::ZERO);
        assert!((p.z + 100.0).abs() < 1e-4, "got {p:?}");
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
    }

    #[test]
    fn test_model_transform_applies_before_view() {
        let ctx = FrameContext::new(
            Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)),
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::ZERO,
        );
        assert_eq!(ctx.eye_space(Vec3::ZERO), Vec3::new(0.0, 0.0, -5.0));
    }

    #[test]
    fn test_world_normal_follows_rotation() {
        let ctx = FrameContext::new(
            Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2),
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::ZERO,
        );
        let n = ctx.world_normal(Vec3::Y);
        assert!((n - Vec3::Z).length() < 1e-5, "got {n:?}");
    }

    #[test]
    fn test_world_normal_undoes_non_uniform_scale() {
        let ctx = FrameContext::new(
            Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0)),
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::ZERO,
        );
        // Surface x = y stretched along x becomes x = 4y; its normal tilts toward +y.
        let n = ctx.world_normal(Vec3::new(1.0, -1.0, 0.0).normalize());
        let expected = Vec3::new(1.0, -4.0, 0.0).normalize();
        assert!((n - expected).length() < 1e-5, "got {n:?}");
    }

    #[test]
    fn test_world_normal_identity_and_singular() {
        let ctx = FrameContext::default();
        assert_eq!(ctx.world_normal(Vec3::Y), Vec3::Y);
        let flat = FrameContext::new(Mat4::ZERO, Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO);
        assert_eq!(flat.world_normal(Vec3::X), Vec3::Y);
    }
}
