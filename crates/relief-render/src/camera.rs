//! Free-look camera producing per-frame transforms.

use glam::{Mat4, Vec3};
use relief_config::CameraConfig;
use relief_lod::FrameContext;

/// Pitch limit in degrees when constrained.
pub const PITCH_LIMIT: f32 = 89.0;
/// Narrowest field of view reachable by scrolling, in degrees.
pub const MIN_ZOOM: f32 = 1.0;
/// Widest field of view reachable by scrolling, in degrees.
pub const MAX_ZOOM: f32 = 45.0;

/// Direction of a keyboard move, relative to where the camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Euler-angle camera. Angles are in degrees; yaw -90 faces -Z.
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space eye position.
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
    /// Units per second.
    pub movement_speed: f32,
    /// Degrees per unit of mouse offset.
    pub mouse_sensitivity: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
}

impl Camera {
    /// Camera at `position` with the given orientation and default tuning.
    pub fn new(position: Vec3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            zoom: MAX_ZOOM,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            aspect_ratio: 2.0,
            near: 0.1,
            far: 5000.0,
        };
        camera.update_vectors();
        camera
    }

    /// Camera matching the config's initial pose and projection.
    pub fn from_config(config: &CameraConfig, aspect_ratio: f32) -> Self {
        let mut camera = Self::new(
            Vec3::from_array(config.position),
            Vec3::Y,
            config.yaw,
            config.pitch,
        );
        camera.zoom = config.fov;
        camera.movement_speed = config.movement_speed;
        camera.mouse_sensitivity = config.mouse_sensitivity;
        camera.aspect_ratio = aspect_ratio;
        camera.near = config.near;
        camera.far = config.far;
        camera
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Move along the camera axes by `movement_speed * dt`.
    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.movement_speed * dt;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Turn by mouse offsets scaled by `mouse_sensitivity`.
    pub fn process_mouse(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;
        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self.update_vectors();
    }

    /// Narrow or widen the field of view, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn process_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Turn to face `target`. No-op when `target` is the eye position.
    pub fn look_at(&mut self, target: Vec3) {
        let Some(dir) = (target - self.position).try_normalize() else {
            return;
        };
        self.yaw = dir.z.atan2(dir.x).to_degrees();
        self.pitch = dir
            .y
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees()
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Update the aspect ratio from surface dimensions.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    /// `look_at(position, position + front, up)`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.zoom.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Snapshot this camera for one frame.
    pub fn frame_context(&self, model: Mat4) -> FrameContext {
        FrameContext::new(
            model,
            self.view_matrix(),
            self.projection_matrix(),
            self.position,
        )
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        self.front = front.normalize_or(Vec3::NEG_Z);
        self.right = self.front.cross(self.world_up).normalize_or(Vec3::X);
        self.up = self.right.cross(self.front).normalize_or(Vec3::Y);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y, -90.0, 0.0)
    }
}
