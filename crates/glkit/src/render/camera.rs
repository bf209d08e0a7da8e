//! # Fly Camera
//!
//! Yaw/pitch camera producing OpenGL-convention view and projection matrices.
//!
//! ## Conventions
//! - Right-handed, Y-up world; yaw 0° looks down +X, yaw -90° looks down -Z
//! - Angles are stored in degrees; pitch is clamped to [-89°, 89°]
//! - `front`, `right` and `up` are derived from (yaw, pitch) and recomputed
//!   together whenever either angle changes
//! - Projection maps depth to [-1, 1]

use crate::config::CameraSettings;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Largest pitch magnitude in degrees
pub const PITCH_LIMIT: f32 = 89.0;

/// Yaw/pitch perspective camera
///
/// Value type: freely copyable, mutated in place once per frame by
/// input-driven calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    fov_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
    move_speed: f32,
    sensitivity: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default(), 4.0 / 3.0)
    }
}

impl Camera {
    /// Create a perspective camera at the origin looking down -Z
    ///
    /// # Arguments
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Viewport width over height
    /// * `near` - Near clipping plane distance (must be > 0)
    /// * `far` - Far clipping plane distance (must be > near)
    #[must_use]
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let defaults = CameraSettings::default();
        let mut camera = Self {
            position: Vec3::zeros(),
            world_up: Vec3::y(),
            yaw: -90.0,
            pitch: 0.0,
            front: -Vec3::z(),
            right: Vec3::x(),
            up: Vec3::y(),
            fov_degrees,
            aspect,
            near,
            far,
            move_speed: defaults.move_speed,
            sensitivity: defaults.sensitivity,
        };
        camera.update_vectors();
        camera
    }

    /// Create a camera from configuration
    #[must_use]
    pub fn from_settings(settings: &CameraSettings, aspect: f32) -> Self {
        let mut camera = Self::new(settings.fov_degrees, aspect, settings.near, settings.far);
        camera.move_speed = settings.move_speed;
        camera.sensitivity = settings.sensitivity;
        camera
    }

    fn update_vectors(&mut self) {
        let yaw = utils::deg_to_rad(self.yaw);
        let pitch = utils::deg_to_rad(self.pitch);
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }

    /// World-space position
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the camera to `position` without changing orientation
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Yaw in degrees
    #[must_use]
    pub const fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees, always within ±89°
    #[must_use]
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Set both angles; pitch is clamped before the axes are re-derived
    pub fn set_yaw_pitch(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = utils::clamp(pitch, -PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Unit viewing direction
    #[must_use]
    pub const fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit right axis
    #[must_use]
    pub const fn right(&self) -> Vec3 {
        self.right
    }

    /// Unit camera up axis
    #[must_use]
    pub const fn up(&self) -> Vec3 {
        self.up
    }

    /// Vertical field of view in degrees
    #[must_use]
    pub const fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    /// Viewport width over height
    #[must_use]
    pub const fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    /// Near clipping distance
    #[must_use]
    pub const fn near(&self) -> f32 {
        self.near
    }

    /// Far clipping distance
    #[must_use]
    pub const fn far(&self) -> f32 {
        self.far
    }

    /// Movement speed in units per second
    #[must_use]
    pub const fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// Set movement speed in units per second
    pub fn set_move_speed(&mut self, speed: f32) {
        self.move_speed = speed;
    }

    /// Degrees of rotation per unit of input
    #[must_use]
    pub const fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    /// Set degrees of rotation per unit of input
    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.sensitivity = sensitivity;
    }

    /// Replace all projection parameters
    pub fn set_projection(&mut self, fov_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.fov_degrees = fov_degrees;
        self.aspect = aspect;
        self.near = near;
        self.far = far;
    }

    /// Update the aspect ratio, typically after a framebuffer resize
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Rotate by input deltas scaled by sensitivity
    ///
    /// Pitch is clamped before the axes are re-derived, so `front().y` always
    /// equals `sin(pitch())`.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.set_yaw_pitch(
            self.yaw + delta_yaw * self.sensitivity,
            self.pitch + delta_pitch * self.sensitivity,
        );
    }

    fn translate(&mut self, axis: Vec3, dt: f32) {
        self.position += axis * self.move_speed * dt;
    }

    /// Move along the viewing direction
    pub fn move_forward(&mut self, dt: f32) {
        self.translate(self.front, dt);
    }

    /// Move against the viewing direction
    pub fn move_backward(&mut self, dt: f32) {
        self.translate(-self.front, dt);
    }

    /// Strafe left
    pub fn move_left(&mut self, dt: f32) {
        self.translate(-self.right, dt);
    }

    /// Strafe right
    pub fn move_right(&mut self, dt: f32) {
        self.translate(self.right, dt);
    }

    /// Move along the camera up axis
    pub fn move_up(&mut self, dt: f32) {
        self.translate(self.up, dt);
    }

    /// Move against the camera up axis
    pub fn move_down(&mut self, dt: f32) {
        self.translate(-self.up, dt);
    }

    /// Move along world +Y regardless of orientation
    pub fn move_up_world(&mut self, dt: f32) {
        self.translate(self.world_up, dt);
    }

    /// World-to-view transform: look-at(position, position + front, up)
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_gl(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection from the current projection parameters
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_gl(
            utils::deg_to_rad(self.fov_degrees),
            self.aspect,
            self.near,
            self.far,
        )
    }

    /// Projection × view, ready for column-vector multiplication in GLSL
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
