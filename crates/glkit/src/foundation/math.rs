//! Math utilities and types
//!
//! Thin aliases over `nalgebra` plus the two OpenGL-convention matrices the
//! camera needs. All matrices are column-major, which is the layout the
//! `glUniformMatrix*` family expects with `transpose = false`.

pub use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    #[must_use]
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    #[must_use]
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    #[must_use]
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }
}

/// Extension trait for Mat4 with OpenGL-convention constructors
pub trait Mat4Ext {
    /// Right-handed perspective projection mapping depth to [-1, 1]
    ///
    /// `fov_y` is in radians.
    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed look-at view matrix
    fn look_at_gl(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective_gl(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn look_at_gl(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perspective_maps_depth_range_to_clip_cube() {
        let projection = Mat4::perspective_gl(utils::deg_to_rad(45.0), 16.0 / 9.0, 0.1, 100.0);
        let ndc_depth = |z: f32| {
            let clip = projection * Vec4::new(0.0, 0.0, z, 1.0);
            clip.z / clip.w
        };
        assert_relative_eq!(ndc_depth(-0.1), -1.0, epsilon = 1e-4);
        assert_relative_eq!(ndc_depth(-100.0), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_look_at_moves_eye_to_origin_facing_negative_z() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let target = Vec3::new(1.0, 2.0, -1.0);
        let view = Mat4::look_at_gl(eye, target, Vec3::y());

        let eye_in_view = view * Vec4::new(eye.x, eye.y, eye.z, 1.0);
        assert_relative_eq!(eye_in_view, Vec4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-5);

        let target_in_view = view * Vec4::new(target.x, target.y, target.z, 1.0);
        assert_relative_eq!(target_in_view, Vec4::new(0.0, 0.0, -4.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(utils::clamp(100.0, -89.0, 89.0), 89.0);
        assert_eq!(utils::clamp(-100.0, -89.0, 89.0), -89.0);
        assert_eq!(utils::clamp(12.5, -89.0, 89.0), 12.5);
    }
}
