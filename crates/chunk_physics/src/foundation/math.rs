//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the few helpers the physics code needs.

pub use nalgebra::{Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Component-wise minimum of two vectors
pub fn component_min(a: &Vec3, b: &Vec3) -> Vec3 {
    a.zip_map(b, f32::min)
}

/// Component-wise maximum of two vectors
pub fn component_max(a: &Vec3, b: &Vec3) -> Vec3 {
    a.zip_map(b, f32::max)
}

/// Advance an orientation by an angular velocity over `delta_time` seconds
pub fn integrate_rotation(rotation: &Quat, angular_velocity: &Vec3, delta_time: f32) -> Quat {
    let step = angular_velocity * delta_time;
    if step.norm_squared() == 0.0 {
        return *rotation;
    }
    Quat::from_scaled_axis(step) * *rotation
}
