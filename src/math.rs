//! Small vector helpers on top of nalgebra.

use nalgebra::{Rotation3, Vector3};

/// Mirror-reflect `v` about the unit normal `n`.
pub fn reflect(v: &Vector3<f32>, n: &Vector3<f32>) -> Vector3<f32> {
    v - n * (2.0 * v.dot(n))
}

/// Rotate `v` about the world Z axis (up) by `angle` radians.
pub fn rotate_z(v: &Vector3<f32>, angle: f32) -> Vector3<f32> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle) * v
}

/// Linear interpolation from `a` to `b`; extrapolates for `t` outside [0, 1].
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
