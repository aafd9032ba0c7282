//! The shading heart: nearest-hit resolution, directional sun lighting,
//! recursive mirror reflection, and the checkerboard ground fallback.

use nalgebra::{Point3, Vector3};

use crate::math::reflect;
use crate::scene::{Color, Scene};
use crate::MAX_DEPTH;

/// Fixed directional light, unit length.
pub fn sun_direction() -> Vector3<f32> {
    Vector3::new(-1.0, 2.0, 1.0).normalize()
}

/// Ambient floor: a face turned fully away from the sun still gets this
/// fraction of its material color.
const AMBIENT: f32 = 0.2;

/// Color seen along a ray. `depth` counts reflection bounces taken so far;
/// rays deeper than [`MAX_DEPTH`] resolve to black, which bounds the
/// recursion between facing mirrors.
pub fn cast_ray(
    origin: &Point3<f32>,
    direction: &Vector3<f32>,
    scene: &Scene,
    depth: u32,
) -> Color {
    if depth > MAX_DEPTH {
        return Color::zeros();
    }

    if let Some((thing, point)) = scene.nearest_hit(origin, direction) {
        let normal = thing.normal(&point);
        let material = thing.material();

        // How much sun falls on the face, remapped onto [AMBIENT, 1].
        let facing = normal.dot(&sun_direction()).clamp(0.0, 1.0);
        let light = AMBIENT + (1.0 - AMBIENT) * facing;
        let base = material.color * light;

        if material.should_reflect() {
            let bounced = reflect(direction, &normal);
            let reflected = cast_ray(&point, &bounced, scene, depth + 1);
            return base.lerp(&reflected, material.reflectivity);
        }

        return base;
    }

    // Pointing down: the ray meets the infinite checkerboard at z = 0.
    if direction.z < 0.0 {
        let t = -origin.z / direction.z;
        let point = origin + direction * t;
        let parity = (point.x.round() as i64 + point.y.round() as i64).rem_euclid(2);
        return if parity == 0 {
            Color::new(0.0, 0.0, 255.0)
        } else {
            Color::new(0.0, 0.0, 127.0)
        };
    }

    // Sky.
    Color::zeros()
}
