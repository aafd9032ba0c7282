//! Camera state and the pixel-to-ray projection.

use nalgebra::{Point3, Vector3};

use crate::math::{lerp, rotate_z};
use crate::scene::SceneError;

/// A position looking at a target through a virtual screen `lens_length`
/// units ahead. The only render input that mutates between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub lens_length: f32,
}

impl Camera {
    pub fn new(position: Point3<f32>, target: Point3<f32>) -> Result<Self, SceneError> {
        if position == target {
            return Err(SceneError::DegenerateCamera);
        }
        Ok(Self {
            position,
            target,
            lens_length: 1.0,
        })
    }

    /// Translate the camera by a world-space delta. Unchecked; the caller
    /// re-renders afterwards.
    pub fn move_by(&mut self, dx: f32, dy: f32, dz: f32) {
        self.position += Vector3::new(dx, dy, dz);
    }

    /// Heading toward the target, projected onto the ground plane.
    pub fn yaw(&self) -> f32 {
        (self.target.y - self.position.y).atan2(self.target.x - self.position.x)
    }

    /// World-space ray direction through pixel (x, y) of a width x height
    /// image. The screen spans [-aspect, +aspect] left to right and
    /// [+1, -1] top to bottom; the pre-rotation ray is formed in
    /// camera-local axes and yawed about Z toward the target. Identical
    /// inputs always produce the bit-identical direction.
    pub fn ray_direction(&self, x: usize, y: usize, width: usize, height: usize) -> Vector3<f32> {
        let aspect = width as f32 / height as f32;

        let screen_h = lerp(-aspect, aspect, x as f32 / width as f32);
        let screen_v = lerp(1.0, -1.0, y as f32 / height as f32);
        let screen = Vector3::new(self.lens_length, screen_h, screen_v);

        rotate_z(&screen, self.yaw()).normalize()
    }
}
