//! Scene contents: materials, geometry, and the linear nearest-hit query.

use std::sync::Arc;

use nalgebra::{distance, Point3, Vector3};
use thiserror::Error;

/// RGB color with channels in 0..=255. Kept in f32 so shading and
/// reflection blending stay un-clamped until the pixel is written out.
pub type Color = Vector3<f32>;

/// Construction-time validation failures.
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("sphere radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    #[error("camera position and target must be distinct")]
    DegenerateCamera,
}

/// How a surface responds to light: a base color plus how strongly the
/// surface mirrors its surroundings.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub reflectivity: f32,
}

impl Material {
    /// A plain shaded material.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            reflectivity: 0.0,
        }
    }

    /// A material that blends its shaded color with a traced reflection.
    /// Reflectivity is not clamped; values outside [0, 1] extrapolate the
    /// blend (and get clamped only at pixel write-out).
    pub fn reflective(color: Color, reflectivity: f32) -> Self {
        Self {
            color,
            reflectivity,
        }
    }

    pub fn should_reflect(&self) -> bool {
        self.reflectivity > 0.0
    }
}

/// Something in the scene a ray can hit.
///
/// The tracer and the scene query only ever see `dyn Thing`, so new
/// primitives slot in without touching either.
pub trait Thing: Send + Sync {
    /// Nearest front-face intersection of the ray with this thing.
    fn intersect(&self, origin: &Point3<f32>, direction: &Vector3<f32>) -> Option<Point3<f32>>;

    /// Surface normal at `point`, which must lie on the surface.
    fn normal(&self, point: &Point3<f32>) -> Vector3<f32>;

    fn material(&self) -> &Material;
}

/// Sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Point3<f32>,
    radius: f32,
    material: Arc<Material>,
}

impl Sphere {
    pub fn new(
        material: Arc<Material>,
        center: Point3<f32>,
        radius: f32,
    ) -> Result<Self, SceneError> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(SceneError::InvalidRadius(radius));
        }
        Ok(Self {
            center,
            radius,
            material,
        })
    }
}

impl Thing for Sphere {
    // Geometric solution: project the center onto the ray, then step back
    // along it by the half-chord.
    // https://www.scratchapixel.com/lessons/3d-basic-rendering/minimal-ray-tracer-rendering-simple-shapes/ray-sphere-intersection.html
    fn intersect(&self, origin: &Point3<f32>, direction: &Vector3<f32>) -> Option<Point3<f32>> {
        let to_center = self.center - origin;

        let tca = to_center.dot(direction);
        if tca < 0.0 {
            // Center is behind the origin.
            return None;
        }

        let d2 = to_center.dot(&to_center) - tca * tca;
        if d2 > self.radius * self.radius {
            return None;
        }

        let thc = (self.radius * self.radius - d2).sqrt();
        let t0 = tca - thc;
        if t0 < 0.0 {
            // Front face is behind the origin.
            return None;
        }

        Some(origin + direction * t0)
    }

    fn normal(&self, point: &Point3<f32>) -> Vector3<f32> {
        (point - self.center).normalize()
    }

    fn material(&self) -> &Material {
        &self.material
    }
}

/// Ordered collection of things, immutable during a render pass.
#[derive(Default)]
pub struct Scene {
    things: Vec<Box<dyn Thing>>,
}

impl Scene {
    pub fn new() -> Self {
        Self { things: Vec::new() }
    }

    pub fn push(&mut self, thing: Box<dyn Thing>) {
        self.things.push(thing);
    }

    pub fn len(&self) -> usize {
        self.things.len()
    }

    pub fn is_empty(&self) -> bool {
        self.things.is_empty()
    }

    /// Linear nearest-hit query: every member is tested and the hit closest
    /// to the origin wins. On an exact distance tie the first-added member
    /// wins, so scene order is part of the contract.
    pub fn nearest_hit(
        &self,
        origin: &Point3<f32>,
        direction: &Vector3<f32>,
    ) -> Option<(&dyn Thing, Point3<f32>)> {
        let mut closest = f32::INFINITY;
        let mut nearest: Option<(&dyn Thing, Point3<f32>)> = None;

        for thing in &self.things {
            if let Some(point) = thing.intersect(origin, direction) {
                let dist = distance(origin, &point);
                if dist < closest {
                    closest = dist;
                    nearest = Some((thing.as_ref(), point));
                }
            }
        }

        nearest
    }

    /// The six-sphere showcase scene: four shaded spheres, a perfect mirror
    /// and a half mirror, floating over the checkerboard.
    pub fn demo() -> Self {
        let red = Arc::new(Material::new(Color::new(255.0, 0.0, 0.0)));
        let green = Arc::new(Material::new(Color::new(0.0, 255.0, 0.0)));
        let blue = Arc::new(Material::new(Color::new(0.0, 0.0, 255.0)));
        let white = Arc::new(Material::new(Color::new(255.0, 255.0, 255.0)));
        let mirror = Arc::new(Material::reflective(Color::new(255.0, 255.0, 255.0), 1.0));
        let half_mirror = Arc::new(Material::reflective(Color::new(255.0, 255.0, 255.0), 0.5));

        let mut scene = Scene::new();
        for (material, center) in [
            (red, Point3::new(4.0, -2.0, 1.0)),
            (green, Point3::new(3.0, 2.0, 1.0)),
            (blue, Point3::new(4.0, 1.0, 3.0)),
            (white, Point3::new(5.0, -3.0, 4.0)),
            (mirror, Point3::new(3.0, 0.0, 1.0)),
            (half_mirror, Point3::new(2.0, -1.0, 2.0)),
        ] {
            let sphere = Sphere::new(material, center, 1.0).expect("demo radius is positive");
            scene.push(Box::new(sphere));
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_sphere_at(x: f32, y: f32, z: f32) -> Sphere {
        let material = Arc::new(Material::new(Color::new(255.0, 0.0, 0.0)));
        Sphere::new(material, Point3::new(x, y, z), 1.0).unwrap()
    }

    #[test]
    fn test_sphere_hit_through_center() {
        let sphere = unit_sphere_at(4.0, -2.0, 1.0);
        let origin = Point3::new(-2.0, 0.0, 1.0);
        let direction = Vector3::new(6.0, -2.0, 0.0).normalize();

        let hit = sphere.intersect(&origin, &direction);
        assert!(hit.is_some());

        // Entry point sits exactly one radius short of the center.
        let point = hit.unwrap();
        let to_center = distance(&point, &Point3::new(4.0, -2.0, 1.0));
        assert!((to_center - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = unit_sphere_at(4.0, -2.0, 1.0);
        let origin = Point3::new(-2.0, 0.0, 1.0);
        let direction = Vector3::new(0.0, 1.0, 0.0);
        assert!(sphere.intersect(&origin, &direction).is_none());
    }

    #[test]
    fn test_sphere_behind_origin_misses() {
        let sphere = unit_sphere_at(-5.0, 0.0, 0.0);
        let origin = Point3::new(0.0, 0.0, 0.0);
        let direction = Vector3::new(1.0, 0.0, 0.0);
        assert!(sphere.intersect(&origin, &direction).is_none());
    }

    #[test]
    fn test_origin_inside_sphere_looking_away_misses() {
        // The geometric solve rejects rays whose projection onto the
        // center is negative, even though the far surface is ahead.
        let sphere = unit_sphere_at(0.0, 0.0, 0.0);
        let origin = Point3::new(0.5, 0.0, 0.0);
        let direction = Vector3::new(1.0, 0.0, 0.0);
        assert!(sphere.intersect(&origin, &direction).is_none());
    }

    #[test]
    fn test_sphere_normal_points_outward() {
        let sphere = unit_sphere_at(0.0, 0.0, 0.0);
        let n = sphere.normal(&Point3::new(1.0, 0.0, 0.0));
        assert!((n.x - 1.0).abs() < 0.001);
        assert!(n.y.abs() < 0.001);
        assert!(n.z.abs() < 0.001);
    }

    #[test]
    fn test_invalid_radius_rejected() {
        let material = Arc::new(Material::new(Color::new(255.0, 0.0, 0.0)));
        let origin = Point3::new(0.0, 0.0, 0.0);
        assert_eq!(
            Sphere::new(material.clone(), origin, 0.0).unwrap_err(),
            SceneError::InvalidRadius(0.0)
        );
        assert!(Sphere::new(material.clone(), origin, -1.0).is_err());
        assert!(Sphere::new(material, origin, f32::NAN).is_err());
    }

    #[test]
    fn test_material_should_reflect() {
        assert!(!Material::new(Color::new(255.0, 0.0, 0.0)).should_reflect());
        assert!(Material::reflective(Color::new(255.0, 255.0, 255.0), 0.5).should_reflect());
        assert!(!Material::reflective(Color::new(255.0, 255.0, 255.0), 0.0).should_reflect());
    }

    #[test]
    fn test_nearest_hit_picks_closer_sphere() {
        let mut scene = Scene::new();
        scene.push(Box::new(unit_sphere_at(10.0, 0.0, 0.0)));
        scene.push(Box::new(unit_sphere_at(5.0, 0.0, 0.0)));

        let origin = Point3::new(0.0, 0.0, 0.0);
        let direction = Vector3::new(1.0, 0.0, 0.0);
        let (_, point) = scene.nearest_hit(&origin, &direction).unwrap();
        assert!((point.x - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_nearest_hit_tie_break_is_first_added() {
        let near = Arc::new(Material::new(Color::new(255.0, 0.0, 0.0)));
        let far = Arc::new(Material::new(Color::new(0.0, 255.0, 0.0)));
        let mut scene = Scene::new();
        let center = Point3::new(5.0, 0.0, 0.0);
        scene.push(Box::new(Sphere::new(near.clone(), center, 1.0).unwrap()));
        scene.push(Box::new(Sphere::new(far, center, 1.0).unwrap()));

        let origin = Point3::new(0.0, 0.0, 0.0);
        let direction = Vector3::new(1.0, 0.0, 0.0);
        let (thing, _) = scene.nearest_hit(&origin, &direction).unwrap();
        assert_eq!(thing.material(), near.as_ref());
    }

    #[test]
    fn test_empty_scene_has_no_hit() {
        let scene = Scene::new();
        let origin = Point3::new(0.0, 0.0, 0.0);
        let direction = Vector3::new(1.0, 0.0, 0.0);
        assert!(scene.nearest_hit(&origin, &direction).is_none());
    }

    #[test]
    fn test_demo_scene_has_six_spheres() {
        assert_eq!(Scene::demo().len(), 6);
    }
}
