//! Recursive ray tracer that renders mirror spheres over an infinite
//! checkerboard ground plane, viewed from a movable camera.
//!
//! The library is the whole pipeline: scene geometry behind the [`scene::Thing`]
//! trait, the recursive [`tracer::cast_ray`] shader, and the row-parallel
//! [`renderer::Renderer`] that turns a camera + scene into a [`renderer::PixelBuffer`].
//! The binary wraps it in an interactive terminal viewer and a one-shot PNG
//! renderer.

pub mod camera;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod terminal;
pub mod tracer;

pub use camera::Camera;
pub use renderer::{PixelBuffer, RenderProgress, Renderer};
pub use scene::{Material, Scene, Sphere};

/// Deepest reflection bounce that is still traced; rays beyond it resolve
/// to black. Depths 0..=MAX_DEPTH give four levels of recursion in total.
pub const MAX_DEPTH: u32 = 3;

/// Default render resolution.
pub const DEFAULT_WIDTH: usize = 400;
pub const DEFAULT_HEIGHT: usize = 300;
