//! Frame rendering: the pixel buffer, the row-parallel render loop, and
//! throttled progress reporting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::debug;
use rayon::prelude::*;
use thiserror::Error;

use crate::camera::Camera;
use crate::scene::{Color, Scene};
use crate::tracer::cast_ray;

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("render dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
}

/// Snapshot handed to the progress callback.
#[derive(Debug, Clone, Copy)]
pub struct RenderProgress {
    /// Fraction of the frame finished, 0.0..=1.0.
    pub fraction: f32,
    /// Wall time since the render pass started.
    pub elapsed: Duration,
}

/// Minimum delay between two mid-render progress reports.
const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Row-major RGB8 frame, fully overwritten by each render pass.
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<[u8; 3]>,
}

impl PixelBuffer {
    pub(crate) fn from_rows(width: usize, height: usize, data: Vec<[u8; 3]>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        self.data[y * self.width + x]
    }

    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.data
    }

    /// Hand-off to the PNG writer or any other presentation surface.
    pub fn to_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgb(self.pixel(x as usize, y as usize))
        })
    }
}

/// Renders a scene from its owned camera into fresh pixel buffers.
///
/// The camera is the only mutable piece; a render pass takes `&self`, so
/// the borrow checker serializes camera updates against in-flight renders.
#[derive(Debug)]
pub struct Renderer {
    width: usize,
    height: usize,
    camera: Camera,
}

impl Renderer {
    pub fn new(width: usize, height: usize, camera: Camera) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            camera,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Render a full frame. Pure with respect to the camera and scene:
    /// the same inputs always produce the same buffer.
    pub fn render(&self, scene: &Scene) -> PixelBuffer {
        self.render_with_progress(scene, &|_| {})
    }

    /// Render a full frame, reporting progress at most once per second
    /// mid-render plus once on completion. Rows are traced in parallel;
    /// pixels share no mutable state, so the buffer is assembled whole
    /// before anyone can observe it.
    pub fn render_with_progress(
        &self,
        scene: &Scene,
        progress: &(dyn Fn(RenderProgress) + Sync),
    ) -> PixelBuffer {
        let start = Instant::now();
        let rows_done = AtomicUsize::new(0);
        let last_report = Mutex::new(start);

        let rows: Vec<Vec<[u8; 3]>> = (0..self.height)
            .into_par_iter()
            .map(|y| {
                let row: Vec<[u8; 3]> = (0..self.width)
                    .map(|x| {
                        let direction = self.camera.ray_direction(x, y, self.width, self.height);
                        let color = cast_ray(&self.camera.position, &direction, scene, 0);
                        to_rgb8(color)
                    })
                    .collect();

                let done = rows_done.fetch_add(1, Ordering::Relaxed) + 1;
                self.maybe_report(progress, &last_report, start, done);
                row
            })
            .collect();

        progress(RenderProgress {
            fraction: 1.0,
            elapsed: start.elapsed(),
        });
        debug!(
            "rendered {}x{} frame in {:?}",
            self.width,
            self.height,
            start.elapsed()
        );

        PixelBuffer::from_rows(self.width, self.height, rows.concat())
    }

    fn maybe_report(
        &self,
        progress: &(dyn Fn(RenderProgress) + Sync),
        last_report: &Mutex<Instant>,
        start: Instant,
        rows_done: usize,
    ) {
        // try_lock: a contended report is simply skipped, never waited on.
        if let Ok(mut last) = last_report.try_lock() {
            if last.elapsed() >= PROGRESS_INTERVAL {
                *last = Instant::now();
                progress(RenderProgress {
                    fraction: rows_done as f32 / self.height as f32,
                    elapsed: start.elapsed(),
                });
            }
        }
    }
}

/// Clamp a shaded color into an RGB8 pixel.
fn to_rgb8(color: Color) -> [u8; 3] {
    [
        color.x.clamp(0.0, 255.0) as u8,
        color.y.clamp(0.0, 255.0) as u8,
        color.z.clamp(0.0, 255.0) as u8,
    ]
}
