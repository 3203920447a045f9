//! orbs-surface: the drawable surface the scene renders into.
//!
//! [`Renderer`] is the seam the scene controller talks to; [`RenderSurface`]
//! is the wgpu implementation bound to a window.

mod batch;
mod pipeline;
mod resources;
mod surface;

use engine_core::{PerspectiveCamera, Scene, wgpu};
use thiserror::Error;

pub use batch::{DrawBatch, build_batches};
pub use surface::{RenderSurface, SAMPLE_COUNT};

/// Failures while acquiring the drawable surface. All are fatal.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("failed to create drawable surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to open GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Failures while drawing a single frame.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to acquire surface frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
}

/// A canvas-like render target.
///
/// Sizes are logical pixels; the drawing buffer is the logical size times the
/// pixel ratio, rounded.
pub trait Renderer {
    fn set_size(&mut self, width: f64, height: f64);
    fn set_pixel_ratio(&mut self, ratio: f64);
    fn size(&self) -> (f64, f64);
    fn pixel_ratio(&self) -> f64;
    fn drawing_buffer_size(&self) -> (u32, u32) {
        drawing_buffer_size(self.size(), self.pixel_ratio())
    }
    /// Draw one frame of `scene` as seen by `camera`.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError>;
}

/// Physical drawing-buffer size for a logical size and pixel ratio.
pub fn drawing_buffer_size(size: (f64, f64), pixel_ratio: f64) -> (u32, u32) {
    let (w, h) = size;
    let scale = |v: f64| (v * pixel_ratio).round().max(0.0) as u32;
    (scale(w), scale(h))
}

/// Normalize a host-provided pixel ratio; non-finite or non-positive becomes 1.
pub fn sanitize_pixel_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 }
}
